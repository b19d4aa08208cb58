use crate::error::Result;
use crate::money::Money;
use crate::period::Period;
use crate::planning::{WorkloadSummary, YearlyPlan};
use crate::settings::TaxSettings;
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Cash and tax figures for one month of the projected year.
///
/// An invoice issued in month M is collected in M+1 (net of the marketplace
/// commission) and taxed in M+2, when VAT and URSSAF are assessed on the cash
/// collected the month before.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyTaxProjection {
    pub month_index: usize,
    pub period: Period,
    /// HT amount invoiced this month.
    pub invoiced_revenue: Money,
    /// HT amount invoiced last month, collected this month.
    pub collected_revenue_base: Money,
    /// HT amount invoiced two months ago, taxed this month.
    pub taxable_revenue_base: Money,
    /// TTC transfer before commission.
    pub gross_collected: Money,
    pub commission_amount: Money,
    pub collected_cash_net: Money,
    pub vat_due: Money,
    pub social_contribution_due: Money,
    pub total_charges: Money,
    pub available_cash: Money,
    pub trend: Trend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectionTotals {
    pub invoiced_revenue: Money,
    pub gross_collected: Money,
    pub commission_amount: Money,
    pub collected_cash_net: Money,
    pub vat_due: Money,
    pub social_contribution_due: Money,
    pub total_charges: Money,
    pub available_cash: Money,
}

impl ProjectionTotals {
    fn add(&mut self, month: &MonthlyTaxProjection) {
        self.invoiced_revenue += month.invoiced_revenue;
        self.gross_collected += month.gross_collected;
        self.commission_amount += month.commission_amount;
        self.collected_cash_net += month.collected_cash_net;
        self.vat_due += month.vat_due;
        self.social_contribution_due += month.social_contribution_due;
        self.total_charges += month.total_charges;
        self.available_cash += month.available_cash;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProjection {
    pub year: i32,
    pub months: Vec<MonthlyTaxProjection>,
    pub totals: ProjectionTotals,
    pub workload: WorkloadSummary,
}

/// Invoiced amounts of the two months preceding the one being projected.
#[derive(Debug, Clone, Copy)]
struct LagWindow {
    prior_month: Money,
    two_months_prior: Money,
}

impl LagWindow {
    /// Nothing is known before the previous December, so two months back
    /// from January is zero.
    fn seeded(previous_december: Option<Money>) -> Self {
        Self {
            prior_month: previous_december.unwrap_or_default(),
            two_months_prior: Money::zero(),
        }
    }

    fn advance(self, invoiced: Money) -> Self {
        Self {
            prior_month: invoiced,
            two_months_prior: self.prior_month,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    settings: TaxSettings,
}

impl ProjectionEngine {
    pub fn new(settings: TaxSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &TaxSettings {
        &self.settings
    }

    /// Projects every month of `plan`. `previous_december` is the revenue
    /// invoiced in December of the year before; `None` counts as zero.
    pub fn project(&self, plan: &YearlyPlan, previous_december: Option<Money>) -> YearlyProjection {
        let mut window = LagWindow::seeded(previous_december);
        let mut months = Vec::with_capacity(plan.months().len());
        let mut totals = ProjectionTotals::default();
        let mut previous_available: Option<Money> = None;

        for (month_index, period) in Period::months_of_year(plan.year()).enumerate() {
            let invoiced_revenue = plan
                .months()
                .get(month_index)
                .map(|m| m.estimated_revenue())
                .unwrap_or_default();

            let mut projection = self.project_month(month_index, period, invoiced_revenue, window);
            projection.trend = previous_available
                .map(|prev| self.trend(prev, projection.available_cash))
                .unwrap_or(Trend::Stable);

            previous_available = Some(projection.available_cash);
            window = window.advance(invoiced_revenue);
            totals.add(&projection);
            months.push(projection);
        }

        if previous_december.is_none() {
            debug!(
                "No revenue supplied for December {}, January and February of {} are projected without it",
                plan.year() - 1,
                plan.year()
            );
        }
        info!(
            "Projected {}: {} invoiced, {} collected net, {} charges, {} available",
            plan.year(),
            totals.invoiced_revenue,
            totals.collected_cash_net,
            totals.total_charges,
            totals.available_cash
        );

        YearlyProjection {
            year: plan.year(),
            months,
            totals,
            workload: plan.workload(),
        }
    }

    fn project_month(
        &self,
        month_index: usize,
        period: Period,
        invoiced_revenue: Money,
        window: LagWindow,
    ) -> MonthlyTaxProjection {
        let vat = self.settings.vat_rate;
        let collected_base = window.prior_month;
        let taxable_base = window.two_months_prior;

        let gross_collected = collected_base.gross_up(vat);
        let commission_amount = collected_base.apply_rate_grossed(self.settings.commission_rate, vat);
        let collected_cash_net = gross_collected - commission_amount;

        let vat_due = taxable_base.apply_rate(vat);
        let social_contribution_due = taxable_base.apply_rate(self.settings.social_contribution_rate);
        let total_charges = vat_due + social_contribution_due;

        MonthlyTaxProjection {
            month_index,
            period,
            invoiced_revenue,
            collected_revenue_base: collected_base,
            taxable_revenue_base: taxable_base,
            gross_collected,
            commission_amount,
            collected_cash_net,
            vat_due,
            social_contribution_due,
            total_charges,
            available_cash: collected_cash_net - total_charges,
            trend: Trend::Stable,
        }
    }

    /// Changes smaller than `trend_threshold` of the current amount are stable.
    pub fn trend(&self, previous: Money, current: Money) -> Trend {
        let diff = current - previous;
        let threshold = current.abs().apply_rate(self.settings.trend_threshold);

        if diff.is_zero() || diff.abs() < threshold {
            Trend::Stable
        } else if diff.is_negative() {
            Trend::Down
        } else {
            Trend::Up
        }
    }
}

/// Projection with the default French rates.
pub fn project_year(plan: &YearlyPlan, previous_december: Option<Money>) -> YearlyProjection {
    ProjectionEngine::default().project(plan, previous_december)
}
