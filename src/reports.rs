//! Boundary with the storage and reporting layers.
//!
//! The traits describe what the surrounding application must provide; the
//! functions compose them with the pure resolver and projection engine.

use crate::engine::{ProjectionEngine, YearlyProjection};
use crate::error::Result;
use crate::ledger::DeclarationLedger;
use crate::money::{Money, Rate};
use crate::period::Period;
use crate::planning::YearlyPlan;
use crate::resolver::{PeriodResolver, PeriodSelection};
use chrono::NaiveDate;
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// VAT figures already computed by the bookkeeping ledger for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VatReport {
    pub period: Period,
    pub collected: Money,
    pub deductible: Money,
    pub due: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UrssafReport {
    pub period: Period,
    /// HT cash actually collected during the month.
    pub cash_collected_base: Money,
    pub rate: Rate,
    pub due: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeclarationSummary {
    pub period: Period,
    pub label: String,
    pub vat: VatReport,
    pub urssaf: UrssafReport,
    pub total_due: Money,
}

impl DeclarationSummary {
    pub fn new(period: Period, vat: VatReport, urssaf: UrssafReport) -> Self {
        let total_due = vat.due + urssaf.due;
        Self {
            period,
            label: period.label_fr(),
            vat,
            urssaf,
            total_due,
        }
    }
}

pub trait LedgerSource {
    fn declaration_ledger(&self) -> Result<DeclarationLedger>;
}

pub trait PlanStore {
    fn load_plan(&self, year: i32) -> Result<Option<YearlyPlan>>;

    /// Persists `plan`. The caller knows whether a record was loaded before
    /// and passes `exists` accordingly; the store creates or updates.
    fn save_plan(&mut self, plan: &YearlyPlan, exists: bool) -> Result<()>;
}

pub trait ReportSource {
    fn vat_report(&self, period: &Period) -> Result<VatReport>;
    fn urssaf_report(&self, period: &Period) -> Result<UrssafReport>;
}

pub fn declaration_summary<R: ReportSource + ?Sized>(reports: &R, period: &Period) -> Result<DeclarationSummary> {
    let vat = reports.vat_report(period)?;
    let urssaf = reports.urssaf_report(period)?;
    Ok(DeclarationSummary::new(*period, vat, urssaf))
}

pub fn declaration_selection<L: LedgerSource + ?Sized>(
    source: &L,
    resolver: &PeriodResolver,
    reference_date: NaiveDate,
) -> Result<PeriodSelection> {
    let ledger = source.declaration_ledger()?;
    Ok(resolver.selection(&ledger, reference_date))
}

/// December revenue of the year before `year`, if that plan exists.
pub fn prior_december_revenue<S: PlanStore + ?Sized>(store: &S, year: i32) -> Result<Option<Money>> {
    Ok(store.load_plan(year - 1)?.map(|plan| plan.december_revenue()))
}

/// Loads the plan for `year` and projects it, or returns `None` when no plan
/// has been saved for that year.
pub fn project_stored_year<S: PlanStore + ?Sized>(
    store: &S,
    engine: &ProjectionEngine,
    year: i32,
) -> Result<Option<YearlyProjection>> {
    let Some(plan) = store.load_plan(year)? else {
        debug!("No plan stored for {}", year);
        return Ok(None);
    };
    let previous_december = prior_december_revenue(store, year)?;
    Ok(Some(engine.project(&plan, previous_december)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::ledger::DeclarationRecord;
    use crate::settings::TaxSettings;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryStore {
        plans: BTreeMap<i32, YearlyPlan>,
        creates: usize,
        updates: usize,
    }

    impl PlanStore for MemoryStore {
        fn load_plan(&self, year: i32) -> Result<Option<YearlyPlan>> {
            Ok(self.plans.get(&year).cloned())
        }

        fn save_plan(&mut self, plan: &YearlyPlan, exists: bool) -> Result<()> {
            if exists {
                self.updates += 1;
            } else {
                self.creates += 1;
            }
            self.plans.insert(plan.year(), plan.clone());
            Ok(())
        }
    }

    struct FixedReports;

    impl ReportSource for FixedReports {
        fn vat_report(&self, period: &Period) -> Result<VatReport> {
            Ok(VatReport {
                period: *period,
                collected: Money::from_euros(2_000),
                deductible: Money::from_euros(150),
                due: Money::from_euros(1_850),
            })
        }

        fn urssaf_report(&self, period: &Period) -> Result<UrssafReport> {
            if period.year() < 2020 {
                return Err(PlannerError::Storage(format!("no report for {}", period)));
            }
            Ok(UrssafReport {
                period: *period,
                cash_collected_base: Money::from_euros(10_000),
                rate: Rate::from_ppm(261_000),
                due: Money::from_euros(2_610),
            })
        }
    }

    struct StaticLedger(DeclarationLedger);

    impl LedgerSource for StaticLedger {
        fn declaration_ledger(&self) -> Result<DeclarationLedger> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_declaration_summary() {
        let period = Period::new(2025, 7).unwrap();
        let summary = declaration_summary(&FixedReports, &period).unwrap();
        assert_eq!(summary.total_due, Money::from_euros(4_460));
        assert_eq!(summary.label, "Juillet 2025");

        let old = Period::new(2019, 1).unwrap();
        assert!(declaration_summary(&FixedReports, &old).is_err());
    }

    #[test]
    fn test_declaration_selection_reads_ledger() {
        let ledger: DeclarationLedger = vec![(
            Period::new(2025, 6).unwrap(),
            DeclarationRecord::Closed { closed_at: None },
        )]
        .into_iter()
        .collect();
        let source = StaticLedger(ledger);

        let selection = declaration_selection(
            &source,
            &PeriodResolver::default(),
            NaiveDate::from_ymd_opt(2025, 8, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(selection.default.period, Period::new(2025, 7).unwrap());
    }

    #[test]
    fn test_project_stored_year_seeds_from_previous_plan() {
        let settings = TaxSettings::default();
        let mut store = MemoryStore::default();
        let previous = YearlyPlan::with_defaults(2024, &settings).unwrap();
        let current = YearlyPlan::with_defaults(2025, &settings).unwrap();
        store.save_plan(&previous, false).unwrap();
        store.save_plan(&current, false).unwrap();
        store.save_plan(&current, true).unwrap();
        assert_eq!((store.creates, store.updates), (2, 1));

        let engine = ProjectionEngine::default();
        let projection = project_stored_year(&store, &engine, 2025).unwrap().unwrap();
        assert_eq!(
            projection.months[0].collected_revenue_base,
            previous.december_revenue()
        );

        let first_year = project_stored_year(&store, &engine, 2024).unwrap().unwrap();
        assert_eq!(first_year.months[0].collected_revenue_base, Money::zero());

        assert!(project_stored_year(&store, &engine, 2030).unwrap().is_none());
        assert_eq!(prior_december_revenue(&store, 2030).unwrap(), None);
    }
}
