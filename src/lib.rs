//! # Freelance Tax Planner
//!
//! Bookkeeping core for French micro-entrepreneurs: which month to declare next,
//! and what a year of planned work turns into once payment delays, marketplace
//! commission, VAT and URSSAF contributions are applied.
//!
//! ## Core Concepts
//!
//! - **Period**: a calendar month keyed as `"YYYY-MM"`
//! - **Declaration Ledger**: the draft/declared/closed status of each period
//! - **Period Resolver**: the default period to declare and the selectable list
//! - **Yearly Plan**: twelve monthly schedules priced at a daily rate (TJM)
//! - **Projection Engine**: invoiced revenue collected one month later and taxed
//!   two months later, net of commission
//!
//! Everything here is a pure function of its inputs. Storage, reports and the
//! user interface live behind the traits in [`reports`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use freelance_tax_planner::*;
//! use chrono::NaiveDate;
//!
//! let ledger = DeclarationLedger::from_json_str(r#"{"2025-06": {"stage": "closed"}}"#)?;
//! let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
//! let default = resolve_default_period(&ledger, today);
//! assert_eq!(default.period.key(), "2025-07");
//!
//! let plan = YearlyPlan::with_defaults(2025, &TaxSettings::default())?;
//! let plan = set_holidays_taken(&plan, 7, 10.0)?;
//! let projection = project_year(&plan, Some(Money::from_euros(8_000)));
//! println!("available in March: {}", projection.months[2].available_cash.format_fr());
//! ```

pub mod engine;
pub mod error;
pub mod ledger;
pub mod money;
pub mod period;
pub mod planning;
pub mod reports;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod utils;

pub use engine::{
    project_year, MonthlyTaxProjection, ProjectionEngine, ProjectionTotals, Trend, YearlyProjection,
};
pub use error::{PlannerError, Result};
pub use ledger::{DeclarationLedger, DeclarationRecord, DeclarationStage};
pub use money::{Money, Rate};
pub use period::Period;
pub use planning::{
    set_daily_rate, set_holidays_taken, set_public_holidays, Days, MonthlyWorkPlan, WorkloadSummary,
    YearlyPlan,
};
pub use reports::{
    declaration_selection, declaration_summary, prior_december_revenue, project_stored_year,
    DeclarationSummary, LedgerSource, PlanStore, ReportSource, UrssafReport, VatReport,
};
pub use resolver::{
    available_periods, find_latest_closed_period, list_available_periods, period_status,
    resolve_default_period, DefaultPeriod, DefaultReason, PeriodOption, PeriodResolver,
    PeriodSelection, PeriodStatus, PeriodWindow, SelectionReason,
};
pub use schema::*;
pub use settings::TaxSettings;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_end_to_end_processing() {
        let ledger = DeclarationLedger::from_json_str(
            r#"{
                "2025-05": { "current_step": "closed", "closed_at": "2025-06-15" },
                "2025-06": { "current_step": "closed", "closed_at": "2025-07-15" },
                "2025-07": { "current_step": "declared" }
            }"#,
        )
        .unwrap();

        let today = NaiveDate::from_ymd_opt(2025, 8, 15).unwrap();
        let selection = PeriodResolver::default().selection(&ledger, today);
        assert_eq!(selection.default.period, Period::new(2025, 7).unwrap());
        assert_eq!(selection.default.reason, DefaultReason::NextAfterClosed);
        assert_eq!(selection.options.len(), 48);

        let settings = TaxSettings::default();
        let previous = YearlyPlan::with_defaults(2024, &settings).unwrap();
        let plan = YearlyPlan::with_defaults(2025, &settings).unwrap();
        let plan = set_holidays_taken(&plan, 7, 10.0).unwrap();

        let projection = ProjectionEngine::new(settings)
            .unwrap()
            .project(&plan, Some(previous.december_revenue()));

        assert_eq!(projection.months.len(), 12);
        assert_eq!(
            projection.months[8].collected_revenue_base,
            plan.month(7).unwrap().estimated_revenue()
        );
        assert_eq!(
            projection.months[9].taxable_revenue_base,
            plan.month(7).unwrap().estimated_revenue()
        );
    }
}
