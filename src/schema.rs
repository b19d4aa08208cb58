//! Input documents exchanged with the external stores.
//!
//! These records are the loosely typed shapes the storage layer produces. They
//! are converted into the validated domain types ([`crate::DeclarationLedger`],
//! [`crate::YearlyPlan`]) before any computation happens.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerEntryRecord {
    #[serde(alias = "current_step")]
    #[schemars(
        description = "Declaration stage: 'draft', 'declared' or 'closed'. Any other value is treated as not closed."
    )]
    pub stage: String,

    #[serde(rename = "closedAt", alias = "closed_at", default)]
    #[schemars(description = "ISO-8601 timestamp or date at which the period was closed.")]
    pub closed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthScheduleRecord {
    #[schemars(description = "Calendar month, 1 = January.")]
    pub month: u32,

    #[schemars(description = "Monday-to-Friday days in the month.")]
    pub max_working_days: u32,

    #[serde(default)]
    #[schemars(description = "Days off taken by the user. Half days are allowed (e.g. 2.5).")]
    pub holidays_taken: f64,

    #[serde(default)]
    #[schemars(description = "Public holidays falling on a weekday.")]
    pub public_holidays: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Derived on output. Ignored on input and recomputed.")]
    pub working_days: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Derived on output, in cents. Ignored on input and recomputed.")]
    pub estimated_revenue_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct YearlyPlanRecord {
    pub year: i32,

    #[serde(alias = "tjm_cents")]
    #[schemars(description = "Daily billing rate (TJM) in cents.")]
    pub daily_rate_cents: i64,

    #[schemars(description = "Contractual ceiling of worked days for the year, typically 214.")]
    pub max_working_days_limit: u32,

    #[schemars(description = "Exactly twelve months, January first.")]
    pub months: Vec<MonthScheduleRecord>,
}

pub type LedgerDocument = BTreeMap<String, LedgerEntryRecord>;

impl YearlyPlanRecord {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(YearlyPlanRecord)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

impl LedgerEntryRecord {
    pub fn ledger_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerDocument)
    }
}
