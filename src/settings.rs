use crate::error::{PlannerError, Result};
use crate::money::{Money, Rate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_VAT_RATE: Rate = Rate::from_ppm(200_000);
pub const DEFAULT_SOCIAL_CONTRIBUTION_RATE: Rate = Rate::from_ppm(261_000);
pub const DEFAULT_COMMISSION_RATE: Rate = Rate::from_ppm(50_000);
pub const DEFAULT_TREND_THRESHOLD: Rate = Rate::from_ppm(50_000);
pub const DEFAULT_DAILY_RATE: Money = Money::from_euros(400);
pub const DEFAULT_MAX_WORKING_DAYS_LIMIT: u32 = 214;

/// Rates and defaults used by the projection engine and plan builder.
///
/// Every field falls back to its default, so `{}` is a valid document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TaxSettings {
    #[schemars(description = "VAT rate in ppm (200000 = 20%).")]
    pub vat_rate: Rate,

    #[schemars(description = "URSSAF social contribution rate in ppm (261000 = 26.1%).")]
    pub social_contribution_rate: Rate,

    #[schemars(description = "Marketplace commission on the HT amount collected, in ppm.")]
    pub commission_rate: Rate,

    #[schemars(
        description = "Relative change of available cash under which a month is reported as stable, in ppm."
    )]
    pub trend_threshold: Rate,

    #[schemars(description = "Daily rate used for new plans, in cents.")]
    pub default_daily_rate: Money,

    #[schemars(description = "Yearly ceiling of worked days used for new plans.")]
    pub default_max_working_days_limit: u32,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            vat_rate: DEFAULT_VAT_RATE,
            social_contribution_rate: DEFAULT_SOCIAL_CONTRIBUTION_RATE,
            commission_rate: DEFAULT_COMMISSION_RATE,
            trend_threshold: DEFAULT_TREND_THRESHOLD,
            default_daily_rate: DEFAULT_DAILY_RATE,
            default_max_working_days_limit: DEFAULT_MAX_WORKING_DAYS_LIMIT,
        }
    }
}

impl TaxSettings {
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("vat_rate", self.vat_rate),
            ("social_contribution_rate", self.social_contribution_rate),
            ("commission_rate", self.commission_rate),
            ("trend_threshold", self.trend_threshold),
        ];
        for (name, rate) in rates {
            if !rate.is_valid() {
                return Err(PlannerError::InvalidRate {
                    name,
                    ppm: rate.ppm(),
                });
            }
        }

        if self.default_daily_rate.is_negative() {
            return Err(PlannerError::NegativeDailyRate(self.default_daily_rate.cents()));
        }

        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: TaxSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TaxSettings)
    }
}
