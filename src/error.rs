use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid year {0}: must be between 0 and 9999")]
    InvalidYear(i32),

    #[error("Invalid period key '{0}'. Expected YYYY-MM")]
    InvalidPeriodKey(String),

    #[error("Invalid month index {0}: must be between 0 and 11")]
    InvalidMonthIndex(usize),

    #[error("Invalid day count for {field}: {details}")]
    InvalidDayCount { field: &'static str, details: String },

    #[error("{field} ({value} days) exceeds the {max} working days available in month {month}")]
    ExceedsMaxWorkingDays {
        field: &'static str,
        month: u32,
        value: f64,
        max: f64,
    },

    #[error("Invalid daily rate {0} cents: must not be negative")]
    NegativeDailyRate(i64),

    #[error("Invalid yearly plan for {year}: {details}")]
    InvalidPlan { year: i32, details: String },

    #[error("Invalid rate for {name}: {ppm} ppm must be between 0 and 1000000")]
    InvalidRate { name: &'static str, ppm: i64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
