//! Calendar month periods keyed as `"YYYY-MM"`.

use crate::error::{PlannerError, Result};
use crate::utils::last_day_of_month;
use chrono::{Datelike, NaiveDate};
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Years whose key fits the four-digit `YYYY` form.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

pub const FRENCH_MONTH_NAMES: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// A calendar month. Field order makes the derived `Ord` chronological,
/// which matches lexicographic order of the zero-padded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(PlannerError::InvalidYear(year));
        }
        if !(1..=12).contains(&month) {
            return Err(PlannerError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 0-based month index (January = 0).
    pub fn month0(&self) -> usize {
        (self.month - 1) as usize
    }

    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    pub fn parse_key(key: &str) -> Result<Self> {
        let invalid = || PlannerError::InvalidPeriodKey(key.to_string());
        let (year_str, month_str) = key.trim().split_once('-').ok_or_else(invalid)?;

        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        let month: u32 = month_str.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // year/month are validated at construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        last_day_of_month(self.year, self.month)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: &Period) -> i32 {
        (other.year - self.year) * 12 + other.month as i32 - self.month as i32
    }

    /// French display label, e.g. "Juillet 2025".
    pub fn label_fr(&self) -> String {
        format!("{} {}", FRENCH_MONTH_NAMES[self.month0()], self.year)
    }

    /// Every month of `year`, January first.
    pub fn months_of_year(year: i32) -> impl Iterator<Item = Period> {
        (1..=12).map(move |month| Period { year, month })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_key(s)
    }
}

impl TryFrom<String> for Period {
    type Error = PlannerError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_key(&value)
    }
}

impl From<Period> for String {
    fn from(period: Period) -> String {
        period.key()
    }
}

impl JsonSchema for Period {
    fn schema_name() -> String {
        "Period".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip_and_padding() {
        let p = Period::new(2025, 7).unwrap();
        assert_eq!(p.key(), "2025-07");
        assert_eq!(p.to_string(), "2025-07");
        assert_eq!(Period::parse_key("2025-07").unwrap(), p);
        assert_eq!("2025-12".parse::<Period>().unwrap(), Period::new(2025, 12).unwrap());
    }

    #[test]
    fn test_key_order_matches_chronology() {
        let mut periods: Vec<Period> = (2023..=2026)
            .flat_map(Period::months_of_year)
            .collect();
        periods.reverse();

        let mut by_key = periods.clone();
        by_key.sort_by_key(|p| p.key());
        let mut by_value = periods;
        by_value.sort();

        assert_eq!(by_key, by_value);
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for key in ["2025-13", "2025-00", "2025-7", "25-07", "2025/07", "abcd-ef", ""] {
            assert!(Period::parse_key(key).is_err(), "{} should be rejected", key);
        }
        assert!(matches!(Period::new(2025, 0), Err(PlannerError::InvalidMonth(0))));
    }

    #[test]
    fn test_year_bounds_keep_keys_parseable() {
        assert!(matches!(Period::new(10000, 1), Err(PlannerError::InvalidYear(10000))));
        assert!(matches!(Period::new(-1, 6), Err(PlannerError::InvalidYear(-1))));

        for p in [Period::new(MIN_YEAR, 1).unwrap(), Period::new(MAX_YEAR, 12).unwrap()] {
            assert_eq!(Period::parse_key(&p.key()).unwrap(), p);
        }
        assert_eq!(Period::new(0, 3).unwrap().key(), "0000-03");
    }

    #[test]
    fn test_next_and_prev_cross_year_boundary() {
        let dec = Period::new(2024, 12).unwrap();
        assert_eq!(dec.next(), Period::new(2025, 1).unwrap());
        assert_eq!(Period::new(2025, 1).unwrap().prev(), dec);
        assert_eq!(Period::new(2025, 6).unwrap().next(), Period::new(2025, 7).unwrap());
    }

    #[test]
    fn test_dates_and_labels() {
        let feb = Period::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(Period::new(2025, 8).unwrap().label_fr(), "Août 2025");
        assert_eq!(
            Period::from_date(NaiveDate::from_ymd_opt(2025, 8, 14).unwrap()),
            Period::new(2025, 8).unwrap()
        );
    }

    #[test]
    fn test_months_until() {
        let a = Period::new(2024, 11).unwrap();
        let b = Period::new(2025, 2).unwrap();
        assert_eq!(a.months_until(&b), 3);
        assert_eq!(b.months_until(&a), -3);
    }

    #[test]
    fn test_serde_uses_key() {
        let p = Period::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"2025-03\"");
        let back: Period = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<Period>("\"2025-3\"").is_err());
    }
}
