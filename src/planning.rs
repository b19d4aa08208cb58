//! Yearly work plan: twelve monthly schedules priced at a daily rate.
//!
//! `working_days` and `estimated_revenue` are derived fields. They are private
//! and recomputed by every constructor and editing operation, so a plan can
//! never hold a stale value. Editing operations take the plan by reference and
//! return a new one; a rejected edit leaves the caller's plan untouched.

use crate::error::{PlannerError, Result};
use crate::money::{round_div, Money};
use crate::schema::{MonthScheduleRecord, YearlyPlanRecord};
use crate::settings::TaxSettings;
use crate::utils::{weekday_public_holidays_in_month, weekdays_in_month};
use log::debug;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A day count with half-day granularity, stored as half days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Days(i64);

impl Days {
    pub const fn whole(days: i64) -> Self {
        Self(days * 2)
    }

    pub const fn from_half_days(half_days: i64) -> Self {
        Self(half_days)
    }

    pub const fn half_days(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 2.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Accepts any finite multiple of half a day.
    pub fn from_f64(value: f64) -> Option<Self> {
        let doubled = value * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 || doubled.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Self(doubled as i64))
    }
}

impl TryFrom<f64> for Days {
    type Error = String;

    fn try_from(value: f64) -> std::result::Result<Self, String> {
        Days::from_f64(value).ok_or_else(|| format!("{} is not a whole or half day count", value))
    }
}

impl From<Days> for f64 {
    fn from(days: Days) -> f64 {
        days.as_f64()
    }
}

impl fmt::Display for Days {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}", self.as_f64())
        }
    }
}

impl JsonSchema for Days {
    fn schema_name() -> String {
        "Days".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        f64::json_schema(gen)
    }
}

fn parse_day_count(field: &'static str, value: f64) -> Result<Days> {
    if value < 0.0 {
        return Err(PlannerError::InvalidDayCount {
            field,
            details: format!("{} is negative", value),
        });
    }
    Days::from_f64(value).ok_or_else(|| PlannerError::InvalidDayCount {
        field,
        details: format!("{} is not a whole or half day count", value),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyWorkPlan {
    month: u32,
    max_working_days: u32,
    holidays_taken: Days,
    public_holidays: u32,
    working_days: Days,
    estimated_revenue: Money,
}

impl MonthlyWorkPlan {
    pub fn new(
        month: u32,
        max_working_days: u32,
        holidays_taken: Days,
        public_holidays: u32,
        daily_rate: Money,
    ) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(PlannerError::InvalidMonth(month));
        }
        check_within_max(month, max_working_days, "holidays_taken", holidays_taken)?;
        check_within_max(
            month,
            max_working_days,
            "public_holidays",
            Days::whole(public_holidays as i64),
        )?;

        let mut plan = Self {
            month,
            max_working_days,
            holidays_taken,
            public_holidays,
            working_days: Days::default(),
            estimated_revenue: Money::zero(),
        };
        plan.recompute(daily_rate);
        Ok(plan)
    }

    fn from_record(record: &MonthScheduleRecord, daily_rate: Money) -> Result<Self> {
        let holidays = parse_day_count("holidays_taken", record.holidays_taken)?;
        Self::new(
            record.month,
            record.max_working_days,
            holidays,
            record.public_holidays,
            daily_rate,
        )
    }

    fn to_record(&self) -> MonthScheduleRecord {
        MonthScheduleRecord {
            month: self.month,
            max_working_days: self.max_working_days,
            holidays_taken: self.holidays_taken.as_f64(),
            public_holidays: self.public_holidays,
            working_days: Some(self.working_days.as_f64()),
            estimated_revenue_cents: Some(self.estimated_revenue.cents()),
        }
    }

    fn recompute(&mut self, daily_rate: Money) {
        let available = Days::whole(self.max_working_days as i64 - self.public_holidays as i64).half_days()
            - self.holidays_taken.half_days();
        self.working_days = Days::from_half_days(available.max(0));
        self.estimated_revenue = Money::from_cents(round_div(
            self.working_days.half_days() as i128 * daily_rate.cents() as i128,
            2,
        ));
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn max_working_days(&self) -> u32 {
        self.max_working_days
    }

    pub fn holidays_taken(&self) -> Days {
        self.holidays_taken
    }

    pub fn public_holidays(&self) -> u32 {
        self.public_holidays
    }

    pub fn working_days(&self) -> Days {
        self.working_days
    }

    pub fn estimated_revenue(&self) -> Money {
        self.estimated_revenue
    }
}

fn check_within_max(month: u32, max_working_days: u32, field: &'static str, value: Days) -> Result<()> {
    if value > Days::whole(max_working_days as i64) {
        return Err(PlannerError::ExceedsMaxWorkingDays {
            field,
            month,
            value: value.as_f64(),
            max: max_working_days as f64,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "YearlyPlanRecord", into = "YearlyPlanRecord")]
pub struct YearlyPlan {
    year: i32,
    daily_rate: Money,
    max_working_days_limit: u32,
    months: Vec<MonthlyWorkPlan>,
}

impl YearlyPlan {
    pub fn from_record(record: &YearlyPlanRecord) -> Result<Self> {
        let invalid = |details: String| PlannerError::InvalidPlan {
            year: record.year,
            details,
        };

        if record.daily_rate_cents < 0 {
            return Err(PlannerError::NegativeDailyRate(record.daily_rate_cents));
        }
        if record.months.len() != 12 {
            return Err(invalid(format!("expected 12 months, got {}", record.months.len())));
        }

        let daily_rate = Money::from_cents(record.daily_rate_cents);
        let mut months = Vec::with_capacity(12);
        for (idx, schedule) in record.months.iter().enumerate() {
            if schedule.month as usize != idx + 1 {
                return Err(invalid(format!(
                    "month #{} is {}, expected {}",
                    idx,
                    schedule.month,
                    idx + 1
                )));
            }
            months.push(MonthlyWorkPlan::from_record(schedule, daily_rate)?);
        }

        Ok(Self {
            year: record.year,
            daily_rate,
            max_working_days_limit: record.max_working_days_limit,
            months,
        })
    }

    pub fn to_record(&self) -> YearlyPlanRecord {
        YearlyPlanRecord {
            year: self.year,
            daily_rate_cents: self.daily_rate.cents(),
            max_working_days_limit: self.max_working_days_limit,
            months: self.months.iter().map(MonthlyWorkPlan::to_record).collect(),
        }
    }

    /// A fresh plan: every weekday is a working day except French public
    /// holidays, no days off taken, rate and ceiling from `settings`.
    pub fn with_defaults(year: i32, settings: &TaxSettings) -> Result<Self> {
        let daily_rate = settings.default_daily_rate;
        if daily_rate.is_negative() {
            return Err(PlannerError::NegativeDailyRate(daily_rate.cents()));
        }

        let months = (1..=12)
            .map(|month| {
                MonthlyWorkPlan::new(
                    month,
                    weekdays_in_month(year, month),
                    Days::default(),
                    weekday_public_holidays_in_month(year, month),
                    daily_rate,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Built default plan for {} at {} per day", year, daily_rate);

        Ok(Self {
            year,
            daily_rate,
            max_working_days_limit: settings.default_max_working_days_limit,
            months,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn daily_rate(&self) -> Money {
        self.daily_rate
    }

    pub fn max_working_days_limit(&self) -> u32 {
        self.max_working_days_limit
    }

    pub fn months(&self) -> &[MonthlyWorkPlan] {
        &self.months
    }

    pub fn month(&self, month_index: usize) -> Result<&MonthlyWorkPlan> {
        self.months
            .get(month_index)
            .ok_or(PlannerError::InvalidMonthIndex(month_index))
    }

    /// December's estimated revenue, the seed for next year's projection.
    pub fn december_revenue(&self) -> Money {
        self.months
            .last()
            .map(MonthlyWorkPlan::estimated_revenue)
            .unwrap_or_default()
    }

    pub fn workload(&self) -> WorkloadSummary {
        WorkloadSummary::from_plan(self)
    }
}

impl From<YearlyPlan> for YearlyPlanRecord {
    fn from(plan: YearlyPlan) -> Self {
        plan.to_record()
    }
}

impl TryFrom<YearlyPlanRecord> for YearlyPlan {
    type Error = PlannerError;

    fn try_from(record: YearlyPlanRecord) -> Result<Self> {
        Self::from_record(&record)
    }
}

pub fn set_daily_rate(plan: &YearlyPlan, daily_rate: Money) -> Result<YearlyPlan> {
    if daily_rate.is_negative() {
        return Err(PlannerError::NegativeDailyRate(daily_rate.cents()));
    }

    let mut updated = plan.clone();
    updated.daily_rate = daily_rate;
    for month in &mut updated.months {
        month.recompute(daily_rate);
    }
    Ok(updated)
}

pub fn set_holidays_taken(plan: &YearlyPlan, month_index: usize, holidays_taken: f64) -> Result<YearlyPlan> {
    let holidays = parse_day_count("holidays_taken", holidays_taken)?;
    edit_month(plan, month_index, |month| {
        check_within_max(month.month, month.max_working_days, "holidays_taken", holidays)?;
        month.holidays_taken = holidays;
        Ok(())
    })
}

pub fn set_public_holidays(plan: &YearlyPlan, month_index: usize, public_holidays: u32) -> Result<YearlyPlan> {
    edit_month(plan, month_index, |month| {
        check_within_max(
            month.month,
            month.max_working_days,
            "public_holidays",
            Days::whole(public_holidays as i64),
        )?;
        month.public_holidays = public_holidays;
        Ok(())
    })
}

fn edit_month<F>(plan: &YearlyPlan, month_index: usize, edit: F) -> Result<YearlyPlan>
where
    F: FnOnce(&mut MonthlyWorkPlan) -> Result<()>,
{
    let mut updated = plan.clone();
    let daily_rate = updated.daily_rate;
    let month = updated
        .months
        .get_mut(month_index)
        .ok_or(PlannerError::InvalidMonthIndex(month_index))?;

    edit(month)?;
    month.recompute(daily_rate);
    Ok(updated)
}

/// Yearly totals of a plan measured against its worked-days ceiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadSummary {
    pub total_working_days: Days,
    pub total_estimated_revenue: Money,
    pub total_holidays_taken: Days,
    pub total_public_holidays: u32,
    pub total_max_days: u32,
    pub average_daily_rate: Money,
    /// Percentage of the ceiling already planned.
    pub working_days_ratio: f64,
    pub is_over_limit: bool,
    /// Negative when the plan exceeds the ceiling.
    pub remaining_days: Days,
}

impl WorkloadSummary {
    pub fn from_plan(plan: &YearlyPlan) -> Self {
        let months = plan.months();
        let total_working_days =
            Days::from_half_days(months.iter().map(|m| m.working_days.half_days()).sum());
        let total_estimated_revenue: Money = months.iter().map(|m| m.estimated_revenue).sum();
        let total_holidays_taken =
            Days::from_half_days(months.iter().map(|m| m.holidays_taken.half_days()).sum());
        let limit = Days::whole(plan.max_working_days_limit as i64);

        let average_daily_rate = if total_working_days.half_days() > 0 {
            Money::from_cents(round_div(
                total_estimated_revenue.cents() as i128 * 2,
                total_working_days.half_days() as i128,
            ))
        } else {
            Money::zero()
        };

        let working_days_ratio = if plan.max_working_days_limit > 0 {
            total_working_days.as_f64() / plan.max_working_days_limit as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total_working_days,
            total_estimated_revenue,
            total_holidays_taken,
            total_public_holidays: months.iter().map(|m| m.public_holidays).sum(),
            total_max_days: months.iter().map(|m| m.max_working_days).sum(),
            average_daily_rate,
            working_days_ratio,
            is_over_limit: total_working_days > limit,
            remaining_days: Days::from_half_days(limit.half_days() - total_working_days.half_days()),
        }
    }
}
