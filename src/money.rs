//! Money and rate primitives.
//!
//! Amounts are integer cents, rates are integer parts-per-million. Every
//! conversion between the two goes through [`round_div`], which is the only
//! place a fractional cent is ever resolved.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

pub const PPM: i64 = 1_000_000;

/// Integer division rounded half away from zero.
///
/// `den` must be positive.
pub(crate) fn round_div(num: i128, den: i128) -> i64 {
    let half = den / 2;
    if num >= 0 {
        ((num + half) / den) as i64
    } else {
        -(((-num) + half) / den) as i64
    }
}

/// A euro amount stored in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn from_euros(euros: i64) -> Self {
        Self(euros * 100)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Major units, for display only.
    pub fn euros(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// `self × rate`, rounded to the nearest cent.
    pub fn apply_rate(&self, rate: Rate) -> Money {
        Money(round_div(self.0 as i128 * rate.ppm() as i128, PPM as i128))
    }

    /// `self × (1 + rate)`, rounded to the nearest cent.
    pub fn gross_up(&self, rate: Rate) -> Money {
        Money(round_div(
            self.0 as i128 * (PPM + rate.ppm()) as i128,
            PPM as i128,
        ))
    }

    /// `self × rate × (1 + gross_rate)` with a single rounding step.
    pub fn apply_rate_grossed(&self, rate: Rate, gross_rate: Rate) -> Money {
        Money(round_div(
            self.0 as i128 * rate.ppm() as i128 * (PPM + gross_rate.ppm()) as i128,
            PPM as i128 * PPM as i128,
        ))
    }

    /// French formatting, e.g. `11 400,00 €`.
    pub fn format_fr(&self) -> String {
        let digits = (self.0.abs() / 100).to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(' ');
            }
            grouped.push(c);
        }
        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{},{:02} €", sign, grouped, (self.0 % 100).abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl JsonSchema for Money {
    fn schema_name() -> String {
        "Money".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        i64::json_schema(gen)
    }
}

/// A percentage stored in parts-per-million (20% = 200_000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(i64);

impl Rate {
    pub const fn from_ppm(ppm: i64) -> Self {
        Self(ppm)
    }

    pub const fn ppm(&self) -> i64 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / PPM as f64
    }

    pub fn is_valid(&self) -> bool {
        (0..=PPM).contains(&self.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_fraction() * 100.0)
    }
}

impl JsonSchema for Rate {
    fn schema_name() -> String {
        "Rate".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        i64::json_schema(gen)
    }
}
