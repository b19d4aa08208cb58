//! Declaration period resolution.
//!
//! Decides which month the user should be declaring next and builds the list
//! of months offered by the period selector. Only `closed` ledger entries move
//! the default forward; `declared` entries are shown but do not advance it.

use crate::ledger::{DeclarationLedger, DeclarationRecord};
use crate::period::Period;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub years_back: u32,
    pub years_forward: u32,
}

impl Default for PeriodWindow {
    fn default() -> Self {
        Self {
            years_back: 2,
            years_forward: 1,
        }
    }
}

impl PeriodWindow {
    pub fn month_count(&self) -> usize {
        (self.years_back + self.years_forward + 1) as usize * 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultReason {
    /// Nothing closed yet: fall back to the month before the reference date.
    NoDeclarations,
    /// The month right after the latest closed period.
    NextAfterClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    NoDeclarations,
    NextAfterClosed,
    ManualSelection,
}

impl From<DefaultReason> for SelectionReason {
    fn from(reason: DefaultReason) -> Self {
        match reason {
            DefaultReason::NoDeclarations => Self::NoDeclarations,
            DefaultReason::NextAfterClosed => Self::NextAfterClosed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Future,
    Current,
    Declared,
    Closed,
    Available,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPeriod {
    pub period: Period,
    pub reason: DefaultReason,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOption {
    pub period: Period,
    pub label: String,
    pub is_default: bool,
    pub status: PeriodStatus,
    pub reason: SelectionReason,
}

/// Everything a period selector needs: the default and the browsable list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSelection {
    pub default: DefaultPeriod,
    pub options: Vec<PeriodOption>,
}

impl PeriodSelection {
    pub fn is_default(&self, period: &Period) -> bool {
        self.default.period == *period
    }

    pub fn option(&self, period: &Period) -> Option<&PeriodOption> {
        self.options.iter().find(|o| o.period == *period)
    }
}

pub fn find_latest_closed_period(ledger: &DeclarationLedger) -> Option<Period> {
    ledger
        .iter()
        .rev()
        .find(|(_, record)| record.is_closed())
        .map(|(period, _)| *period)
}

pub fn resolve_default_period(ledger: &DeclarationLedger, reference_date: NaiveDate) -> DefaultPeriod {
    let (period, reason) = match find_latest_closed_period(ledger) {
        None => (
            Period::from_date(reference_date).prev(),
            DefaultReason::NoDeclarations,
        ),
        Some(latest) => (latest.next(), DefaultReason::NextAfterClosed),
    };

    debug!(
        "Default declaration period for {} is {} ({:?})",
        reference_date, period, reason
    );

    DefaultPeriod {
        period,
        reason,
        label: period.label_fr(),
    }
}

/// Display status of a month. Future months win over any ledger content.
pub fn period_status(period: &Period, ledger: &DeclarationLedger, reference_date: NaiveDate) -> PeriodStatus {
    let current = Period::from_date(reference_date);

    if *period > current {
        return PeriodStatus::Future;
    }

    match ledger.get(period) {
        Some(DeclarationRecord::Closed { .. }) => return PeriodStatus::Closed,
        Some(DeclarationRecord::Declared) => return PeriodStatus::Declared,
        Some(DeclarationRecord::Draft) | None => {}
    }

    if *period == current {
        PeriodStatus::Current
    } else {
        PeriodStatus::Available
    }
}

/// Every month of the window, most recent first.
pub fn available_periods(reference_date: NaiveDate, window: PeriodWindow) -> Vec<Period> {
    let year = Period::from_date(reference_date).year();
    let start_year = year - window.years_back as i32;
    let end_year = year + window.years_forward as i32;

    let mut periods: Vec<Period> = (start_year..=end_year)
        .flat_map(Period::months_of_year)
        .collect();
    periods.sort_by(|a, b| b.cmp(a));
    periods
}

/// Annotated window, most recent first. The default is flagged only when it
/// falls inside the window: a closed period older than the window, or one in
/// its last month, leaves every entry unflagged.
pub fn list_available_periods(
    ledger: &DeclarationLedger,
    reference_date: NaiveDate,
    window: PeriodWindow,
) -> Vec<PeriodOption> {
    let default = resolve_default_period(ledger, reference_date);

    available_periods(reference_date, window)
        .into_iter()
        .map(|period| {
            let is_default = period == default.period;
            PeriodOption {
                period,
                label: period.label_fr(),
                is_default,
                status: period_status(&period, ledger, reference_date),
                reason: if is_default {
                    default.reason.into()
                } else {
                    SelectionReason::ManualSelection
                },
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodResolver {
    window: PeriodWindow,
}

impl PeriodResolver {
    pub fn new(window: PeriodWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> PeriodWindow {
        self.window
    }

    pub fn resolve_default(&self, ledger: &DeclarationLedger, reference_date: NaiveDate) -> DefaultPeriod {
        resolve_default_period(ledger, reference_date)
    }

    pub fn list_available(&self, ledger: &DeclarationLedger, reference_date: NaiveDate) -> Vec<PeriodOption> {
        list_available_periods(ledger, reference_date, self.window)
    }

    pub fn selection(&self, ledger: &DeclarationLedger, reference_date: NaiveDate) -> PeriodSelection {
        PeriodSelection {
            default: self.resolve_default(ledger, reference_date),
            options: self.list_available(ledger, reference_date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(key: &str) -> Period {
        Period::parse_key(key).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mixed_ledger() -> DeclarationLedger {
        vec![
            (p("2025-06"), DeclarationRecord::Closed { closed_at: None }),
            (p("2025-07"), DeclarationRecord::Declared),
            (p("2025-05"), DeclarationRecord::Closed { closed_at: None }),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_latest_closed_ignores_declared() {
        assert_eq!(find_latest_closed_period(&mixed_ledger()), Some(p("2025-06")));
        assert_eq!(find_latest_closed_period(&DeclarationLedger::new()), None);

        let only_declared: DeclarationLedger =
            vec![(p("2025-07"), DeclarationRecord::Declared)].into_iter().collect();
        assert_eq!(find_latest_closed_period(&only_declared), None);
    }

    #[test]
    fn test_empty_ledger_defaults_to_previous_month() {
        let result = resolve_default_period(&DeclarationLedger::new(), date(2025, 8, 14));
        assert_eq!(result.period, p("2025-07"));
        assert_eq!(result.reason, DefaultReason::NoDeclarations);
        assert_eq!(result.label, "Juillet 2025");

        let result = resolve_default_period(&DeclarationLedger::new(), date(2025, 9, 5));
        assert_eq!(result.period, p("2025-08"));
    }

    #[test]
    fn test_january_walks_back_to_december() {
        let result = resolve_default_period(&DeclarationLedger::new(), date(2025, 1, 10));
        assert_eq!(result.period, p("2024-12"));
    }

    #[test]
    fn test_next_after_closed() {
        let result = resolve_default_period(&mixed_ledger(), date(2025, 8, 15));
        assert_eq!(result.period, p("2025-07"));
        assert_eq!(result.reason, DefaultReason::NextAfterClosed);
    }

    #[test]
    fn test_closed_december_rolls_into_january() {
        let ledger: DeclarationLedger =
            vec![(p("2024-12"), DeclarationRecord::Closed { closed_at: None })]
                .into_iter()
                .collect();
        let result = resolve_default_period(&ledger, date(2025, 2, 15));
        assert_eq!(result.period, p("2025-01"));
        assert_eq!(result.reason, DefaultReason::NextAfterClosed);
    }

    #[test]
    fn test_declared_entry_does_not_move_default() {
        let with_declared: DeclarationLedger =
            vec![(p("2025-07"), DeclarationRecord::Declared)].into_iter().collect();
        let reference = date(2025, 8, 14);
        assert_eq!(
            resolve_default_period(&with_declared, reference),
            resolve_default_period(&DeclarationLedger::new(), reference)
        );
    }

    #[test]
    fn test_period_status_precedence() {
        let mut ledger = mixed_ledger();
        ledger.insert(p("2025-09"), DeclarationRecord::Closed { closed_at: None });
        ledger.insert(p("2025-08"), DeclarationRecord::Draft);
        let reference = date(2025, 8, 15);

        assert_eq!(period_status(&p("2025-09"), &ledger, reference), PeriodStatus::Future);
        assert_eq!(period_status(&p("2025-08"), &ledger, reference), PeriodStatus::Current);
        assert_eq!(period_status(&p("2025-07"), &ledger, reference), PeriodStatus::Declared);
        assert_eq!(period_status(&p("2025-06"), &ledger, reference), PeriodStatus::Closed);
        assert_eq!(period_status(&p("2025-04"), &ledger, reference), PeriodStatus::Available);
    }

    #[test]
    fn test_list_covers_window_in_descending_order() {
        let reference = date(2025, 8, 14);
        let options = list_available_periods(&mixed_ledger(), reference, PeriodWindow::default());

        assert_eq!(options.len(), 48);
        assert_eq!(options.first().unwrap().period, p("2026-12"));
        assert_eq!(options.last().unwrap().period, p("2023-01"));
        assert!(options.windows(2).all(|w| w[0].period.key() > w[1].period.key()));

        let defaults: Vec<&PeriodOption> = options.iter().filter(|o| o.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].period, p("2025-07"));
        assert_eq!(defaults[0].reason, SelectionReason::NextAfterClosed);
        assert_eq!(defaults[0].status, PeriodStatus::Declared);

        let manual = options.iter().find(|o| o.period == p("2024-03")).unwrap();
        assert_eq!(manual.reason, SelectionReason::ManualSelection);
        assert_eq!(manual.label, "Mars 2024");
    }

    #[test]
    fn test_default_outside_window_flags_nothing() {
        let ledger: DeclarationLedger =
            vec![(p("2021-05"), DeclarationRecord::Closed { closed_at: None })]
                .into_iter()
                .collect();
        let reference = date(2025, 8, 15);

        assert_eq!(resolve_default_period(&ledger, reference).period, p("2021-06"));
        let options = list_available_periods(&ledger, reference, PeriodWindow::default());
        assert_eq!(options.len(), 48);
        assert_eq!(options.iter().filter(|o| o.is_default).count(), 0);
        assert!(options
            .iter()
            .all(|o| o.reason == SelectionReason::ManualSelection));
    }

    #[test]
    fn test_custom_window() {
        let resolver = PeriodResolver::new(PeriodWindow {
            years_back: 0,
            years_forward: 0,
        });
        let selection = resolver.selection(&DeclarationLedger::new(), date(2025, 3, 1));
        assert_eq!(selection.options.len(), 12);
        assert!(selection.is_default(&p("2025-02")));
        assert!(selection.option(&p("2025-02")).unwrap().is_default);
        assert!(selection.option(&p("2024-12")).is_none());
    }
}
