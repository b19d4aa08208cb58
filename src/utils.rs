use chrono::{Datelike, Days, NaiveDate, Weekday};

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let next_month = if month == 12 { 1 } else { month + 1 };
    let next_year = if month == 12 { year + 1 } else { year };

    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.checked_sub_days(Days::new(1)))
        .unwrap_or(NaiveDate::MAX)
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of Monday-to-Friday days in the month.
pub fn weekdays_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    first
        .iter_days()
        .take_while(|d| d.month() == month)
        .filter(|d| is_weekday(*d))
        .count() as u32
}

/// Easter Sunday (Gregorian calendar, anonymous algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// French public holidays (jours fériés) for metropolitan France.
pub fn french_public_holidays(year: i32) -> Vec<NaiveDate> {
    let fixed = [(1, 1), (5, 1), (5, 8), (7, 14), (8, 15), (11, 1), (11, 11), (12, 25)];

    let mut holidays: Vec<NaiveDate> = fixed
        .iter()
        .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
        .collect();

    if let Some(easter) = easter_sunday(year) {
        // Easter Monday, Ascension Thursday, Whit Monday
        for offset in [1, 39, 50] {
            if let Some(date) = easter.checked_add_days(Days::new(offset)) {
                holidays.push(date);
            }
        }
    }

    holidays.sort();
    holidays
}

/// Public holidays of the month that fall on a weekday, i.e. the days they
/// actually remove from the working calendar.
pub fn weekday_public_holidays_in_month(year: i32, month: u32) -> u32 {
    french_public_holidays(year)
        .into_iter()
        .filter(|d| d.month() == month && is_weekday(*d))
        .count() as u32
}
