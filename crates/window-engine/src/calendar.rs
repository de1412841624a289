//! Calendar helpers for month-length-dependent window geometry.

use chrono::NaiveDate;

/// The last day (28–31) of `month` in `year`.
///
/// `month` is 1-based. Out-of-range months are treated as 31-day months;
/// callers only pass months taken from a valid date.
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// The (month, year) immediately before `month` of `year`.
///
/// January rolls back to December of the previous year.
pub fn previous_month(month: u32, year: i32) -> (u32, i32) {
    if month <= 1 {
        (12, year - 1)
    } else {
        (month - 1, year)
    }
}

/// The (month, year) immediately after `month` of `year`.
pub fn next_month(month: u32, year: i32) -> (u32, i32) {
    if month >= 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}
