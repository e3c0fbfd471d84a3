// src/calendar.rs
use chrono::{Datelike, NaiveDate, Weekday};

/// Standard Gregorian day count for a month. `None` for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next.signed_duration_since(first).num_days() as u32)
}

/// First and last calendar date of a month. `None` for an invalid month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month)?)?;
    Some((first, last))
}

/// Default rest-day heuristic for days with no raw record: Sunday.
/// An explicit rest/holiday flag on a raw record always wins over this.
pub fn is_default_rest_day(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}
