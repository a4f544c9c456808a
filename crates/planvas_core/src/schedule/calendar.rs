//! Calendar arithmetic for schedule placement.
//!
//! All instants are naive (no timezone) with millisecond resolution. Every
//! step is checked; `None` means the result falls outside the representable
//! date range.

use chrono::{Datelike, Duration, NaiveDateTime, Weekday};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

pub fn is_weekend(instant: NaiveDateTime) -> bool {
    matches!(instant.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Moves a Saturday or Sunday instant to the following Monday.
pub fn skip_weekend(instant: NaiveDateTime) -> Option<NaiveDateTime> {
    match instant.weekday() {
        Weekday::Sat => instant.checked_add_signed(Duration::days(2)),
        Weekday::Sun => instant.checked_add_signed(Duration::days(1)),
        _ => Some(instant),
    }
}

/// End instant when every calendar day counts: `start + days * 24h - 1ms`.
///
/// A whole-day duration ends on the last millisecond of its last day.
pub fn calendar_end(start: NaiveDateTime, duration_days: f64) -> Option<NaiveDateTime> {
    let millis = (duration_days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let span = Duration::try_milliseconds(millis as i64)?;
    start
        .checked_add_signed(span)?
        .checked_sub_signed(Duration::milliseconds(1))
}

/// End instant when only Monday to Friday count as working days.
///
/// The start day is the first working day; the walk advances one calendar day
/// at a time until `ceil(duration) - 1` weekdays were passed. Durations of
/// zero or less end where they start.
pub fn business_end(start: NaiveDateTime, duration_days: f64) -> Option<NaiveDateTime> {
    let total_days = duration_days.ceil();
    if !total_days.is_finite() {
        return None;
    }
    if total_days <= 0.0 {
        return Some(start);
    }

    let mut current = start;
    let mut advanced = 0.0;
    while advanced < total_days - 1.0 {
        current = current.checked_add_signed(Duration::days(1))?;
        if !is_weekend(current) {
            advanced += 1.0;
        }
    }
    Some(current)
}
