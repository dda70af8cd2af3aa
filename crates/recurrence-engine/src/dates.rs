//! Calendar arithmetic shared by every generator.
//!
//! All functions work on whole days (`NaiveDate`). Distances are signed so a
//! reversed pair yields a negative count instead of an error. Stepping
//! functions return `None` only when the result would leave chrono's
//! representable range.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::weekdays::WeekdaySet;

/// Whole calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Whole weeks from `from` to `to`, rounded toward the past.
pub fn weeks_between(from: NaiveDate, to: NaiveDate) -> i64 {
    days_between(from, to).div_euclid(7)
}

/// Whole months from `from` to `to`.
///
/// A trailing partial month is not counted: Jan 30 → Feb 1 is zero months.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let years = i64::from(to.year() - from.year());
    let mut months = i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    years * 12 + months
}

/// Whole years from `from` to `to`, counted on the month only.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let mut years = i64::from(to.year() - from.year());
    if to.month() < from.month() {
        years -= 1;
    }
    years
}

/// Number of Monday–Friday dates in the half-open span `(from, to]`.
///
/// Returns 0 when `to` is not after `from`.
pub fn weekdays_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let days = days_between(from, to);
    if days <= 0 {
        return 0;
    }
    let weeks = days / 7;
    let tail = (1..=days % 7)
        .filter_map(|i| from.checked_add_days(Days::new(i as u64)))
        .filter(|d| !is_weekend(*d))
        .count() as i64;
    weeks * 5 + tail
}

/// Smallest non-negative `a` such that `elapsed + a` is a multiple of
/// `interval`.
///
/// This is the fast-forward primitive: given how many units have passed since
/// a rule's anchor, it says how many more units to skip to land back on the
/// rule's cadence. Negative `elapsed` is handled with Euclidean remainder, so
/// an anchor that lies after the target still lands on-cadence.
pub fn start_adder(elapsed: i64, interval: u32) -> i64 {
    let interval = i64::from(interval.max(1));
    match elapsed.rem_euclid(interval) {
        0 => 0,
        rem => interval - rem,
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    !WeekdaySet::WORKWEEK.contains(date.weekday())
}

/// `date` itself on a weekday, otherwise the following Monday.
pub fn next_weekday_on_or_after(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => date.checked_add_days(Days::new(2)),
        Weekday::Sun => date.checked_add_days(Days::new(1)),
        _ => Some(date),
    }
}

/// Advance `from` by exactly `count` weekdays, skipping Saturdays and Sundays.
///
/// Starting on a weekend, the first weekday reached is the following Monday.
pub fn add_weekdays(from: NaiveDate, count: u64) -> Option<NaiveDate> {
    if count == 0 {
        return Some(from);
    }
    let mut date = from;
    let mut remaining = count;
    if is_weekend(date) {
        date = next_weekday_on_or_after(date)?;
        remaining -= 1;
    }

    // From a weekday, five weekdays are always exactly one calendar week.
    date = date.checked_add_days(Days::new(remaining / 5 * 7))?;
    for _ in 0..remaining % 5 {
        date = date.succ_opt()?;
        while is_weekend(date) {
            date = date.succ_opt()?;
        }
    }
    Some(date)
}

/// The Sunday that starts `date`'s week.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    let offset = date.weekday().num_days_from_sunday();
    date.checked_sub_days(Days::new(u64::from(offset)))
}

pub fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Shift by whole months. Only meaningful for first-of-month anchors, where
/// no day clamping can occur.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some(days_between(first, next) as u32)
}
