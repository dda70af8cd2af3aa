//! Every-N-months and every-N-years expansion.
//!
//! Both patterns walk a first-of-month anchor and compute at most one
//! occurrence per period from a [`MonthDay`]. Occurrences are never carried
//! into a neighbouring period: a 5th Friday that does not exist, or a 31st in
//! a 30-day month under [`DayOverflow::Skip`], simply yields nothing.

use chrono::{Datelike, Days, NaiveDate};

use crate::config::DayOverflow;
use crate::dates::{
    add_months, days_in_month, first_of_month, months_between, start_adder, years_between,
};
use crate::rule::MonthDay;
use crate::window::Emitter;

pub(crate) fn expand_monthly(
    start: NaiveDate,
    interval: u32,
    on: MonthDay,
    overflow: DayOverflow,
    out: &mut Emitter,
) {
    let Some(mut anchor) = first_month_anchor(start, interval, out.window().first) else {
        return;
    };

    while !out.is_done(anchor) {
        if let Some(date) = occurrence_in_month(anchor, on, overflow) {
            out.offer(date);
        }
        let Some(next) = add_months(anchor, interval) else {
            break;
        };
        anchor = next;
    }
}

fn first_month_anchor(
    start: NaiveDate,
    interval: u32,
    window_start: NaiveDate,
) -> Option<NaiveDate> {
    let first_month = first_of_month(start)?;
    if start >= window_start {
        return Some(first_month);
    }
    let elapsed = months_between(first_month, window_start).max(0);
    let skip = elapsed + start_adder(elapsed, interval);
    tracing::trace!(%first_month, %window_start, elapsed, skip, "monthly fast-forward");
    add_months(first_month, u32::try_from(skip).ok()?)
}

pub(crate) fn expand_yearly(
    start: NaiveDate,
    interval: u32,
    month: u32,
    on: MonthDay,
    overflow: DayOverflow,
    out: &mut Emitter,
) {
    let Some(mut year) = first_on_cadence_year(start, interval, month, out.window().first) else {
        return;
    };

    while let Some(anchor) = NaiveDate::from_ymd_opt(year, month, 1) {
        if out.is_done(anchor) {
            break;
        }
        if let Some(date) = occurrence_in_month(anchor, on, overflow) {
            out.offer(date);
        }
        let Some(next) = i32::try_from(interval).ok().and_then(|step| year.checked_add(step))
        else {
            break;
        };
        year = next;
    }
}

fn first_on_cadence_year(
    start: NaiveDate,
    interval: u32,
    month: u32,
    window_start: NaiveDate,
) -> Option<i32> {
    let first_year = NaiveDate::from_ymd_opt(start.year(), month, 1)?;
    if start >= window_start {
        return Some(first_year.year());
    }
    // The target month may still be ahead of the window start in the start
    // year, in which case no whole year has elapsed yet.
    let elapsed = years_between(first_year, window_start).max(0);
    let skip = elapsed + start_adder(elapsed, interval);
    tracing::trace!(%first_year, %window_start, elapsed, skip, "yearly fast-forward");
    first_year.year().checked_add(i32::try_from(skip).ok()?)
}

/// The single occurrence `on` produces in the month starting at `anchor`.
///
/// `anchor` must be the first of a month.
pub(crate) fn occurrence_in_month(
    anchor: NaiveDate,
    on: MonthDay,
    overflow: DayOverflow,
) -> Option<NaiveDate> {
    match on {
        MonthDay::Day(day) => {
            let last = days_in_month(anchor.year(), anchor.month())?;
            let day = match overflow {
                DayOverflow::Skip if day > last => return None,
                DayOverflow::Skip => day,
                DayOverflow::Clamp => day.min(last),
            };
            anchor.with_day(day)
        }
        MonthDay::NthWeekday { week, weekday } => {
            let anchor_dow = anchor.weekday().num_days_from_sunday();
            let target_dow = weekday.num_days_from_sunday();
            // When the target weekday is on or after the anchor's weekday its
            // first appearance shares the anchor's week.
            let mut weeks = u32::from(week);
            if target_dow >= anchor_dow {
                weeks -= 1;
            }
            let offset = 7 * weeks + target_dow - anchor_dow;
            let date = anchor.checked_add_days(Days::new(u64::from(offset)))?;
            (date.month() == anchor.month()).then_some(date)
        }
    }
}
