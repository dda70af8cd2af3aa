//! Every-N-days and every-N-weekdays expansion.

use chrono::{Days, NaiveDate};

use crate::dates::{
    add_weekdays, days_between, next_weekday_on_or_after, start_adder, weekdays_between,
};
use crate::window::Emitter;

pub(crate) fn expand(start: NaiveDate, interval: u32, weekdays_only: bool, out: &mut Emitter) {
    let Some(mut cursor) = first_candidate(start, interval, weekdays_only, out.window().first)
    else {
        return;
    };

    while !out.is_done(cursor) {
        out.offer(cursor);
        let next = if weekdays_only {
            add_weekdays(cursor, u64::from(interval))
        } else {
            cursor.checked_add_days(Days::new(u64::from(interval)))
        };
        let Some(next) = next else { break };
        cursor = next;
    }
}

fn first_candidate(
    start: NaiveDate,
    interval: u32,
    weekdays_only: bool,
    window_start: NaiveDate,
) -> Option<NaiveDate> {
    // A weekdays-only rule that starts on a weekend begins the Monday after.
    let start = if weekdays_only {
        next_weekday_on_or_after(start)?
    } else {
        start
    };

    if start >= window_start {
        Some(start)
    } else if weekdays_only {
        first_weekday_step_on_or_after(start, interval, window_start)
    } else {
        first_day_step_on_or_after(start, interval, window_start)
    }
}

/// First date of the form `start + k·interval` days that is on or after `target`.
fn first_day_step_on_or_after(
    start: NaiveDate,
    interval: u32,
    target: NaiveDate,
) -> Option<NaiveDate> {
    let elapsed = days_between(start, target);
    let skip = elapsed + start_adder(elapsed, interval);
    tracing::trace!(%start, %target, elapsed, skip, "daily fast-forward");
    start.checked_add_days(Days::new(u64::try_from(skip).ok()?))
}

/// First date `k·interval` weekdays after `start` that is on or after `target`.
///
/// `start` must be a weekday. Weekday positions are counted from `start`
/// (position 0); the first weekday on or after `target` has position equal to
/// the number of weekdays in `(start, that day]`, and every later weekday
/// position maps to a later date, so rounding that position up to the cadence
/// gives the answer directly.
fn first_weekday_step_on_or_after(
    start: NaiveDate,
    interval: u32,
    target: NaiveDate,
) -> Option<NaiveDate> {
    let landing = next_weekday_on_or_after(target)?;
    let elapsed = weekdays_between(start, landing);
    let skip = start_adder(elapsed, interval);
    tracing::trace!(%start, %landing, elapsed, skip, "weekday fast-forward");
    add_weekdays(landing, u64::try_from(skip).ok()?)
}
