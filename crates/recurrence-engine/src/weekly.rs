//! Every-N-weeks expansion over a fixed set of weekdays.
//!
//! Weeks run Sunday to Saturday. The rule's cadence is counted in whole weeks
//! from the Sunday of the start date's week.

use chrono::{Days, NaiveDate};

use crate::dates::{start_adder, week_start, weeks_between};
use crate::weekdays::WeekdaySet;
use crate::window::Emitter;

pub(crate) fn expand(start: NaiveDate, interval: u32, days: WeekdaySet, out: &mut Emitter) {
    if days.is_empty() {
        return;
    }
    let Some(mut anchor) = first_anchor(start, interval, out.window().first) else {
        return;
    };

    let step = Days::new(u64::from(interval) * 7);
    while !out.is_done(anchor) {
        for day in days.iter() {
            let offset = Days::new(u64::from(day.num_days_from_sunday()));
            let Some(date) = anchor.checked_add_days(offset) else {
                return;
            };
            if out.is_done(date) {
                break;
            }
            out.offer(date);
        }
        let Some(next) = anchor.checked_add_days(step) else {
            break;
        };
        anchor = next;
    }
}

/// Sunday of the first on-cadence week that can reach `window_start`.
fn first_anchor(start: NaiveDate, interval: u32, window_start: NaiveDate) -> Option<NaiveDate> {
    let first_week = week_start(start)?;
    if start >= window_start {
        return Some(first_week);
    }
    let elapsed = weeks_between(first_week, window_start);
    let skip = elapsed + start_adder(elapsed, interval);
    tracing::trace!(%first_week, %window_start, elapsed, skip, "weekly fast-forward");
    first_week.checked_add_days(Days::new(u64::try_from(skip).ok()?.checked_mul(7)?))
}
