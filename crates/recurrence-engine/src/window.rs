//! Query window and the bounded collector generators emit into.

use chrono::NaiveDate;

use crate::config::WindowEnd;

/// A caller's query window, resolved to inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl Window {
    /// Resolve `start..end` under `policy`. `None` when the window holds no days.
    pub fn resolve(start: NaiveDate, end: NaiveDate, policy: WindowEnd) -> Option<Window> {
        let last = match policy {
            WindowEnd::Inclusive => end,
            WindowEnd::Exclusive => end.pred_opt()?,
        };
        (start <= last).then_some(Window { first: start, last })
    }
}

/// Collects occurrences that satisfy every bound a rule imposes.
///
/// An occurrence is accepted when it lies in the window, is not before the
/// rule's start, and is strictly before the end-by date. Generators step
/// forward monotonically, so once [`is_done`](Self::is_done) is true for a
/// candidate it is true for everything after it.
#[derive(Debug)]
pub(crate) struct Emitter {
    window: Window,
    floor: NaiveDate,
    end_by: Option<NaiveDate>,
    limit: Option<usize>,
    dates: Vec<NaiveDate>,
}

impl Emitter {
    pub fn new(
        window: Window,
        rule_start: NaiveDate,
        end_by: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Self {
        Emitter {
            window,
            floor: window.first.max(rule_start),
            end_by,
            limit,
            dates: Vec::new(),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    /// True once `date` is past the window or the end-by date, or the limit
    /// has been reached.
    pub fn is_done(&self, date: NaiveDate) -> bool {
        self.is_full()
            || date > self.window.last
            || self.end_by.is_some_and(|end_by| date >= end_by)
    }

    fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.dates.len() >= limit)
    }

    /// Record `date` if it is in bounds.
    pub fn offer(&mut self, date: NaiveDate) {
        if date >= self.floor && !self.is_done(date) {
            self.dates.push(date);
        }
    }

    pub fn into_dates(self) -> Vec<NaiveDate> {
        self.dates
    }
}
