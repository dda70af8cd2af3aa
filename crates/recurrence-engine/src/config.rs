//! Expansion options for behaviors that callers disagree on.
//!
//! Rules carry no options of their own; the same rule can be expanded under
//! different configurations without being rebuilt.

use serde::{Deserialize, Serialize};

/// Whether the query window's end date is itself eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowEnd {
    /// `[start, end]`: an occurrence on `end` is returned.
    #[default]
    Inclusive,
    /// `[start, end)`: expansion stops the day before `end`.
    Exclusive,
}

/// What a fixed day-of-month does in a month that is too short for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOverflow {
    /// The month contributes no occurrence (day 31 never lands in April).
    #[default]
    Skip,
    /// Fall back to the month's last day (day 31 lands on April 30).
    Clamp,
}

/// Options applied to a single expansion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub window_end: WindowEnd,
    pub day_overflow: DayOverflow,
    /// Stop after this many occurrences. `None` expands the whole window.
    pub limit: Option<usize>,
}

impl ExpansionConfig {
    pub fn with_window_end(mut self, window_end: WindowEnd) -> Self {
        self.window_end = window_end;
        self
    }

    pub fn with_day_overflow(mut self, day_overflow: DayOverflow) -> Self {
        self.day_overflow = day_overflow;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
