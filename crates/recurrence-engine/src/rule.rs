//! Recurrence rules and the occurrence queries they answer.
//!
//! A [`RecurrenceRule`] is validated once when built and is read-only
//! afterwards. Each query is a pure function of the rule, the window and the
//! [`ExpansionConfig`]; nothing is cached between calls.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::{ExpansionConfig, WindowEnd};
use crate::error::{RecurrenceError, Result};
use crate::weekdays::WeekdaySet;
use crate::window::{Emitter, Window};
use crate::{daily, monthly, weekly};

/// How often a rule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl FromStr for Frequency {
    type Err = RecurrenceError;

    /// Accepts the stored one-letter codes (`D`, `W`, `M`, `Y`) and the full
    /// names, case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "DAILY" => Ok(Frequency::Daily),
            "W" | "WEEKLY" => Ok(Frequency::Weekly),
            "M" | "MONTHLY" => Ok(Frequency::Monthly),
            "Y" | "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(RecurrenceError::UnknownPattern(s.to_string())),
        }
    }
}

impl Frequency {
    /// The one-letter stored code.
    pub fn code(self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
            Frequency::Yearly => "Y",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

/// Which day of a month a monthly or yearly rule lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthDay {
    /// A fixed day of the month, 1–31.
    Day(u32),
    /// The `week`-th (1–5) occurrence of `weekday` in the month.
    NthWeekday { week: u8, weekday: Weekday },
}

impl MonthDay {
    fn validate(self) -> Result<()> {
        match self {
            MonthDay::Day(day) if !(1..=31).contains(&day) => Err(RecurrenceError::OutOfRange {
                field: "day_of_month",
                value: i64::from(day),
            }),
            MonthDay::NthWeekday { week, .. } if !(1..=5).contains(&week) => {
                Err(RecurrenceError::OutOfRange {
                    field: "week_of_month",
                    value: i64::from(week),
                })
            }
            _ => Ok(()),
        }
    }
}

/// The pattern-specific part of a rule. Each variant carries exactly the
/// fields its frequency needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Pattern {
    Daily { weekdays_only: bool },
    Weekly { days: WeekdaySet },
    Monthly { on: MonthDay },
    /// `month` is 1–12.
    Yearly { month: u32, on: MonthDay },
}

impl Pattern {
    pub fn frequency(&self) -> Frequency {
        match self {
            Pattern::Daily { .. } => Frequency::Daily,
            Pattern::Weekly { .. } => Frequency::Weekly,
            Pattern::Monthly { .. } => Frequency::Monthly,
            Pattern::Yearly { .. } => Frequency::Yearly,
        }
    }

    fn validate(&self) -> Result<()> {
        match *self {
            Pattern::Daily { .. } | Pattern::Weekly { .. } => Ok(()),
            Pattern::Monthly { on } => on.validate(),
            Pattern::Yearly { month, on } => {
                if !(1..=12).contains(&month) {
                    return Err(RecurrenceError::OutOfRange {
                        field: "month",
                        value: i64::from(month),
                    });
                }
                on.validate()
            }
        }
    }
}

/// A validated recurrence rule.
///
/// Stored rules are read through [`RecurrenceRecord`](crate::RecurrenceRecord),
/// which validates on conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecurrenceRule {
    start: NaiveDate,
    time_of_day: Option<NaiveTime>,
    interval: u32,
    end_by: Option<NaiveDate>,
    pattern: Pattern,
}

/// Builder for [`RecurrenceRule`]; validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    start: NaiveDate,
    time_of_day: Option<NaiveTime>,
    interval: i64,
    end_by: Option<NaiveDate>,
    pattern: Pattern,
}

impl RuleBuilder {
    /// Repeat every `interval` days, weeks, months or years. Defaults to 1.
    pub fn interval(mut self, interval: i64) -> Self {
        self.interval = interval;
        self
    }

    /// No occurrence is produced on or after this date.
    pub fn end_by(mut self, end_by: NaiveDate) -> Self {
        self.end_by = Some(end_by);
        self
    }

    /// Clock time echoed into [`RecurrenceRule::instances_between`].
    pub fn time_of_day(mut self, time: NaiveTime) -> Self {
        self.time_of_day = Some(time);
        self
    }

    /// # Errors
    /// Returns `RecurrenceError::InvalidInterval` if the interval is below 1 or
    /// above `i32::MAX`, and `RecurrenceError::OutOfRange` if a month,
    /// day-of-month or week-of-month is outside its domain.
    pub fn build(self) -> Result<RecurrenceRule> {
        let interval = i32::try_from(self.interval)
            .ok()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| *n >= 1)
            .ok_or(RecurrenceError::InvalidInterval(self.interval))?;
        self.pattern.validate()?;
        Ok(RecurrenceRule {
            start: self.start,
            time_of_day: self.time_of_day,
            interval,
            end_by: self.end_by,
            pattern: self.pattern,
        })
    }
}

impl RecurrenceRule {
    pub fn builder(start: NaiveDate, pattern: Pattern) -> RuleBuilder {
        RuleBuilder {
            start,
            time_of_day: None,
            interval: 1,
            end_by: None,
            pattern,
        }
    }

    /// Builder seeded from a full timestamp: the date anchors the rule and the
    /// clock time is kept only for echoing into instances.
    pub fn builder_at(start: NaiveDateTime, pattern: Pattern) -> RuleBuilder {
        Self::builder(start.date(), pattern).time_of_day(start.time())
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn time_of_day(&self) -> Option<NaiveTime> {
        self.time_of_day
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn end_by(&self) -> Option<NaiveDate> {
        self.end_by
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Occurrence dates within `[window_start, window_end]`, ascending.
    pub fn occurrences_between(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<NaiveDate> {
        self.occurrences_between_with(&ExpansionConfig::default(), window_start, window_end)
    }

    /// Occurrence dates within the window, interpreted under `config`.
    ///
    /// The result is ascending and duplicate-free. Every date is on or after
    /// the rule's start and, when an end-by date is set, strictly before it.
    pub fn occurrences_between_with(
        &self,
        config: &ExpansionConfig,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<NaiveDate> {
        let Some(window) = Window::resolve(window_start, window_end, config.window_end) else {
            return Vec::new();
        };

        let mut out = Emitter::new(window, self.start, self.end_by, config.limit);
        match self.pattern {
            Pattern::Daily { weekdays_only } => {
                daily::expand(self.start, self.interval, weekdays_only, &mut out)
            }
            Pattern::Weekly { days } => weekly::expand(self.start, self.interval, days, &mut out),
            Pattern::Monthly { on } => monthly::expand_monthly(
                self.start,
                self.interval,
                on,
                config.day_overflow,
                &mut out,
            ),
            Pattern::Yearly { month, on } => monthly::expand_yearly(
                self.start,
                self.interval,
                month,
                on,
                config.day_overflow,
                &mut out,
            ),
        }
        let dates = out.into_dates();

        tracing::debug!(
            frequency = %self.pattern.frequency(),
            interval = self.interval,
            window_start = %window.first,
            window_end = %window.last,
            count = dates.len(),
            "expanded recurrence"
        );
        dates
    }

    /// Like [`occurrences_between`](Self::occurrences_between), with the rule's
    /// time of day attached (midnight when the rule carries none).
    pub fn instances_between(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<NaiveDateTime> {
        self.instances_between_with(&ExpansionConfig::default(), window_start, window_end)
    }

    pub fn instances_between_with(
        &self,
        config: &ExpansionConfig,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Vec<NaiveDateTime> {
        let time = self.time_of_day.unwrap_or(NaiveTime::MIN);
        self.occurrences_between_with(config, window_start, window_end)
            .into_iter()
            .map(|date| date.and_time(time))
            .collect()
    }

    /// Whether the rule has an occurrence on `date`.
    pub fn is_occurrence_on(&self, date: NaiveDate) -> bool {
        self.is_occurrence_on_with(&ExpansionConfig::default(), date)
    }

    /// Membership under `config`. The single-day window is always inclusive
    /// and unlimited regardless of `config`; only the day-overflow policy
    /// applies.
    pub fn is_occurrence_on_with(&self, config: &ExpansionConfig, date: NaiveDate) -> bool {
        let config = ExpansionConfig {
            window_end: WindowEnd::Inclusive,
            limit: None,
            ..*config
        };
        self.occurrences_between_with(&config, date, date) == [date]
    }
}
