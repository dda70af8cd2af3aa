//! Flat, storage-shaped rule records.
//!
//! [`RecurrenceRecord`] mirrors how rules are persisted by callers: a pattern
//! code string, a signed interval and nullable pattern-specific columns. It is
//! converted to a validated [`RecurrenceRule`] before any expansion runs.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::ExpansionConfig;
use crate::error::{RecurrenceError, Result};
use crate::rule::{Frequency, MonthDay, Pattern, RecurrenceRule};
use crate::weekdays::{weekday_from_sunday, WeekdaySet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRecord {
    /// Accepts `2016-01-01` or `2016-01-01T12:30:00`; the clock time is only
    /// echoed into instances, never used in date arithmetic.
    #[serde(with = "stamp")]
    pub start: NaiveDateTime,
    /// `D`, `W`, `M`, `Y` or the full frequency name.
    pub pattern: String,
    #[serde(default = "default_interval")]
    pub interval: i64,
    #[serde(default, with = "stamp::optional", skip_serializing_if = "Option::is_none")]
    pub end_by: Option<NaiveDateTime>,
    /// Daily only. Unset means every day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_weekdays: Option<bool>,
    /// Weekly only. Unset means all seven days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekdays: Option<Vec<Weekday>>,
    /// Weekly only, the stored 7-bit mask (64 = Sunday … 1 = Saturday). Read
    /// when `weekdays` is unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_days_included: Option<u8>,
    /// Yearly only, 1–12.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    /// Monthly/yearly, 1–31. Takes precedence over the week/day-of-week pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Monthly/yearly, 1–5. Used together with `day_of_week`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week_of_month: Option<u8>,
    /// Monthly/yearly, 0 = Sunday … 6 = Saturday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
}

fn default_interval() -> i64 {
    1
}

impl RecurrenceRecord {
    /// A record with only the common fields set.
    pub fn new(start: NaiveDateTime, pattern: impl Into<String>, interval: i64) -> Self {
        RecurrenceRecord {
            start,
            pattern: pattern.into(),
            interval,
            end_by: None,
            only_weekdays: None,
            weekdays: None,
            weekly_days_included: None,
            month: None,
            day_of_month: None,
            week_of_month: None,
            day_of_week: None,
        }
    }

    /// Validate and convert into a [`RecurrenceRule`].
    ///
    /// # Errors
    /// - `UnknownPattern` for an unrecognized pattern code.
    /// - `IncompleteRule` when a monthly/yearly record has neither
    ///   `day_of_month` nor both `week_of_month` and `day_of_week`, or a yearly
    ///   record has no `month`.
    /// - `OutOfRange` / `InvalidInterval` as reported by the rule builder.
    pub fn to_rule(&self) -> Result<RecurrenceRule> {
        let frequency: Frequency = self.pattern.parse()?;
        let pattern = match frequency {
            Frequency::Daily => Pattern::Daily {
                weekdays_only: self.only_weekdays.unwrap_or(false),
            },
            Frequency::Weekly => Pattern::Weekly {
                days: self.weekly_days()?,
            },
            Frequency::Monthly => Pattern::Monthly {
                on: self.month_day()?,
            },
            Frequency::Yearly => Pattern::Yearly {
                month: self.month.ok_or_else(|| {
                    RecurrenceError::IncompleteRule("yearly rule has no month".to_string())
                })?,
                on: self.month_day()?,
            },
        };

        let mut builder = RecurrenceRule::builder_at(self.start, pattern).interval(self.interval);
        if let Some(end_by) = self.end_by {
            builder = builder.end_by(end_by.date());
        }
        builder.build()
    }

    /// Store `rule` in record form. Weekly days are written as the legacy
    /// mask, and a rule without a time of day is stored at midnight.
    pub fn from_rule(rule: &RecurrenceRule) -> Self {
        let time = rule.time_of_day().unwrap_or(NaiveTime::MIN);
        let mut record = RecurrenceRecord::new(
            rule.start().and_time(time),
            rule.pattern().frequency().code(),
            i64::from(rule.interval()),
        );
        record.end_by = rule.end_by().map(|date| date.and_time(NaiveTime::MIN));

        match *rule.pattern() {
            Pattern::Daily { weekdays_only } => record.only_weekdays = Some(weekdays_only),
            Pattern::Weekly { days } => {
                record.weekly_days_included = Some(days.to_legacy_mask());
            }
            Pattern::Monthly { on } => record.set_month_day(on),
            Pattern::Yearly { month, on } => {
                record.month = Some(month);
                record.set_month_day(on);
            }
        }
        record
    }

    fn weekly_days(&self) -> Result<WeekdaySet> {
        if let Some(days) = &self.weekdays {
            return Ok(days.iter().copied().collect());
        }
        match self.weekly_days_included {
            Some(mask) if mask > 0b111_1111 => Err(RecurrenceError::OutOfRange {
                field: "weekly_days_included",
                value: i64::from(mask),
            }),
            Some(mask) => Ok(WeekdaySet::from_legacy_mask(mask)),
            None => Ok(WeekdaySet::ALL),
        }
    }

    fn set_month_day(&mut self, on: MonthDay) {
        match on {
            MonthDay::Day(day) => self.day_of_month = Some(day),
            MonthDay::NthWeekday { week, weekday } => {
                self.week_of_month = Some(week);
                self.day_of_week = Some(weekday.num_days_from_sunday() as u8);
            }
        }
    }

    fn month_day(&self) -> Result<MonthDay> {
        if let Some(day) = self.day_of_month {
            return Ok(MonthDay::Day(day));
        }
        match (self.week_of_month, self.day_of_week) {
            (Some(week), Some(index)) => {
                let weekday = weekday_from_sunday(index).ok_or(RecurrenceError::OutOfRange {
                    field: "day_of_week",
                    value: i64::from(index),
                })?;
                Ok(MonthDay::NthWeekday { week, weekday })
            }
            _ => Err(RecurrenceError::IncompleteRule(
                "needs day_of_month, or both week_of_month and day_of_week".to_string(),
            )),
        }
    }

    /// Occurrences within `[window_start, window_end]`.
    ///
    /// A record with an unrecognized pattern code matches nothing and returns
    /// an empty list, so codes added by newer writers do not break older
    /// readers. Any other invalid record is an error.
    pub fn occurrences_between(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        self.occurrences_between_with(&ExpansionConfig::default(), window_start, window_end)
    }

    pub fn occurrences_between_with(
        &self,
        config: &ExpansionConfig,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<NaiveDate>> {
        match self.to_rule() {
            Ok(rule) => Ok(rule.occurrences_between_with(config, window_start, window_end)),
            Err(RecurrenceError::UnknownPattern(code)) => {
                tracing::debug!(%code, "unrecognized pattern code; no occurrences");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Whether the record's rule has an occurrence on `date`. Unrecognized
    /// pattern codes never match.
    pub fn is_occurrence_on(&self, date: NaiveDate) -> Result<bool> {
        self.is_occurrence_on_with(&ExpansionConfig::default(), date)
    }

    pub fn is_occurrence_on_with(
        &self,
        config: &ExpansionConfig,
        date: NaiveDate,
    ) -> Result<bool> {
        match self.to_rule() {
            Ok(rule) => Ok(rule.is_occurrence_on_with(config, date)),
            Err(RecurrenceError::UnknownPattern(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Date or datetime on input; always a datetime on output.
mod stamp {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stamp {
        DateTime(NaiveDateTime),
        Date(NaiveDate),
    }

    impl Stamp {
        fn into_datetime(self) -> NaiveDateTime {
            match self {
                Stamp::DateTime(dt) => dt,
                Stamp::Date(d) => d.and_time(NaiveTime::MIN),
            }
        }
    }

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        Stamp::deserialize(deserializer).map(Stamp::into_datetime)
    }

    pub mod optional {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use super::Stamp;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Ok(Option::<Stamp>::deserialize(deserializer)?.map(Stamp::into_datetime))
        }
    }
}
