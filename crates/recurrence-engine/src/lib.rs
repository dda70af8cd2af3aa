//! # recurrence-engine
//!
//! Date-granularity recurrence expansion for calendar back ends.
//!
//! Given a rule (daily, weekly, monthly or yearly, every N units, with
//! pattern-specific constraints) and a query window, the engine returns the
//! concrete dates the rule falls on. Each generator fast-forwards straight to
//! the first on-cadence candidate in the window, so a rule that started years
//! before the window costs no more than one that starts inside it.
//!
//! ## Modules
//!
//! - [`rule`] — validated rules, the builder, and occurrence queries
//! - [`record`] — flat storage-shaped records and their conversion to rules
//! - [`dates`] — day/week/month/year distances and the fast-forward primitive
//! - [`weekdays`] — Sunday-first weekday sets
//! - [`config`] — window-end and day-overflow options
//! - [`error`] — Error types
//!
//! ```
//! use chrono::NaiveDate;
//! use recurrence_engine::{MonthDay, Pattern, RecurrenceRule};
//!
//! let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
//! let rule = RecurrenceRule::builder(start, Pattern::Monthly { on: MonthDay::Day(15) })
//!     .build()
//!     .unwrap();
//! let dates = rule.occurrences_between(start, NaiveDate::from_ymd_opt(2016, 3, 31).unwrap());
//! assert_eq!(dates.len(), 3);
//! ```

pub mod config;
pub mod dates;
pub mod error;
pub mod record;
pub mod rule;
pub mod weekdays;

mod daily;
mod monthly;
mod weekly;
mod window;

pub use config::{DayOverflow, ExpansionConfig, WindowEnd};
pub use error::RecurrenceError;
pub use record::RecurrenceRecord;
pub use rule::{Frequency, MonthDay, Pattern, RecurrenceRule, RuleBuilder};
pub use weekdays::WeekdaySet;
