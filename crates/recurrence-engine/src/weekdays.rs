//! A compact set of weekdays with a fixed Sunday→Saturday iteration order.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// The days of the week a weekly rule falls on.
///
/// Iteration always yields days Sunday first, which is the order occurrences
/// within one week are emitted in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);
    /// Monday through Friday.
    pub const WORKWEEK: WeekdaySet = WeekdaySet(0b011_1110);

    pub fn single(day: Weekday) -> Self {
        WeekdaySet(bit(day))
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !bit(day);
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in Sunday→Saturday order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        SUNDAY_FIRST.into_iter().filter(move |d| self.contains(*d))
    }

    /// Decode the legacy stored mask: 64 = Sun, 32 = Mon, 16 = Tue, 8 = Wed,
    /// 4 = Thu, 2 = Fri, 1 = Sat. Bits above the seventh are ignored.
    pub fn from_legacy_mask(mask: u8) -> Self {
        SUNDAY_FIRST
            .into_iter()
            .enumerate()
            .filter(|(i, _)| mask & (0b100_0000 >> i) != 0)
            .map(|(_, d)| d)
            .collect()
    }

    /// Encode in the legacy stored mask layout (see [`from_legacy_mask`](Self::from_legacy_mask)).
    pub fn to_legacy_mask(self) -> u8 {
        SUNDAY_FIRST
            .into_iter()
            .enumerate()
            .filter(|(_, d)| self.contains(*d))
            .fold(0, |mask, (i, _)| mask | (0b100_0000 >> i))
    }
}

/// Weekday for a Sunday-based index (0 = Sunday … 6 = Saturday).
pub fn weekday_from_sunday(index: u8) -> Option<Weekday> {
    SUNDAY_FIRST.get(usize::from(index)).copied()
}

fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_sunday()
}

impl Default for WeekdaySet {
    fn default() -> Self {
        WeekdaySet::ALL
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        days.into_iter().collect()
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Debug for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
