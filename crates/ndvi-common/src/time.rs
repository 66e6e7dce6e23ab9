//! Date handling for observation ages and windows.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Today's date in UTC.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whole days between `observation_date` and `today`.
///
/// Negative when the observation is dated in the future.
pub fn age_in_days(observation_date: NaiveDate, today: NaiveDate) -> i64 {
    (today - observation_date).num_days()
}

/// Inclusive date range covered by a window of observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Smallest range covering all dates, or `None` for an empty iterator.
    pub fn covering<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut iter = dates.into_iter();
        let first = iter.next()?;
        let (start, end) = iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days spanned, counting both ends.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
