use chrono::{Duration, NaiveDate};
use std::fmt;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// The most recent completed day, i.e. yesterday.
    pub fn candidate(today: NaiveDate) -> Self {
        let yesterday = today - Duration::days(1);
        Self::new(yesterday, yesterday)
    }

    /// The `days` days immediately preceding the candidate day. Never
    /// overlaps [`DateWindow::candidate`] for the same `today`.
    pub fn trend(today: NaiveDate, days: u32) -> Self {
        let candidate_day = today - Duration::days(1);
        let days = i64::from(days.max(1));
        Self::new(
            candidate_day - Duration::days(days),
            candidate_day - Duration::days(1),
        )
    }

    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}
