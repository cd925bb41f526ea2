//! Clock abstraction

use chrono::{Local, NaiveDate};

/// Source of the current calendar date.
///
/// Relative dates ("tomorrow", "next friday") are anchored to this, so tests
/// inject a [`FixedClock`] for determinism.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Server-local wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Pin to a calendar date; `None` when the date does not exist
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::ymd(2025, 1, 6).unwrap();
        assert_eq!(clock.today().to_string(), "2025-01-06");
        assert!(FixedClock::ymd(2025, 2, 30).is_none());
    }
}
