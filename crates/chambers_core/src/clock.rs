//! Injectable time source.
//!
//! # Responsibility
//! - Abstract "now" behind a trait so recurrence and day-count rules are
//!   deterministic under test.
//!
//! # Invariants
//! - All temporal reasoning in this crate goes through [`Clock`]; nothing
//!   below the CLI calls `Utc::now()` directly.

use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as epoch milliseconds.
    fn now_ms(&self) -> i64 {
        self.now().timestamp_millis()
    }

    /// Current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation used by the CLI trigger surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant. Intended for tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, FixedClock};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn fixed_clock_reports_the_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap();
        let clock = FixedClock::at(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now_ms(), instant.timestamp_millis());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    }
}
