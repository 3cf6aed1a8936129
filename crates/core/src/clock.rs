//! Injectable time source.
//!
//! Expiry classification and alert priorities depend on "now" at call time;
//! tests need to pin the calendar to hit window boundaries exactly, so the
//! service layer takes a `Clock` rather than calling `Utc::now()` directly.
//! Pure functions stay clock-free and take explicit `today`/`now` parameters.

use chrono::{DateTime, NaiveDate, Utc};

/// Time source abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Frozen time for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_is_frozen() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let clock = FixedClock::at(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.today(), instant.date_naive());
    }
}
