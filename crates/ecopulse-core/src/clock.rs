//! Wall-clock source for log timestamps.

use chrono::{Local, NaiveTime};

/// Source of the current wall-clock time of day.
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> NaiveTime;

    /// `HH:MM:SS`, zero padded.
    fn timestamp(&self) -> String {
        self.time_of_day().format("%H:%M:%S").to_string()
    }
}

/// Local time of the host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always returns the same time. Used by tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl FixedClock {
    /// Returns `None` for an invalid time of day.
    pub fn at(hour: u32, min: u32, sec: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, min, sec).map(Self)
    }
}

impl Clock for FixedClock {
    fn time_of_day(&self) -> NaiveTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn timestamp_is_zero_padded() {
        let clock = FixedClock::at(7, 3, 9).unwrap();
        assert_eq!(clock.timestamp(), "07:03:09");
    }

    #[test]
    fn invalid_time_is_rejected() {
        assert!(FixedClock::at(24, 0, 0).is_none());
    }
}
