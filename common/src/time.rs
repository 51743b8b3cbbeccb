//! Time utilities and constants for FxCalc.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::fmt;

/// Timing constants.
pub mod constants {
    use super::Duration;

    /// Lower bound of simulated rate-feed latency (200 milliseconds).
    pub fn min_simulated_latency() -> Duration {
        Duration::milliseconds(200)
    }

    /// Upper bound of simulated rate-feed latency (600 milliseconds).
    pub fn max_simulated_latency() -> Duration {
        Duration::milliseconds(600)
    }

    /// Default rate fetch timeout (5 seconds).
    pub fn fetch_timeout() -> Duration {
        Duration::seconds(5)
    }
}

/// A timestamp with timezone (always UTC internally).
pub type Timestamp = DateTime<Utc>;

/// Get the current timestamp.
pub fn now() -> Timestamp {
    Utc::now()
}

/// Time elapsed since `timestamp`, clamped at zero.
pub fn age_of(timestamp: Timestamp) -> Duration {
    let age = now() - timestamp;
    if age < Duration::zero() {
        Duration::zero()
    } else {
        age
    }
}

/// Format a timestamp as a 12-hour wall clock label, e.g. `09:41 AM`.
pub fn format_clock<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    timestamp.format("%I:%M %p").to_string()
}

/// Format a UTC timestamp as a clock label in the local timezone.
pub fn format_clock_local(timestamp: Timestamp) -> String {
    format_clock(&timestamp.with_timezone(&Local))
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        let morning = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap();
        assert_eq!(format_clock(&morning), "09:05 AM");

        let evening = Utc.with_ymd_and_hms(2024, 3, 1, 21, 41, 59).unwrap();
        assert_eq!(format_clock(&evening), "09:41 PM");
    }

    #[test]
    fn test_age_of_clamps_future() {
        let future = now() + Duration::seconds(10);
        assert_eq!(age_of(future), Duration::zero());

        let past = now() - Duration::seconds(10);
        assert!(age_of(past) >= Duration::seconds(10));
    }

    #[test]
    fn test_negative_duration_as_std() {
        assert_eq!(Duration::milliseconds(-5).as_std(), std::time::Duration::ZERO);
        assert_eq!(
            constants::fetch_timeout().as_std(),
            std::time::Duration::from_secs(5)
        );
    }
}
