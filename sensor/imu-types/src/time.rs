//! Capture timestamps and sampling periods.
//!
//! Every [`SampleArray`](crate::SampleArray) is stamped at capture time with a
//! nanosecond [`Timestamp`]. Polling and filter cadences are expressed as
//! [`Duration`]s derived from their configured rates.

use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Nanosecond-precision capture timestamp.
///
/// # Example
///
/// ```
/// use imu_types::Timestamp;
///
/// let ts = Timestamp::from_secs_f64(1.5);
/// assert_eq!(ts, Timestamp::from_nanos(1_500_000_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timestamp {
    /// Nanoseconds since the Unix epoch (or an arbitrary replay origin).
    nanos: u64,
}

impl Timestamp {
    /// Creates a timestamp from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a timestamp from floating point seconds.
    ///
    /// Negative inputs clamp to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).max(0.0) as u64;
        Self { nanos }
    }

    /// Converts a wall-clock time into a timestamp.
    ///
    /// Times before the Unix epoch map to zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos().min(u128::from(u64::MAX)) as u64);
        Self { nanos }
    }

    /// Returns the timestamp as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the zero timestamp.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }

    /// Adds a duration, returning `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.nanos.checked_add(duration.as_nanos()) {
            Some(nanos) => Some(Self { nanos }),
            None => None,
        }
    }

    /// Adds a duration, saturating at the maximum representable timestamp.
    #[must_use]
    pub const fn saturating_add(self, duration: Duration) -> Self {
        Self {
            nanos: self.nanos.saturating_add(duration.as_nanos()),
        }
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }
}

/// A non-negative time interval with nanosecond precision.
///
/// ```
/// use imu_types::Duration;
///
/// let period = Duration::from_rate_hz(100.0).unwrap();
/// assert_eq!(period, Duration::from_millis(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Duration {
    nanos: u64,
}

impl Duration {
    /// Creates a duration from nanoseconds.
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Creates a duration from milliseconds.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            nanos: millis * 1_000_000,
        }
    }

    /// Creates a duration from whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            nanos: secs * NANOS_PER_SEC,
        }
    }

    /// Creates a duration from floating point seconds, clamping negatives to zero.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        let nanos = (secs * 1e9).max(0.0) as u64;
        Self { nanos }
    }

    /// Period of a cadence running at `rate_hz`.
    ///
    /// Returns `None` for non-positive or non-finite rates, which have no period.
    #[must_use]
    pub fn from_rate_hz(rate_hz: f64) -> Option<Self> {
        if rate_hz.is_finite() && rate_hz > 0.0 {
            Some(Self::from_secs_f64(rate_hz.recip()))
        } else {
            None
        }
    }

    /// Returns the duration as nanoseconds.
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.nanos
    }

    /// Returns the duration as milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.nanos / 1_000_000
    }

    /// Returns the zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self { nanos: 0 }
    }
}

impl From<Duration> for std::time::Duration {
    fn from(duration: Duration) -> Self {
        Self::from_nanos(duration.nanos)
    }
}

/// Closed time span covered by a filter window, from its first to its last sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimeRange {
    /// Capture time of the first sample (inclusive).
    pub start: Timestamp,
    /// Capture time of the last sample (inclusive).
    pub end: Timestamp,
}

impl TimeRange {
    /// Creates a range; the endpoints are swapped if given out of order.
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A range holding a single instant.
    #[must_use]
    pub const fn instant(at: Timestamp) -> Self {
        Self { start: at, end: at }
    }

    /// Widens the range so that it covers `at`.
    #[must_use]
    pub fn extended_to(self, at: Timestamp) -> Self {
        Self {
            start: self.start.min(at),
            end: self.end.max(at),
        }
    }

    /// Span between first and last sample.
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.end.saturating_since(self.start)
    }

    /// Checks whether `at` lies within the range, both ends inclusive.
    #[must_use]
    pub fn contains(self, at: Timestamp) -> bool {
        at >= self.start && at <= self.end
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_negative_secs_clamp() {
        assert_eq!(Timestamp::from_secs_f64(-2.0), Timestamp::zero());
    }

    #[test]
    fn timestamp_from_system_time() {
        let t = UNIX_EPOCH + std::time::Duration::from_millis(1500);
        assert_eq!(Timestamp::from_system_time(t).as_nanos(), 1_500_000_000);
    }

    #[test]
    fn timestamp_add_and_since() {
        let ts = Timestamp::from_nanos(1000);
        let later = ts.checked_add(Duration::from_nanos(500)).unwrap();

        assert_eq!(later.saturating_since(ts), Duration::from_nanos(500));
        assert_eq!(ts.saturating_since(later), Duration::zero());
        assert_eq!(
            Timestamp::from_nanos(u64::MAX).saturating_add(Duration::from_secs(1)),
            Timestamp::from_nanos(u64::MAX)
        );
    }

    #[test]
    fn duration_from_rate() {
        assert_eq!(Duration::from_rate_hz(1.0), Some(Duration::from_secs(1)));
        assert_eq!(Duration::from_rate_hz(150.0).unwrap().as_nanos(), 6_666_666);
        assert_eq!(Duration::from_rate_hz(0.0), None);
        assert_eq!(Duration::from_rate_hz(-10.0), None);
        assert_eq!(Duration::from_rate_hz(f64::NAN), None);
    }

    #[test]
    fn duration_into_std() {
        let d: std::time::Duration = Duration::from_millis(250).into();
        assert_eq!(d.as_millis(), 250);
    }

    #[test]
    fn time_range_extends() {
        let range = TimeRange::instant(Timestamp::from_nanos(200))
            .extended_to(Timestamp::from_nanos(500))
            .extended_to(Timestamp::from_nanos(100));

        assert_eq!(range.start, Timestamp::from_nanos(100));
        assert_eq!(range.end, Timestamp::from_nanos(500));
        assert_eq!(range.duration(), Duration::from_nanos(400));
        assert!(range.contains(Timestamp::from_nanos(500)));
        assert!(!range.contains(Timestamp::from_nanos(501)));
    }

    #[test]
    fn time_range_normalizes() {
        let range = TimeRange::new(Timestamp::from_nanos(200), Timestamp::from_nanos(100));
        assert_eq!(range.start, Timestamp::from_nanos(100));
        assert_eq!(range.end, Timestamp::from_nanos(200));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn timestamp_serialization() {
        let ts = Timestamp::from_nanos(1_500_000_000);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ts);
    }
}
