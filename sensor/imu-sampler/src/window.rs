//! Rolling-window mean filter.

use glam::DVec3;
use imu_types::{SampleArray, TimeRange, Timestamp};

use crate::error::{Result, SamplerError};

/// Lifecycle of a [`WindowFilter`] within one emission period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// Nothing accumulated since construction or the last flush.
    Empty,
    /// At least one sample accumulated.
    Accumulating,
}

/// Mean of the samples collected over one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowMean {
    /// Per-axis mean, stamped with the capture time of the last sample.
    pub mean: SampleArray,
    /// Number of samples that went into the mean.
    pub count: u32,
    /// Capture times of the first and last sample.
    pub span: TimeRange,
}

/// Accumulates samples and yields their per-axis mean on flush.
///
/// Accumulation and flushing are decoupled so the polling cadence can run
/// much faster than the emission cadence. The mean divides by the number of
/// samples actually accumulated, so a window that missed reads is still
/// exact over what it saw.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_sampler::WindowFilter;
/// use imu_types::{SampleArray, Timestamp};
///
/// let mut filter = WindowFilter::new();
/// for (i, x) in [2.0, 4.0, 6.0].into_iter().enumerate() {
///     let t = Timestamp::from_nanos(i as u64);
///     filter.accumulate(&SampleArray::new(t, DVec3::new(x, 0.0, 0.0), DVec3::ZERO, DVec3::ZERO)).unwrap();
/// }
///
/// let window = filter.flush().unwrap();
/// assert_eq!(window.count, 3);
/// assert!((window.mean.gyro().x - 4.0).abs() < 1e-12);
/// assert!(filter.flush().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WindowFilter {
    gyro: DVec3,
    accel: DVec3,
    mag: DVec3,
    count: u32,
    span: Option<TimeRange>,
}

impl Default for WindowFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowFilter {
    /// Creates an empty filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            gyro: DVec3::ZERO,
            accel: DVec3::ZERO,
            mag: DVec3::ZERO,
            count: 0,
            span: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> WindowState {
        if self.count == 0 {
            WindowState::Empty
        } else {
            WindowState::Accumulating
        }
    }

    /// Number of samples accumulated since the last flush.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Returns `true` if nothing has been accumulated since the last flush.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Capture time of the first sample in the current window.
    #[must_use]
    pub fn window_start(&self) -> Option<Timestamp> {
        self.span.map(|span| span.start)
    }

    /// Adds a sample to the running per-axis sums.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::WindowOverflow`] if the sample counter is
    /// saturated; the sample is not added and the window is left intact.
    pub fn accumulate(&mut self, sample: &SampleArray) -> Result<()> {
        let count = self
            .count
            .checked_add(1)
            .ok_or(SamplerError::window_overflow(self.count))?;

        self.gyro += sample.gyro();
        self.accel += sample.accel();
        self.mag += sample.mag();
        self.count = count;

        let at = sample.timestamp();
        self.span = Some(
            self.span
                .map_or_else(|| TimeRange::instant(at), |span| span.extended_to(at)),
        );
        Ok(())
    }

    /// Returns the mean of the current window and resets to [`WindowState::Empty`].
    ///
    /// Returns `None` if nothing was accumulated; this is "no data yet",
    /// not an error.
    pub fn flush(&mut self) -> Option<WindowMean> {
        let span = self.span?;

        let n = f64::from(self.count);
        let mean = SampleArray::new(span.end, self.gyro / n, self.accel / n, self.mag / n);
        let window = WindowMean {
            mean,
            count: self.count,
            span,
        };

        self.reset();
        Some(window)
    }

    /// Drops any accumulation without producing output.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
impl WindowFilter {
    /// A window whose counter cannot take another sample.
    pub(crate) fn saturated() -> Self {
        Self {
            count: u32::MAX,
            span: Some(TimeRange::instant(Timestamp::zero())),
            ..Self::new()
        }
    }
}
