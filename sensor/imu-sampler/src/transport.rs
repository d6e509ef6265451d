//! Collaborator interfaces consumed by the sampling engine.
//!
//! The engine owns none of the device I/O or publishing: a [`Transport`]
//! hands it raw samples, an [`OutputSink`] receives finished messages and a
//! [`Clock`] stamps them.

use std::time::SystemTime;

use imu_types::{ImuMessage, MagMessage, SampleArray, Timestamp};

use crate::error::Result;

/// Source of raw samples, owning the serial device lifecycle.
///
/// Samples are in signed device counts; the engine scales them with the
/// configured ranges. Retry and backoff are the transport's business: a
/// failed read is reported once and the engine moves on.
pub trait Transport: Send {
    /// Returns `true` once the port is open and the frame parser is in sync.
    fn is_ready(&self) -> bool;

    /// Reads one sample.
    ///
    /// May block up to the transport's own timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::TransportRead`](crate::SamplerError::TransportRead)
    /// when no well-formed sample could be read.
    fn read_sample(&mut self) -> Result<SampleArray>;
}

/// Destination of finished messages.
///
/// Every call carries the raw (range-scaled, uncorrected) message next to
/// its calibrated counterpart. Magnetometer output has its own message shape
/// but the same calibration and filtering contract.
pub trait OutputSink: Send {
    /// Per-sample gyro and accel output.
    fn publish_instant(&mut self, raw: &ImuMessage, calibrated: &ImuMessage);

    /// Windowed-mean gyro and accel output.
    fn publish_filtered(&mut self, raw: &ImuMessage, calibrated: &ImuMessage);

    /// Per-sample magnetometer output.
    fn publish_mag_instant(&mut self, raw: &MagMessage, calibrated: &MagMessage);

    /// Windowed-mean magnetometer output.
    fn publish_mag_filtered(&mut self, raw: &MagMessage, calibrated: &MagMessage);
}

/// Time source for message stamps.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_system_time(SystemTime::now())
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn read_sample(&mut self) -> Result<SampleArray> {
        (**self).read_sample()
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn publish_instant(&mut self, raw: &ImuMessage, calibrated: &ImuMessage) {
        (**self).publish_instant(raw, calibrated);
    }

    fn publish_filtered(&mut self, raw: &ImuMessage, calibrated: &ImuMessage) {
        (**self).publish_filtered(raw, calibrated);
    }

    fn publish_mag_instant(&mut self, raw: &MagMessage, calibrated: &MagMessage) {
        (**self).publish_mag_instant(raw, calibrated);
    }

    fn publish_mag_filtered(&mut self, raw: &MagMessage, calibrated: &MagMessage) {
        (**self).publish_mag_filtered(raw, calibrated);
    }
}
