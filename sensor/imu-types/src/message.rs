//! Output messages handed to the publishing sink.
//!
//! Gyro and accel readings travel together in an [`ImuMessage`]; the
//! magnetometer has its own [`MagMessage`] shape. Both carry the per-axis
//! variance of the active calibration as a diagonal covariance.

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FrameId, SampleArray, SensorGroup, Timestamp, VarianceTable};

/// Message header: capture time and frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// Capture (or window end) time.
    pub stamp: Timestamp,
    /// Frame the readings are expressed in.
    pub frame_id: FrameId,
}

impl Header {
    /// Creates a header.
    #[must_use]
    pub const fn new(stamp: Timestamp, frame_id: FrameId) -> Self {
        Self { stamp, frame_id }
    }
}

/// Angular rate and specific force, with their covariances.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_types::{FrameId, ImuMessage, SampleArray, Timestamp, VarianceTable};
///
/// let sample = SampleArray::new(
///     Timestamp::from_nanos(5),
///     DVec3::new(1.0, 2.0, 3.0),
///     DVec3::new(0.0, 0.0, 1.0),
///     DVec3::ZERO,
/// );
/// let variance = VarianceTable::uniform(0.01, 0.02, 0.0).unwrap();
/// let msg = ImuMessage::from_sample(&sample, &variance, &FrameId::new("imu_link"));
///
/// assert_eq!(msg.angular_velocity, DVec3::new(1.0, 2.0, 3.0));
/// assert_eq!(msg.linear_acceleration_covariance[4], 0.02);
/// assert_eq!(msg.header.frame_id.as_str(), "imu_link");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuMessage {
    /// Timestamp and frame.
    pub header: Header,
    /// Gyroscope readings.
    pub angular_velocity: DVec3,
    /// Row-major diagonal covariance of `angular_velocity`.
    pub angular_velocity_covariance: [f64; 9],
    /// Accelerometer readings.
    pub linear_acceleration: DVec3,
    /// Row-major diagonal covariance of `linear_acceleration`.
    pub linear_acceleration_covariance: [f64; 9],
}

impl ImuMessage {
    /// Builds a message from the gyro and accel groups of `sample`.
    #[must_use]
    pub fn from_sample(sample: &SampleArray, variance: &VarianceTable, frame_id: &FrameId) -> Self {
        Self {
            header: Header::new(sample.timestamp(), frame_id.clone()),
            angular_velocity: sample.gyro(),
            angular_velocity_covariance: variance.covariance(SensorGroup::Gyro),
            linear_acceleration: sample.accel(),
            linear_acceleration_covariance: variance.covariance(SensorGroup::Accel),
        }
    }
}

/// Magnetic field reading with its covariance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MagMessage {
    /// Timestamp and frame.
    pub header: Header,
    /// Magnetometer readings.
    pub magnetic_field: DVec3,
    /// Row-major diagonal covariance of `magnetic_field`.
    pub magnetic_field_covariance: [f64; 9],
}

impl MagMessage {
    /// Builds a message from the mag group of `sample`.
    #[must_use]
    pub fn from_sample(sample: &SampleArray, variance: &VarianceTable, frame_id: &FrameId) -> Self {
        Self {
            header: Header::new(sample.timestamp(), frame_id.clone()),
            magnetic_field: sample.mag(),
            magnetic_field_covariance: variance.covariance(SensorGroup::Mag),
        }
    }
}
