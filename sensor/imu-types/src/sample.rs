//! One epoch of triaxial readings across the gyro, accel and mag groups.

use std::fmt;

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Sensor group of a triaxial IMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SensorGroup {
    /// Angular rate.
    Gyro,
    /// Specific force.
    Accel,
    /// Magnetic field.
    Mag,
}

impl SensorGroup {
    /// All groups, in storage order.
    pub const ALL: [Self; 3] = [Self::Gyro, Self::Accel, Self::Mag];

    /// Lower-case name used in parameter keys (`gyro_range`, `mag_bias_x`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gyro => "gyro",
            Self::Accel => "accel",
            Self::Mag => "mag",
        }
    }

    /// Physical unit the group's range, bias and variance are expressed in.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Gyro => "deg/s",
            Self::Accel => "g",
            Self::Mag => "gauss",
        }
    }
}

impl fmt::Display for SensorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis of a triaxial sensor group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    /// All axes, in storage order.
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index into a three-vector.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Lower-case axis name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One epoch of readings: three axes for each of the three sensor groups,
/// stamped at capture time.
///
/// Samples are immutable once captured; processing stages build new ones
/// through [`SampleArray::map`].
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_types::{Axis, SampleArray, SensorGroup, Timestamp};
///
/// let sample = SampleArray::new(
///     Timestamp::from_nanos(10),
///     DVec3::new(0.1, 0.2, 0.3),
///     DVec3::new(0.0, 0.0, 1.0),
///     DVec3::new(0.2, 0.0, 0.4),
/// );
///
/// assert!((sample.get(SensorGroup::Accel, Axis::Z) - 1.0).abs() < 1e-12);
/// assert_eq!(sample.to_array()[0], 0.1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SampleArray {
    timestamp: Timestamp,
    gyro: DVec3,
    accel: DVec3,
    mag: DVec3,
}

impl SampleArray {
    /// Number of scalar readings per sample.
    pub const LEN: usize = 9;

    /// Creates a sample from per-group vectors.
    #[must_use]
    pub const fn new(timestamp: Timestamp, gyro: DVec3, accel: DVec3, mag: DVec3) -> Self {
        Self {
            timestamp,
            gyro,
            accel,
            mag,
        }
    }

    /// Creates a sample from a flat slot array ordered gyro xyz, accel xyz, mag xyz.
    #[must_use]
    pub fn from_array(timestamp: Timestamp, values: [f64; Self::LEN]) -> Self {
        Self {
            timestamp,
            gyro: DVec3::new(values[0], values[1], values[2]),
            accel: DVec3::new(values[3], values[4], values[5]),
            mag: DVec3::new(values[6], values[7], values[8]),
        }
    }

    /// Creates an all-zero sample.
    #[must_use]
    pub const fn zero(timestamp: Timestamp) -> Self {
        Self::new(timestamp, DVec3::ZERO, DVec3::ZERO, DVec3::ZERO)
    }

    /// Capture time.
    #[must_use]
    pub const fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Gyroscope readings.
    #[must_use]
    pub const fn gyro(&self) -> DVec3 {
        self.gyro
    }

    /// Accelerometer readings.
    #[must_use]
    pub const fn accel(&self) -> DVec3 {
        self.accel
    }

    /// Magnetometer readings.
    #[must_use]
    pub const fn mag(&self) -> DVec3 {
        self.mag
    }

    /// Readings of one sensor group.
    #[must_use]
    pub const fn group(&self, group: SensorGroup) -> DVec3 {
        match group {
            SensorGroup::Gyro => self.gyro,
            SensorGroup::Accel => self.accel,
            SensorGroup::Mag => self.mag,
        }
    }

    /// Single reading for `(group, axis)`.
    #[must_use]
    pub fn get(&self, group: SensorGroup, axis: Axis) -> f64 {
        self.group(group)[axis.index()]
    }

    /// Flat slot array ordered gyro xyz, accel xyz, mag xyz.
    #[must_use]
    pub fn to_array(&self) -> [f64; Self::LEN] {
        let [gx, gy, gz] = self.gyro.to_array();
        let [ax, ay, az] = self.accel.to_array();
        let [mx, my, mz] = self.mag.to_array();
        [gx, gy, gz, ax, ay, az, mx, my, mz]
    }

    /// Returns a copy restamped at `timestamp`.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builds a new sample by transforming each group, keeping the timestamp.
    #[must_use]
    pub fn map(&self, mut f: impl FnMut(SensorGroup, DVec3) -> DVec3) -> Self {
        Self {
            timestamp: self.timestamp,
            gyro: f(SensorGroup::Gyro, self.gyro),
            accel: f(SensorGroup::Accel, self.accel),
            mag: f(SensorGroup::Mag, self.mag),
        }
    }

    /// Returns `true` if every reading is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.gyro.is_finite() && self.accel.is_finite() && self.mag.is_finite()
    }
}
