//! Per-axis calibration coefficients and per-group ranges.
//!
//! Biases and variances are stored one three-vector per [`SensorGroup`], so
//! every `(group, axis)` key always has exactly one value. All values are in
//! the same physical unit as the range of their group (see
//! [`SensorGroup::unit`]).

use glam::DVec3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ImuError, Result};
use crate::{Axis, SensorGroup};

/// Signed device counts corresponding to full-scale range.
///
/// Readings arrive as fractions of this span; multiplying by
/// `range / FULL_SCALE_COUNTS` converts them into physical units.
pub const FULL_SCALE_COUNTS: f64 = 32_768.0;

/// Per-axis bias, subtracted from range-scaled readings.
///
/// Unset axes default to `0.0`.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_types::{Axis, BiasTable, SensorGroup};
///
/// let bias = BiasTable::default().with_group(SensorGroup::Gyro, DVec3::new(1.0, 0.0, 0.0));
/// assert_eq!(bias.get(SensorGroup::Gyro, Axis::X), 1.0);
/// assert_eq!(bias.get(SensorGroup::Mag, Axis::Z), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BiasTable {
    gyro: DVec3,
    accel: DVec3,
    mag: DVec3,
}

impl BiasTable {
    /// Creates a bias table from per-group vectors.
    #[must_use]
    pub const fn new(gyro: DVec3, accel: DVec3, mag: DVec3) -> Self {
        Self { gyro, accel, mag }
    }

    /// Returns a copy with one group's biases replaced.
    #[must_use]
    pub const fn with_group(mut self, group: SensorGroup, bias: DVec3) -> Self {
        match group {
            SensorGroup::Gyro => self.gyro = bias,
            SensorGroup::Accel => self.accel = bias,
            SensorGroup::Mag => self.mag = bias,
        }
        self
    }

    /// Returns a copy with a single axis replaced.
    #[must_use]
    pub fn with_axis(self, group: SensorGroup, axis: Axis, bias: f64) -> Self {
        let mut v = self.group(group);
        v[axis.index()] = bias;
        self.with_group(group, v)
    }

    /// Biases of one group.
    #[must_use]
    pub const fn group(&self, group: SensorGroup) -> DVec3 {
        match group {
            SensorGroup::Gyro => self.gyro,
            SensorGroup::Accel => self.accel,
            SensorGroup::Mag => self.mag,
        }
    }

    /// Bias of a single axis.
    #[must_use]
    pub fn get(&self, group: SensorGroup, axis: Axis) -> f64 {
        self.group(group)[axis.index()]
    }

    /// Checks every bias is finite.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] naming the first non-finite axis.
    pub fn validate(&self) -> Result<()> {
        for group in SensorGroup::ALL {
            for axis in Axis::ALL {
                let value = self.get(group, axis);
                if !value.is_finite() {
                    return Err(ImuError::invalid_parameter(
                        format!("{group}_bias_{axis}"),
                        format!("must be finite, got {value}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Per-axis noise variance, reported alongside calibrated output.
///
/// Variance never modifies a reading. Every entry is finite and `>= 0`
/// when built through [`VarianceTable::new`] or [`VarianceTable::uniform`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VarianceTable {
    gyro: DVec3,
    accel: DVec3,
    mag: DVec3,
}

impl VarianceTable {
    /// Creates a variance table from per-group vectors.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] if any entry is negative or not finite.
    pub fn new(gyro: DVec3, accel: DVec3, mag: DVec3) -> Result<Self> {
        let table = Self { gyro, accel, mag };
        table.validate()?;
        Ok(table)
    }

    /// Creates a table with one scalar variance shared by the three axes of each group.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] if any value is negative or not finite.
    pub fn uniform(gyro: f64, accel: f64, mag: f64) -> Result<Self> {
        Self::new(DVec3::splat(gyro), DVec3::splat(accel), DVec3::splat(mag))
    }

    /// Variances of one group.
    #[must_use]
    pub const fn group(&self, group: SensorGroup) -> DVec3 {
        match group {
            SensorGroup::Gyro => self.gyro,
            SensorGroup::Accel => self.accel,
            SensorGroup::Mag => self.mag,
        }
    }

    /// Variance of a single axis.
    #[must_use]
    pub fn get(&self, group: SensorGroup, axis: Axis) -> f64 {
        self.group(group)[axis.index()]
    }

    /// Row-major 3x3 diagonal covariance for one group.
    #[must_use]
    pub fn covariance(&self, group: SensorGroup) -> [f64; 9] {
        let v = self.group(group);
        [v.x, 0.0, 0.0, 0.0, v.y, 0.0, 0.0, 0.0, v.z]
    }

    /// Checks the `variance >= 0` invariant.
    ///
    /// Deserialized tables bypass [`VarianceTable::new`], so configuration
    /// loaders call this explicitly.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] naming the first offending axis.
    pub fn validate(&self) -> Result<()> {
        for group in SensorGroup::ALL {
            for axis in Axis::ALL {
                let value = self.get(group, axis);
                if !value.is_finite() || value < 0.0 {
                    return Err(ImuError::invalid_parameter(
                        format!("{group}_var_{axis}"),
                        format!("must be finite and non-negative, got {value}"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Full-scale range of each sensor group, in the group's physical unit.
///
/// Every range is finite and `> 0` when built through [`RangeTable::new`].
///
/// # Example
///
/// ```
/// use imu_types::{RangeTable, SensorGroup};
///
/// let ranges = RangeTable::default();
/// assert_eq!(ranges.range(SensorGroup::Gyro), 150.0);
/// assert!(RangeTable::new(150.0, -1.0, 1.9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RangeTable {
    gyro: f64,
    accel: f64,
    mag: f64,
}

impl Default for RangeTable {
    fn default() -> Self {
        Self {
            gyro: 150.0,
            accel: 2.0,
            mag: 1.9,
        }
    }
}

impl RangeTable {
    /// Creates a range table.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] if any range is not a positive finite number.
    pub fn new(gyro: f64, accel: f64, mag: f64) -> Result<Self> {
        let table = Self { gyro, accel, mag };
        table.validate()?;
        Ok(table)
    }

    /// Returns a copy with one group's range replaced.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] if `range` is not a positive finite number.
    pub fn with_range(mut self, group: SensorGroup, range: f64) -> Result<Self> {
        match group {
            SensorGroup::Gyro => self.gyro = range,
            SensorGroup::Accel => self.accel = range,
            SensorGroup::Mag => self.mag = range,
        }
        self.validate()?;
        Ok(self)
    }

    /// Full-scale range of a group.
    #[must_use]
    pub const fn range(&self, group: SensorGroup) -> f64 {
        match group {
            SensorGroup::Gyro => self.gyro,
            SensorGroup::Accel => self.accel,
            SensorGroup::Mag => self.mag,
        }
    }

    /// Multiplicative factor from device counts to physical units.
    #[must_use]
    pub fn scale(&self, group: SensorGroup) -> f64 {
        self.range(group) / FULL_SCALE_COUNTS
    }

    /// Returns `true` if every axis of `value` lies within `[-range, range]`.
    #[must_use]
    pub fn contains(&self, group: SensorGroup, value: DVec3) -> bool {
        value.abs().max_element() <= self.range(group)
    }

    /// Checks the `range > 0` invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`] naming the first offending group.
    pub fn validate(&self) -> Result<()> {
        for group in SensorGroup::ALL {
            let range = self.range(group);
            if !range.is_finite() || range <= 0.0 {
                return Err(ImuError::invalid_parameter(
                    format!("{group}_range"),
                    format!("must be positive, got {range}"),
                ));
            }
        }
        Ok(())
    }
}

/// Immutable snapshot of the active bias and variance tables.
///
/// Replaced wholesale on reconfiguration so readers never observe a
/// half-updated pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalibrationSet {
    /// Per-axis biases.
    pub bias: BiasTable,
    /// Per-axis variances.
    pub variance: VarianceTable,
}

impl CalibrationSet {
    /// Pairs a bias table with a variance table.
    #[must_use]
    pub const fn new(bias: BiasTable, variance: VarianceTable) -> Self {
        Self { bias, variance }
    }

    /// Checks both tables.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of either table.
    pub fn validate(&self) -> Result<()> {
        self.bias.validate()?;
        self.variance.validate()
    }
}
