//! Unit scaling and bias correction.

use imu_types::{BiasTable, CalibrationSet, RangeTable, SampleArray};

/// A sample in physical units next to its bias-corrected counterpart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibratedSample {
    /// Range-scaled reading, no bias removed.
    pub raw: SampleArray,
    /// `raw - bias`, per axis.
    pub calibrated: SampleArray,
}

/// Converts device counts to physical units and removes bias.
///
/// Scaling happens first: biases are specified in physical units, so
/// subtracting them from raw counts would be meaningless. Variance never
/// touches the values; it rides along in the output messages.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_sampler::Calibrator;
/// use imu_types::{BiasTable, FULL_SCALE_COUNTS, RangeTable, SampleArray, SensorGroup, Timestamp};
///
/// let ranges = RangeTable::new(FULL_SCALE_COUNTS, FULL_SCALE_COUNTS, FULL_SCALE_COUNTS).unwrap();
/// let calibrator = Calibrator::new(ranges);
/// let bias = BiasTable::default().with_group(SensorGroup::Gyro, DVec3::new(1.0, 0.0, 0.0));
///
/// let raw = SampleArray::new(Timestamp::zero(), DVec3::new(5.0, 0.0, 0.0), DVec3::ZERO, DVec3::ZERO);
/// let calibrated = calibrator.apply(&raw, &bias);
///
/// assert!((calibrated.gyro().x - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibrator {
    ranges: RangeTable,
}

impl Calibrator {
    /// Creates a calibrator for the given ranges.
    #[must_use]
    pub const fn new(ranges: RangeTable) -> Self {
        Self { ranges }
    }

    /// Ranges this calibrator scales with.
    #[must_use]
    pub const fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    /// Scales device counts into physical units.
    #[must_use]
    pub fn to_physical(&self, counts: &SampleArray) -> SampleArray {
        counts.map(|group, v| v * self.ranges.scale(group))
    }

    /// Subtracts `bias` from a sample already in physical units.
    #[must_use]
    pub fn remove_bias(physical: &SampleArray, bias: &BiasTable) -> SampleArray {
        physical.map(|group, v| v - bias.group(group))
    }

    /// Adds `bias` back to a bias-corrected sample.
    #[must_use]
    pub fn restore_bias(calibrated: &SampleArray, bias: &BiasTable) -> SampleArray {
        calibrated.map(|group, v| v + bias.group(group))
    }

    /// Scales `counts` and removes `bias`: `counts * scale(group) - bias`.
    #[must_use]
    pub fn apply(&self, counts: &SampleArray, bias: &BiasTable) -> SampleArray {
        Self::remove_bias(&self.to_physical(counts), bias)
    }

    /// Produces both the raw physical reading and its calibrated form.
    #[must_use]
    pub fn process(&self, counts: &SampleArray, calibration: &CalibrationSet) -> CalibratedSample {
        let raw = self.to_physical(counts);
        let calibrated = Self::remove_bias(&raw, &calibration.bias);
        CalibratedSample { raw, calibrated }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec3;
    use imu_types::{Axis, FULL_SCALE_COUNTS, SensorGroup, Timestamp, VarianceTable};

    use super::*;

    fn unit_ranges() -> RangeTable {
        RangeTable::new(FULL_SCALE_COUNTS, FULL_SCALE_COUNTS, FULL_SCALE_COUNTS).unwrap()
    }

    #[test]
    fn bias_subtracted_per_axis() {
        let calibrator = Calibrator::new(unit_ranges());
        let bias = BiasTable::default().with_axis(SensorGroup::Gyro, Axis::X, 1.0);
        let raw = SampleArray::new(
            Timestamp::zero(),
            DVec3::new(5.0, 0.0, 0.0),
            DVec3::ZERO,
            DVec3::ZERO,
        );

        let calibrated = calibrator.apply(&raw, &bias);
        assert_relative_eq!(calibrated.gyro().x, 4.0);
        assert_relative_eq!(calibrated.gyro().y, 0.0);
    }

    #[test]
    fn scaling_happens_before_bias() {
        // 16384 counts at 150 deg/s full scale is 75 deg/s.
        let calibrator = Calibrator::new(RangeTable::default());
        let bias = BiasTable::default().with_axis(SensorGroup::Gyro, Axis::Z, 5.0);
        let counts = SampleArray::new(
            Timestamp::zero(),
            DVec3::new(0.0, 0.0, 16_384.0),
            DVec3::ZERO,
            DVec3::ZERO,
        );

        let calibrated = calibrator.apply(&counts, &bias);
        assert_relative_eq!(calibrated.gyro().z, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn each_group_uses_its_own_range() {
        let ranges = RangeTable::new(300.0, 4.0, 2.0).unwrap();
        let calibrator = Calibrator::new(ranges);
        let counts = SampleArray::from_array(Timestamp::zero(), [FULL_SCALE_COUNTS; 9]);

        let physical = calibrator.to_physical(&counts);
        assert_relative_eq!(physical.gyro().x, 300.0, epsilon = 1e-9);
        assert_relative_eq!(physical.accel().y, 4.0, epsilon = 1e-9);
        assert_relative_eq!(physical.mag().z, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn restore_inverts_remove() {
        let bias = BiasTable::new(
            DVec3::new(0.1, -0.2, 0.3),
            DVec3::new(0.01, 0.0, -0.05),
            DVec3::new(0.0, 0.5, 0.0),
        );
        let sample = SampleArray::from_array(
            Timestamp::from_nanos(3),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
        );

        let round = Calibrator::restore_bias(&Calibrator::remove_bias(&sample, &bias), &bias);
        for (a, b) in round.to_array().iter().zip(sample.to_array()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn process_keeps_timestamp_and_ignores_variance() {
        let calibrator = Calibrator::new(unit_ranges());
        let calibration = CalibrationSet::new(
            BiasTable::default().with_axis(SensorGroup::Accel, Axis::Z, 1.0),
            VarianceTable::uniform(9.0, 9.0, 9.0).unwrap(),
        );
        let counts = SampleArray::new(
            Timestamp::from_nanos(77),
            DVec3::ZERO,
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::ZERO,
        );

        let out = calibrator.process(&counts, &calibration);
        assert_eq!(out.raw.timestamp(), Timestamp::from_nanos(77));
        assert_eq!(out.calibrated.timestamp(), Timestamp::from_nanos(77));
        assert_relative_eq!(out.raw.accel().z, 1.0);
        assert_relative_eq!(out.calibrated.accel().z, 0.0);
    }
}
