//! Data types for triaxial IMU acquisition.
//!
//! This crate holds the plain data shared by the sampling pipeline in
//! `imu-sampler` and by whatever transport and publishing code surrounds it:
//!
//! - [`DeviceType`] - Supported IMU models, resolved by name
//! - [`SampleArray`] - One epoch of gyro, accel and mag readings
//! - [`BiasTable`] / [`VarianceTable`] - Per-axis calibration coefficients
//! - [`RangeTable`] - Per-group full-scale range
//! - [`CalibrationSet`] - Immutable bias + variance snapshot
//! - [`ImuMessage`] / [`MagMessage`] - Output messages
//!
//! # Units
//!
//! Ranges, biases and variances of a group share one physical unit
//! (deg/s for gyro, g for accel, gauss for mag). Nothing in this crate
//! converts between units.
//!
//! # Layer 0 Crate
//!
//! No runtime, no I/O. Usable from drivers, replay tools and tests.
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use imu_types::{BiasTable, DeviceType, RangeTable, SensorGroup};
//!
//! let device = DeviceType::resolve("nIMU_3temp").unwrap();
//! let ranges = RangeTable::new(300.0, 4.0, 1.9).unwrap();
//! let bias = BiasTable::default().with_group(SensorGroup::Gyro, DVec3::new(0.1, 0.0, -0.2));
//!
//! assert_eq!(device.temperature_sensors(), 3);
//! assert!(ranges.scale(SensorGroup::Gyro) > 0.0);
//! assert!(bias.validate().is_ok());
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod calibration;
mod device;
mod error;
mod frame;
mod message;
mod sample;
mod time;

pub use calibration::{BiasTable, CalibrationSet, FULL_SCALE_COUNTS, RangeTable, VarianceTable};
pub use device::DeviceType;
pub use error::{ImuError, Result};
pub use frame::FrameId;
pub use message::{Header, ImuMessage, MagMessage};
pub use sample::{Axis, SampleArray, SensorGroup};
pub use time::{Duration, TimeRange, Timestamp};
