//! Sampler configuration and change detection.

use std::io::Read;

use imu_types::{BiasTable, DeviceType, FrameId, ImuError, RangeTable, VarianceTable};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How the filtered raw stream is derived.
///
/// The calibrated window mean is always computed. The filtered raw output can
/// either average the raw readings in a parallel accumulator, or re-add the
/// flush-time bias to the calibrated mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilteredRawSource {
    /// Mean of the raw, range-scaled readings.
    #[default]
    RawMean,
    /// Calibrated mean with the active bias added back.
    CalibratedMean,
}

/// Complete configuration of a sampling engine.
///
/// Missing fields take their defaults when deserialized, so a document only
/// needs the values that differ.
///
/// # Example
///
/// ```
/// use imu_sampler::SamplerConfig;
///
/// let config = SamplerConfig::from_json_str(r#"{
///     "device_type": "IMU_3temp",
///     "ranges": { "gyro": 300.0 },
///     "biases": { "gyro": [0.5, 0.0, -0.25] },
///     "filter_rate": 2.0
/// }"#).unwrap();
///
/// assert_eq!(config.device_type, "IMU_3temp");
/// assert_eq!(config.polling_rate, 150.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Device type name, resolved through [`DeviceType::resolve`].
    pub device_type: String,

    /// Serial device path. Opaque to the engine; forwarded to whoever owns the transport.
    pub serial_port: String,

    /// Full-scale range per sensor group.
    pub ranges: RangeTable,

    /// Per-axis biases.
    pub biases: BiasTable,

    /// Per-axis variances.
    pub variances: VarianceTable,

    /// Poll cadence in Hz. Must be positive.
    pub polling_rate: f64,

    /// Filter emission cadence in Hz. `0.0` disables filtering.
    pub filter_rate: f64,

    /// Frame stamped on every output message.
    pub frame_id: FrameId,

    /// Derivation of the filtered raw stream.
    pub filtered_raw: FilteredRawSource,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            device_type: DeviceType::default().name().to_owned(),
            serial_port: "/dev/ttyUSB0".to_owned(),
            ranges: RangeTable::default(),
            biases: BiasTable::default(),
            variances: VarianceTable::default(),
            polling_rate: 150.0,
            filter_rate: 1.0,
            frame_id: FrameId::default(),
            filtered_raw: FilteredRawSource::default(),
        }
    }
}

impl SamplerConfig {
    /// Parses a JSON configuration document.
    ///
    /// Parsing does not validate; call [`SamplerConfig::validate`] or hand the
    /// result to the engine, which validates before applying anything.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Config`](crate::SamplerError::Config) if the
    /// document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a JSON configuration document from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Config`](crate::SamplerError::Config) if the
    /// document is malformed or cannot be read.
    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::Config`](crate::SamplerError::Config) if
    /// serialization fails.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the configured device type.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::UnknownDeviceType`] for unregistered names.
    pub fn resolve_device_type(&self) -> std::result::Result<DeviceType, ImuError> {
        DeviceType::resolve(&self.device_type)
    }

    /// Checks every value; nothing is applied unless all of them pass.
    ///
    /// # Errors
    ///
    /// Returns the first [`ImuError`] found.
    pub fn validate(&self) -> std::result::Result<(), ImuError> {
        self.resolve_device_type()?;
        self.ranges.validate()?;
        self.biases.validate()?;
        self.variances.validate()?;
        validate_rates(self.polling_rate, self.filter_rate)
    }

    /// Whether the filtered streams are produced at all.
    #[must_use]
    pub fn filtering_enabled(&self) -> bool {
        self.filter_rate > 0.0
    }
}

/// Checks a polling/filter rate pair.
///
/// # Errors
///
/// Returns [`ImuError::InvalidParameter`] if `polling_rate` is not a positive
/// finite number, or `filter_rate` is negative or not finite.
pub fn validate_rates(polling_rate: f64, filter_rate: f64) -> std::result::Result<(), ImuError> {
    if !polling_rate.is_finite() || polling_rate <= 0.0 {
        return Err(ImuError::invalid_parameter(
            "polling_rate",
            format!("must be positive, got {polling_rate}"),
        ));
    }
    if !filter_rate.is_finite() || filter_rate < 0.0 {
        return Err(ImuError::invalid_parameter(
            "filter_rate",
            format!("must be zero or positive, got {filter_rate}"),
        ));
    }
    Ok(())
}

/// Which parts of a configuration changed between two versions.
///
/// The engine forwards only the changed parts to its setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct ConfigDiff {
    /// Device type name changed.
    pub device_type: bool,
    /// Serial port path changed.
    pub serial_port: bool,
    /// Any range changed.
    pub ranges: bool,
    /// Any bias or variance changed.
    pub calibration: bool,
    /// Polling or filter rate changed.
    pub rates: bool,
    /// Frame identifier changed.
    pub frame_id: bool,
    /// Filtered raw derivation changed.
    pub filtered_raw: bool,
}

impl ConfigDiff {
    /// Compares two configurations.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn between(old: &SamplerConfig, new: &SamplerConfig) -> Self {
        Self {
            device_type: old.device_type != new.device_type,
            serial_port: old.serial_port != new.serial_port,
            ranges: old.ranges != new.ranges,
            calibration: old.biases != new.biases || old.variances != new.variances,
            rates: old.polling_rate != new.polling_rate || old.filter_rate != new.filter_rate,
            frame_id: old.frame_id != new.frame_id,
            filtered_raw: old.filtered_raw != new.filtered_raw,
        }
    }

    /// A diff marking every part as changed.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            device_type: true,
            serial_port: true,
            ranges: true,
            calibration: true,
            rates: true,
            frame_id: true,
            filtered_raw: true,
        }
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed().is_empty()
    }

    /// Names of the changed parts.
    #[must_use]
    pub fn changed(&self) -> Vec<&'static str> {
        [
            (self.device_type, "device_type"),
            (self.serial_port, "serial_port"),
            (self.ranges, "ranges"),
            (self.calibration, "calibration"),
            (self.rates, "rates"),
            (self.frame_id, "frame_id"),
            (self.filtered_raw, "filtered_raw"),
        ]
        .into_iter()
        .filter_map(|(changed, name)| changed.then_some(name))
        .collect()
    }
}
