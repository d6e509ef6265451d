//! Supported IMU models and the name registry used to select one.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{ImuError, Result};

/// IMU model attached to the serial transport.
///
/// Selected once at startup by name through [`DeviceType::resolve`].
///
/// # Example
///
/// ```
/// use imu_types::DeviceType;
///
/// let device = DeviceType::resolve("nIMU_3temp").unwrap();
/// assert_eq!(device, DeviceType::NImu3Temp);
/// assert_eq!(device.name(), "nIMU_3temp");
///
/// assert!(DeviceType::resolve("unknown_model").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum DeviceType {
    /// Full-size IMU with three temperature sensors.
    Imu3Temp,
    /// Full-size IMU with a single temperature sensor.
    Imu1Temp,
    /// Nano IMU with three temperature sensors.
    #[default]
    NImu3Temp,
    /// Nano IMU with a single temperature sensor.
    NImu1Temp,
}

/// Name table, fixed for the process lifetime.
const REGISTRY: [(&str, DeviceType); 4] = [
    ("IMU_3temp", DeviceType::Imu3Temp),
    ("IMU_1temp", DeviceType::Imu1Temp),
    ("nIMU_3temp", DeviceType::NImu3Temp),
    ("nIMU_1temp", DeviceType::NImu1Temp),
];

impl DeviceType {
    /// All supported models, in registry order.
    pub const ALL: [Self; 4] = [
        Self::Imu3Temp,
        Self::Imu1Temp,
        Self::NImu3Temp,
        Self::NImu1Temp,
    ];

    /// Looks up a model by its configuration name.
    ///
    /// Names are case sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::UnknownDeviceType`] if `name` is not registered.
    pub fn resolve(name: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, device)| *device)
            .ok_or_else(|| ImuError::unknown_device_type(name))
    }

    /// Returns the configuration name of this model.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Imu3Temp => "IMU_3temp",
            Self::Imu1Temp => "IMU_1temp",
            Self::NImu3Temp => "nIMU_3temp",
            Self::NImu1Temp => "nIMU_1temp",
        }
    }

    /// Returns the registered names of every supported model.
    pub fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.iter().map(|(name, _)| *name)
    }

    /// Number of on-board temperature sensors.
    #[must_use]
    pub const fn temperature_sensors(self) -> usize {
        match self {
            Self::Imu3Temp | Self::NImu3Temp => 3,
            Self::Imu1Temp | Self::NImu1Temp => 1,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceType {
    type Err = ImuError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl TryFrom<String> for DeviceType {
    type Error = ImuError;

    fn try_from(name: String) -> Result<Self> {
        Self::resolve(&name)
    }
}

impl From<DeviceType> for String {
    fn from(device: DeviceType) -> Self {
        device.name().to_owned()
    }
}
