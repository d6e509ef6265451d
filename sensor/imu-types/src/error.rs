//! Error types for IMU configuration and data.

use thiserror::Error;

/// Errors raised while configuring or interpreting IMU data.
///
/// Configuration errors are surfaced synchronously; the caller keeps its
/// previous valid value when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImuError {
    /// The device type name is not in the supported set.
    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    /// A configuration value is out of its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ImuError {
    /// Creates an unknown device type error.
    #[must_use]
    pub fn unknown_device_type(name: impl Into<String>) -> Self {
        Self::UnknownDeviceType(name.into())
    }

    /// Creates an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors caused by a bad configuration value.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownDeviceType(_) | Self::InvalidParameter { .. }
        )
    }
}

/// Result type for IMU type operations.
pub type Result<T> = std::result::Result<T, ImuError>;
