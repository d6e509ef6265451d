//! Frame identifiers stamped on outgoing messages.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Name of the coordinate frame a measurement is expressed in.
///
/// Copied into the header of every published message so downstream
/// consumers can place the readings in their transform tree.
///
/// # Example
///
/// ```
/// use imu_types::FrameId;
///
/// let frame = FrameId::new("imu_link");
/// assert_eq!(frame.as_str(), "imu_link");
/// assert_eq!(FrameId::default().as_str(), "imu");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FrameId(String);

impl FrameId {
    /// Frame used when none is configured.
    pub const DEFAULT: &'static str = "imu";

    /// Creates a frame identifier.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the frame name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty.
    ///
    /// An empty frame is legal but usually a configuration mistake.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for FrameId {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FrameId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FrameId {
    fn from(name: String) -> Self {
        Self(name)
    }
}
