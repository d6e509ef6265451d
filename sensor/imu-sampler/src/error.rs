//! Error types for the sampling pipeline.

use imu_types::ImuError;
use thiserror::Error;

/// Errors that can occur while sampling, calibrating or filtering.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Bad configuration value (unknown device type, invalid parameter).
    ///
    /// The previously active value is retained.
    #[error(transparent)]
    Imu(#[from] ImuError),

    /// The transport was not ready or delivered malformed data.
    ///
    /// The tick is skipped; nothing is emitted or accumulated.
    #[error("transport read failed: {0}")]
    TransportRead(String),

    /// An operation was invoked before the engine reached `Ready`.
    #[error("engine not ready for {operation} (state: {state})")]
    NotReady {
        /// Operation that was attempted.
        operation: &'static str,
        /// Engine state at the time.
        state: &'static str,
    },

    /// The window sample counter would overflow.
    #[error("window overflow: sample counter reached {count}")]
    WindowOverflow {
        /// Counter value when the overflow was detected.
        count: u32,
    },

    /// Configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Config(#[from] serde_json::Error),

    /// A thread holding shared engine state panicked.
    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// The engine is already being driven by a scheduler.
    #[error("engine is already polling")]
    AlreadyRunning,

    /// A scheduler thread could not be spawned.
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        /// Thread name.
        name: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A scheduler thread panicked.
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

impl SamplerError {
    /// Creates a transport read error.
    #[must_use]
    pub fn transport_read(reason: impl Into<String>) -> Self {
        Self::TransportRead(reason.into())
    }

    /// Creates a not-ready error.
    #[must_use]
    pub const fn not_ready(operation: &'static str, state: &'static str) -> Self {
        Self::NotReady { operation, state }
    }

    /// Creates a window overflow error.
    #[must_use]
    pub const fn window_overflow(count: u32) -> Self {
        Self::WindowOverflow { count }
    }

    /// Returns `true` if a periodic task may keep running after this error.
    ///
    /// Transport failures and window overflows cost one sample; everything
    /// else is a contract violation or a broken engine.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::TransportRead(_) | Self::WindowOverflow { .. })
    }
}

/// Result type for sampling operations.
pub type Result<T> = std::result::Result<T, SamplerError>;
