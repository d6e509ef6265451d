//! IMU sample acquisition, calibration and windowed filtering.
//!
//! This crate turns a stream of raw device readings into calibrated output:
//!
//! # Pipeline
//!
//! - [`Transport`] - Source of raw samples in device counts
//! - [`Calibrator`] - Range scaling and bias removal
//! - [`WindowFilter`] - Per-axis mean over one emission period
//! - [`OutputSink`] - Destination of raw and calibrated messages
//!
//! # Orchestration
//!
//! - [`SamplingEngine`] - Poll and filter ticks over shared state
//! - [`Scheduler`] - Drives both ticks at their configured rates
//! - [`SamplerConfig`] - Serializable configuration with change detection
//!
//! # Testing
//!
//! - [`ScriptedTransport`], [`RecordingSink`] and [`ManualClock`] replace
//!   the device, the publisher and wall-clock time
//!
//! # Example
//!
//! ```
//! use glam::DVec3;
//! use imu_sampler::{ManualClock, RecordingSink, SamplerConfig, SamplingEngine, ScriptedTransport};
//! use imu_types::{SampleArray, Timestamp};
//!
//! let samples = [10.0, 20.0, 30.0].map(|x| {
//!     SampleArray::new(Timestamp::zero(), DVec3::ZERO, DVec3::new(0.0, 0.0, x), DVec3::ZERO)
//! });
//! let sink = RecordingSink::new();
//! let engine = SamplingEngine::from_config(
//!     ScriptedTransport::from_samples(samples),
//!     sink.clone(),
//!     ManualClock::default(),
//!     &SamplerConfig::default(),
//! ).unwrap();
//!
//! for _ in 0..3 {
//!     engine.poll().unwrap();
//! }
//! let filtered = engine.output_filter().unwrap().unwrap();
//! assert_eq!(filtered.count, 3);
//!
//! let recording = sink.snapshot();
//! assert_eq!(recording.instant.len(), 3);
//! assert_eq!(recording.filtered.len(), 1);
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod calibrator;
mod config;
mod engine;
mod error;
mod memory;
mod scheduler;
mod transport;
mod window;

// Re-export calibration types
pub use calibrator::{CalibratedSample, Calibrator};

// Re-export configuration types
pub use config::{ConfigDiff, FilteredRawSource, SamplerConfig, validate_rates};

// Re-export engine types
pub use engine::{EngineState, FilteredOutput, SamplingEngine};

// Re-export scheduling types
pub use scheduler::{Scheduler, SchedulerStats, TickStats};

// Re-export collaborator interfaces
pub use transport::{Clock, OutputSink, SystemClock, Transport};

// Re-export in-memory collaborators
pub use memory::{ManualClock, Recording, RecordingSink, ScriptedTransport};

// Re-export window types
pub use window::{WindowFilter, WindowMean, WindowState};

// Re-export error types
pub use error::{Result, SamplerError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        CalibratedSample, Calibrator, Clock, EngineState, FilteredOutput, FilteredRawSource,
        OutputSink, SamplerConfig, SamplerError, SamplingEngine, Scheduler, Transport,
        WindowFilter,
    };
}
