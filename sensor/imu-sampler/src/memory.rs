//! In-memory collaborators for replay and tests.
//!
//! [`ScriptedTransport`] plays back a fixed sequence of reads,
//! [`RecordingSink`] keeps every published message and [`ManualClock`]
//! only moves when told to. The sink and clock are cheap handles over shared
//! state, so a clone kept outside the engine observes what the engine did.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use imu_types::{Duration, ImuMessage, MagMessage, SampleArray, Timestamp};

use crate::error::{Result, SamplerError};
use crate::transport::{Clock, OutputSink, Transport};

/// Transport that replays a scripted sequence of reads.
///
/// # Example
///
/// ```
/// use imu_sampler::{ScriptedTransport, Transport};
/// use imu_types::{SampleArray, Timestamp};
///
/// let mut transport = ScriptedTransport::new();
/// transport.push_sample(SampleArray::zero(Timestamp::zero()));
/// transport.push_failure("checksum mismatch");
///
/// assert!(transport.read_sample().is_ok());
/// assert!(transport.read_sample().is_err());
/// assert!(transport.read_sample().is_err()); // script exhausted
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: VecDeque<std::result::Result<SampleArray, String>>,
    ready: bool,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// Creates a ready transport with an empty script.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            script: VecDeque::new(),
            ready: true,
        }
    }

    /// Creates a ready transport that returns `samples` in order.
    #[must_use]
    pub fn from_samples(samples: impl IntoIterator<Item = SampleArray>) -> Self {
        Self {
            script: samples.into_iter().map(Ok).collect(),
            ready: true,
        }
    }

    /// Queues a successful read.
    pub fn push_sample(&mut self, sample: SampleArray) {
        self.script.push_back(Ok(sample));
    }

    /// Queues a failed read.
    pub fn push_failure(&mut self, reason: impl Into<String>) {
        self.script.push_back(Err(reason.into()));
    }

    /// Marks the transport ready or not.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Number of scripted reads left.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Transport for ScriptedTransport {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn read_sample(&mut self) -> Result<SampleArray> {
        match self.script.pop_front() {
            Some(Ok(sample)) => Ok(sample),
            Some(Err(reason)) => Err(SamplerError::transport_read(reason)),
            None => Err(SamplerError::transport_read("script exhausted")),
        }
    }
}

/// Everything a [`RecordingSink`] has received, in publish order per stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recording {
    /// `(raw, calibrated)` per-sample gyro/accel messages.
    pub instant: Vec<(ImuMessage, ImuMessage)>,
    /// `(raw, calibrated)` windowed-mean gyro/accel messages.
    pub filtered: Vec<(ImuMessage, ImuMessage)>,
    /// `(raw, calibrated)` per-sample magnetometer messages.
    pub mag_instant: Vec<(MagMessage, MagMessage)>,
    /// `(raw, calibrated)` windowed-mean magnetometer messages.
    pub mag_filtered: Vec<(MagMessage, MagMessage)>,
}

/// Sink that records every published message.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    recording: Arc<Mutex<Recording>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Recording {
        self.with(|r| Recording::clone(r))
    }

    /// Takes everything recorded so far, leaving the sink empty.
    #[must_use]
    pub fn take(&self) -> Recording {
        self.with(std::mem::take)
    }

    // A panicking test thread must not hide what was recorded before it.
    fn with<R>(&self, f: impl FnOnce(&mut Recording) -> R) -> R {
        let mut guard = self
            .recording
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl OutputSink for RecordingSink {
    fn publish_instant(&mut self, raw: &ImuMessage, calibrated: &ImuMessage) {
        self.with(|r| r.instant.push((raw.clone(), calibrated.clone())));
    }

    fn publish_filtered(&mut self, raw: &ImuMessage, calibrated: &ImuMessage) {
        self.with(|r| r.filtered.push((raw.clone(), calibrated.clone())));
    }

    fn publish_mag_instant(&mut self, raw: &MagMessage, calibrated: &MagMessage) {
        self.with(|r| r.mag_instant.push((raw.clone(), calibrated.clone())));
    }

    fn publish_mag_filtered(&mut self, raw: &MagMessage, calibrated: &MagMessage) {
        self.with(|r| r.mag_filtered.push((raw.clone(), calibrated.clone())));
    }
}

/// Clock that advances only when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            nanos: Arc::new(AtomicU64::new(start.as_nanos())),
        }
    }

    /// Sets the current time.
    pub fn set(&self, at: Timestamp) {
        self.nanos.store(at.as_nanos(), Ordering::SeqCst);
    }

    /// Moves the clock forward, saturating at the maximum timestamp.
    pub fn advance(&self, by: Duration) {
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by.as_nanos()))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use imu_types::{FrameId, VarianceTable};

    use super::*;

    #[test]
    fn scripted_transport_plays_in_order() {
        let a = SampleArray::zero(Timestamp::from_nanos(1));
        let b = SampleArray::zero(Timestamp::from_nanos(2));
        let mut transport = ScriptedTransport::from_samples([a, b]);

        assert_eq!(transport.remaining(), 2);
        assert_eq!(transport.read_sample().unwrap(), a);
        assert_eq!(transport.read_sample().unwrap(), b);
        assert!(matches!(
            transport.read_sample(),
            Err(SamplerError::TransportRead(reason)) if reason == "script exhausted"
        ));
    }

    #[test]
    fn scripted_transport_readiness() {
        let mut transport = ScriptedTransport::new();
        assert!(transport.is_ready());
        transport.set_ready(false);
        assert!(!transport.is_ready());
    }

    #[test]
    fn recording_sink_shares_state_between_clones() {
        let sink = RecordingSink::new();
        let mut publisher = sink.clone();

        let sample = SampleArray::zero(Timestamp::zero());
        let msg = ImuMessage::from_sample(&sample, &VarianceTable::default(), &FrameId::default());
        publisher.publish_instant(&msg, &msg);
        publisher.publish_filtered(&msg, &msg);

        let recording = sink.take();
        assert_eq!(recording.instant.len(), 1);
        assert_eq!(recording.filtered.len(), 1);
        assert!(sink.snapshot().instant.is_empty());
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Timestamp::from_nanos(100));
        let handle = clock.clone();

        handle.advance(Duration::from_nanos(50));
        assert_eq!(clock.now(), Timestamp::from_nanos(150));

        handle.set(Timestamp::from_nanos(10));
        assert_eq!(clock.now(), Timestamp::from_nanos(10));
    }
}
