//! Orchestration of polling, calibration and windowed filtering.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use imu_types::{
    BiasTable, CalibrationSet, DeviceType, Duration, FrameId, ImuMessage, MagMessage, RangeTable,
    SampleArray, SensorGroup, TimeRange, VarianceTable,
};
use tracing::{debug, info, trace, warn};

use crate::calibrator::{CalibratedSample, Calibrator};
use crate::config::{ConfigDiff, FilteredRawSource, SamplerConfig, validate_rates};
use crate::error::{Result, SamplerError};
use crate::transport::{Clock, OutputSink, SystemClock, Transport};
use crate::window::{WindowFilter, WindowMean};

/// Lifecycle of a [`SamplingEngine`].
///
/// `Uninitialized -> Ready` happens once, when device type, ranges and
/// calibration have all been set. `Ready <-> Polling` toggles as a
/// [`Scheduler`](crate::Scheduler) starts and stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineState {
    /// Not yet fully configured; no samples are processed.
    Uninitialized,
    /// Configured; ticks may be driven manually.
    Ready,
    /// Configured and driven by a scheduler.
    Polling,
}

impl EngineState {
    /// Lower-case state name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Polling => "polling",
        }
    }
}

/// One filtered emission: both window means, stamped at flush time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredOutput {
    /// Filtered raw reading, derived per [`FilteredRawSource`].
    pub raw: SampleArray,
    /// Mean of the calibrated readings.
    pub calibrated: SampleArray,
    /// Samples that went into the means.
    pub count: u32,
    /// Capture times of the first and last sample.
    pub span: TimeRange,
}

#[derive(Debug, Clone)]
struct Settings {
    device_type: DeviceType,
    serial_port: String,
    ranges: RangeTable,
    polling_rate: f64,
    filter_rate: f64,
    frame_id: FrameId,
    filtered_raw: FilteredRawSource,
}

impl From<&SamplerConfig> for Settings {
    fn from(config: &SamplerConfig) -> Self {
        Self {
            device_type: config.resolve_device_type().unwrap_or_default(),
            serial_port: config.serial_port.clone(),
            ranges: config.ranges,
            polling_rate: config.polling_rate,
            filter_rate: config.filter_rate,
            frame_id: config.frame_id.clone(),
            filtered_raw: config.filtered_raw,
        }
    }
}

#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
struct Lifecycle {
    state: EngineState,
    has_device_type: bool,
    has_ranges: bool,
    has_calibration: bool,
}

/// Raw and calibrated windows, always fed and flushed together.
///
/// `enabled` lives under the same lock as the windows, so a sample can never
/// land in a window that a concurrent disable has already dropped.
#[derive(Debug)]
struct FilterBank {
    enabled: bool,
    raw: WindowFilter,
    calibrated: WindowFilter,
}

impl FilterBank {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            raw: WindowFilter::new(),
            calibrated: WindowFilter::new(),
        }
    }

    /// Adds `sample` to both windows. Returns `false` while disabled.
    fn accumulate(&mut self, sample: &CalibratedSample) -> Result<bool> {
        if !self.enabled {
            return Ok(false);
        }
        // Both windows count the same samples; refuse before touching either.
        if self.calibrated.count() == u32::MAX {
            return Err(SamplerError::window_overflow(u32::MAX));
        }
        self.raw.accumulate(&sample.raw)?;
        self.calibrated.accumulate(&sample.calibrated)?;
        Ok(true)
    }

    fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    fn flush(&mut self) -> Option<(WindowMean, WindowMean)> {
        let raw = self.raw.flush();
        let calibrated = self.calibrated.flush();
        raw.zip(calibrated)
    }

    fn reset(&mut self) {
        self.raw.reset();
        self.calibrated.reset();
    }
}

/// Pulls samples from a [`Transport`], calibrates them, publishes them to an
/// [`OutputSink`] and feeds the window filters.
///
/// All methods take `&self`, so the engine can be shared between the poll
/// and filter cadences behind an `Arc`. The window accumulators sit under a
/// single lock: a flush sees every sample accumulated before it and none
/// after. The calibration tables are an immutable snapshot swapped
/// wholesale, so a poll sees either the old or the new pair, never a mix.
///
/// # Example
///
/// ```
/// use glam::DVec3;
/// use imu_sampler::{ManualClock, RecordingSink, SamplerConfig, SamplingEngine, ScriptedTransport};
/// use imu_types::{FULL_SCALE_COUNTS, SampleArray, Timestamp};
///
/// let counts = SampleArray::new(
///     Timestamp::zero(),
///     DVec3::new(FULL_SCALE_COUNTS / 2.0, 0.0, 0.0),
///     DVec3::ZERO,
///     DVec3::ZERO,
/// );
/// let sink = RecordingSink::new();
/// let engine = SamplingEngine::from_config(
///     ScriptedTransport::from_samples([counts]),
///     sink.clone(),
///     ManualClock::default(),
///     &SamplerConfig::default(),
/// ).unwrap();
///
/// let sample = engine.poll().unwrap();
/// assert!((sample.calibrated.gyro().x - 75.0).abs() < 1e-9);
///
/// let filtered = engine.output_filter().unwrap().unwrap();
/// assert_eq!(filtered.count, 1);
/// assert_eq!(sink.snapshot().filtered.len(), 1);
/// ```
pub struct SamplingEngine<T, S, C = SystemClock> {
    transport: Mutex<T>,
    sink: Mutex<S>,
    clock: C,
    settings: RwLock<Settings>,
    calibration: RwLock<Arc<CalibrationSet>>,
    filters: Mutex<FilterBank>,
    lifecycle: Mutex<Lifecycle>,
}

impl<T: Transport, S: OutputSink> SamplingEngine<T, S, SystemClock> {
    /// Creates an unconfigured engine stamping with wall-clock time.
    #[must_use]
    pub fn new(transport: T, sink: S) -> Self {
        Self::with_clock(transport, sink, SystemClock)
    }
}

impl<T: Transport, S: OutputSink, C: Clock> SamplingEngine<T, S, C> {
    /// Creates an unconfigured engine with an explicit clock.
    ///
    /// Settings hold the defaults of [`SamplerConfig`] but the engine stays
    /// [`EngineState::Uninitialized`] until each of device type, ranges and
    /// calibration has been set.
    #[must_use]
    pub fn with_clock(transport: T, sink: S, clock: C) -> Self {
        let defaults = SamplerConfig::default();
        Self {
            transport: Mutex::new(transport),
            sink: Mutex::new(sink),
            clock,
            settings: RwLock::new(Settings::from(&defaults)),
            calibration: RwLock::new(Arc::new(CalibrationSet::default())),
            filters: Mutex::new(FilterBank::new(defaults.filter_rate > 0.0)),
            lifecycle: Mutex::new(Lifecycle {
                state: EngineState::Uninitialized,
                has_device_type: false,
                has_ranges: false,
                has_calibration: false,
            }),
        }
    }

    /// Creates an engine and applies a full configuration, leaving it `Ready`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of `config`.
    pub fn from_config(transport: T, sink: S, clock: C, config: &SamplerConfig) -> Result<Self> {
        let engine = Self::with_clock(transport, sink, clock);
        engine.configure(config)?;
        Ok(engine)
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Current lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if a thread panicked while
    /// holding the lifecycle lock.
    pub fn state(&self) -> Result<EngineState> {
        Ok(lock(&self.lifecycle, "lifecycle")?.state)
    }

    fn require_ready(&self, operation: &'static str) -> Result<()> {
        match self.state()? {
            EngineState::Ready | EngineState::Polling => Ok(()),
            state @ EngineState::Uninitialized => {
                Err(SamplerError::not_ready(operation, state.name()))
            }
        }
    }

    fn mark_configured(&self, mark: impl FnOnce(&mut Lifecycle)) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle, "lifecycle")?;
        mark(&mut lifecycle);
        if lifecycle.state == EngineState::Uninitialized
            && lifecycle.has_device_type
            && lifecycle.has_ranges
            && lifecycle.has_calibration
        {
            lifecycle.state = EngineState::Ready;
            info!("sampling engine ready");
        }
        Ok(())
    }

    pub(crate) fn begin_polling(&self) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle, "lifecycle")?;
        match lifecycle.state {
            EngineState::Ready => {
                lifecycle.state = EngineState::Polling;
                Ok(())
            }
            EngineState::Polling => Err(SamplerError::AlreadyRunning),
            state @ EngineState::Uninitialized => {
                Err(SamplerError::not_ready("start", state.name()))
            }
        }
    }

    /// Leaves `Polling`, dropping whatever the windows had accumulated.
    pub(crate) fn end_polling(&self) -> Result<()> {
        let mut lifecycle = lock(&self.lifecycle, "lifecycle")?;
        if lifecycle.state == EngineState::Polling {
            lifecycle.state = EngineState::Ready;
            let mut filters = lock(&self.filters, "filters")?;
            if !filters.calibrated.is_empty() {
                debug!(
                    dropped = filters.calibrated.count(),
                    "discarding unflushed window"
                );
            }
            filters.reset();
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Applies a configuration, forwarding only the parts that changed.
    ///
    /// The whole configuration is validated first; on error nothing is
    /// applied. On an unconfigured engine every part is applied.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of `config`.
    pub fn configure(&self, config: &SamplerConfig) -> Result<ConfigDiff> {
        if let Err(err) = config.validate() {
            warn!(error = %err, "rejecting configuration");
            return Err(err.into());
        }

        let diff = if self.state()? == EngineState::Uninitialized {
            ConfigDiff::all()
        } else {
            ConfigDiff::between(&self.current_config()?, config)
        };

        if diff.device_type {
            self.set_device_type(&config.device_type)?;
        }
        if diff.serial_port {
            self.set_serial_port(config.serial_port.clone())?;
        }
        if diff.ranges {
            self.set_ranges(config.ranges)?;
        }
        if diff.calibration {
            self.update_calibration(config.biases, config.variances)?;
        }
        if diff.rates {
            self.set_rates(config.polling_rate, config.filter_rate)?;
        }
        if diff.frame_id {
            self.set_frame_id(config.frame_id.clone())?;
        }
        if diff.filtered_raw {
            self.set_filtered_raw(config.filtered_raw)?;
        }

        if !diff.is_empty() {
            info!(changed = ?diff.changed(), "configuration applied");
        }
        Ok(diff)
    }

    /// Snapshot of the active configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn current_config(&self) -> Result<SamplerConfig> {
        let settings = read(&self.settings, "settings")?;
        let calibration = self.calibration()?;
        Ok(SamplerConfig {
            device_type: settings.device_type.name().to_owned(),
            serial_port: settings.serial_port.clone(),
            ranges: settings.ranges,
            biases: calibration.bias,
            variances: calibration.variance,
            polling_rate: settings.polling_rate,
            filter_rate: settings.filter_rate,
            frame_id: settings.frame_id.clone(),
            filtered_raw: settings.filtered_raw,
        })
    }

    /// Selects the device model by name.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::UnknownDeviceType`](imu_types::ImuError::UnknownDeviceType)
    /// if `name` is not registered; the active device type is unchanged.
    pub fn set_device_type(&self, name: &str) -> Result<DeviceType> {
        let device_type = DeviceType::resolve(name).inspect_err(|err| {
            warn!(error = %err, "keeping previous device type");
        })?;
        write(&self.settings, "settings")?.device_type = device_type;
        self.mark_configured(|l| l.has_device_type = true)?;
        info!(device_type = %device_type, "device type set");
        Ok(device_type)
    }

    /// Active device model.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn device_type(&self) -> Result<DeviceType> {
        Ok(read(&self.settings, "settings")?.device_type)
    }

    /// Replaces all ranges. Affects subsequent polls only.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`](imu_types::ImuError::InvalidParameter)
    /// for a non-positive range; the active ranges are unchanged.
    pub fn set_ranges(&self, ranges: RangeTable) -> Result<()> {
        ranges.validate().inspect_err(|err| {
            warn!(error = %err, "keeping previous ranges");
        })?;
        write(&self.settings, "settings")?.ranges = ranges;
        self.mark_configured(|l| l.has_ranges = true)?;
        info!(
            gyro = ranges.range(SensorGroup::Gyro),
            accel = ranges.range(SensorGroup::Accel),
            mag = ranges.range(SensorGroup::Mag),
            "ranges set"
        );
        Ok(())
    }

    /// Replaces the range of one group.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`](imu_types::ImuError::InvalidParameter)
    /// for a non-positive range; the active ranges are unchanged.
    pub fn set_range(&self, group: SensorGroup, range: f64) -> Result<()> {
        let ranges = self.ranges()?.with_range(group, range).inspect_err(|err| {
            warn!(error = %err, "keeping previous ranges");
        })?;
        self.set_ranges(ranges)
    }

    /// Active ranges.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn ranges(&self) -> Result<RangeTable> {
        Ok(read(&self.settings, "settings")?.ranges)
    }

    /// Swaps in new bias and variance tables as one snapshot.
    ///
    /// Takes effect on the next poll. Samples already in the window keep the
    /// correction they were accumulated with.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`](imu_types::ImuError::InvalidParameter)
    /// for a negative variance or non-finite value; the active tables are unchanged.
    pub fn update_calibration(&self, bias: BiasTable, variance: VarianceTable) -> Result<()> {
        let next = CalibrationSet::new(bias, variance);
        next.validate().inspect_err(|err| {
            warn!(error = %err, "keeping previous calibration");
        })?;
        *write(&self.calibration, "calibration")? = Arc::new(next);
        self.mark_configured(|l| l.has_calibration = true)?;
        info!("calibration tables replaced");
        Ok(())
    }

    /// Active calibration snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn calibration(&self) -> Result<Arc<CalibrationSet>> {
        Ok(Arc::clone(&*read(&self.calibration, "calibration")?))
    }

    /// Sets the poll and filter cadences in Hz.
    ///
    /// A filter rate of zero disables filtering and drops the current window.
    ///
    /// # Errors
    ///
    /// Returns [`ImuError::InvalidParameter`](imu_types::ImuError::InvalidParameter)
    /// for a non-positive polling rate or negative filter rate; the active
    /// rates are unchanged.
    pub fn set_rates(&self, polling_rate: f64, filter_rate: f64) -> Result<()> {
        validate_rates(polling_rate, filter_rate).inspect_err(|err| {
            warn!(error = %err, "keeping previous rates");
        })?;
        {
            let mut settings = write(&self.settings, "settings")?;
            settings.polling_rate = polling_rate;
            settings.filter_rate = filter_rate;
        }
        lock(&self.filters, "filters")?.set_enabled(filter_rate > 0.0);
        info!(polling_rate, filter_rate, "rates set");
        Ok(())
    }

    /// Period between polls.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn poll_period(&self) -> Result<Duration> {
        let rate = read(&self.settings, "settings")?.polling_rate;
        Ok(Duration::from_rate_hz(rate).unwrap_or_default())
    }

    /// Period between filter emissions, or `None` while filtering is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn filter_period(&self) -> Result<Option<Duration>> {
        let rate = read(&self.settings, "settings")?.filter_rate;
        Ok(Duration::from_rate_hz(rate))
    }

    /// Sets the frame stamped on outgoing messages.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unwritable.
    pub fn set_frame_id(&self, frame_id: FrameId) -> Result<()> {
        if frame_id.is_empty() {
            warn!("frame id is empty");
        }
        info!(frame_id = %frame_id, "frame id set");
        write(&self.settings, "settings")?.frame_id = frame_id;
        Ok(())
    }

    /// Records the serial port path for whoever owns the transport.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unwritable.
    pub fn set_serial_port(&self, serial_port: String) -> Result<()> {
        info!(serial_port = %serial_port, "serial port set");
        write(&self.settings, "settings")?.serial_port = serial_port;
        Ok(())
    }

    /// Chooses how the filtered raw stream is derived.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unwritable.
    pub fn set_filtered_raw(&self, source: FilteredRawSource) -> Result<()> {
        write(&self.settings, "settings")?.filtered_raw = source;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Ticks
    // ---------------------------------------------------------------------

    /// Runs one poll tick.
    ///
    /// Reads a sample, stamps it, scales and calibrates it, adds it to the
    /// filter windows and publishes the raw/calibrated pair. Filtering
    /// operates on calibrated data.
    ///
    /// The sample is accumulated before it is published, so an overflowing
    /// window rejects the tick without emitting anything.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::NotReady`] before the engine is configured
    /// - [`SamplerError::TransportRead`] if the transport is not ready or
    ///   the read fails or yields non-finite data; nothing is emitted or
    ///   accumulated for this tick
    /// - [`SamplerError::WindowOverflow`] if the window counter is saturated;
    ///   nothing is emitted for this tick
    pub fn poll(&self) -> Result<CalibratedSample> {
        self.require_ready("poll")?;

        let counts = self.read_transport().inspect_err(|err| {
            warn!(error = %err, "skipping poll tick");
        })?;
        let counts = counts.with_timestamp(self.clock.now());

        let (ranges, frame_id) = {
            let settings = read(&self.settings, "settings")?;
            (settings.ranges, settings.frame_id.clone())
        };
        let calibration = self.calibration()?;
        let sample = Calibrator::new(ranges).process(&counts, &calibration);

        for group in SensorGroup::ALL {
            if !ranges.contains(group, sample.raw.group(group)) {
                debug!(group = %group, "reading outside full-scale range");
            }
        }

        let accumulated = lock(&self.filters, "filters")?
            .accumulate(&sample)
            .inspect_err(|err| warn!(error = %err, "skipping poll tick"))?;

        {
            let mut sink = lock(&self.sink, "sink")?;
            let variance = &calibration.variance;
            sink.publish_instant(
                &ImuMessage::from_sample(&sample.raw, variance, &frame_id),
                &ImuMessage::from_sample(&sample.calibrated, variance, &frame_id),
            );
            sink.publish_mag_instant(
                &MagMessage::from_sample(&sample.raw, variance, &frame_id),
                &MagMessage::from_sample(&sample.calibrated, variance, &frame_id),
            );
        }

        trace!(
            stamp = sample.raw.timestamp().as_nanos(),
            accumulated,
            "sample processed"
        );
        Ok(sample)
    }

    fn read_transport(&self) -> Result<SampleArray> {
        let mut transport = lock(&self.transport, "transport")?;
        if !transport.is_ready() {
            return Err(SamplerError::transport_read("transport not ready"));
        }
        let counts = transport.read_sample()?;
        if !counts.is_finite() {
            return Err(SamplerError::transport_read("non-finite reading"));
        }
        Ok(counts)
    }

    /// Runs one filter tick.
    ///
    /// Flushes the windows and, if they held samples, publishes the filtered
    /// raw/calibrated pair stamped with the current time and tagged with the
    /// active variance. Never blocks on the transport.
    ///
    /// Returns `Ok(None)` when the window is empty or filtering is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::NotReady`] before the engine is configured.
    pub fn output_filter(&self) -> Result<Option<FilteredOutput>> {
        self.require_ready("output_filter")?;

        let (frame_id, source) = {
            let settings = read(&self.settings, "settings")?;
            (settings.frame_id.clone(), settings.filtered_raw)
        };

        // A disabled bank is always empty.
        let Some((raw, calibrated)) = lock(&self.filters, "filters")?.flush() else {
            trace!("filter window empty");
            return Ok(None);
        };

        let calibration = self.calibration()?;
        let stamp = self.clock.now();
        let output = FilteredOutput {
            raw: filtered_raw(source, &raw, &calibrated, &calibration.bias).with_timestamp(stamp),
            calibrated: calibrated.mean.with_timestamp(stamp),
            count: calibrated.count,
            span: calibrated.span,
        };

        {
            let mut sink = lock(&self.sink, "sink")?;
            let variance = &calibration.variance;
            sink.publish_filtered(
                &ImuMessage::from_sample(&output.raw, variance, &frame_id),
                &ImuMessage::from_sample(&output.calibrated, variance, &frame_id),
            );
            sink.publish_mag_filtered(
                &MagMessage::from_sample(&output.raw, variance, &frame_id),
                &MagMessage::from_sample(&output.calibrated, variance, &frame_id),
            );
        }

        debug!(
            samples = output.count,
            span_ms = output.span.duration().as_millis(),
            "filter window flushed"
        );
        Ok(Some(output))
    }

    /// Samples accumulated in the current window.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if engine state is unreadable.
    pub fn pending_samples(&self) -> Result<u32> {
        Ok(lock(&self.filters, "filters")?.calibrated.count())
    }

    /// Runs `f` with exclusive access to the transport.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::LockPoisoned`] if the transport lock is poisoned.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut transport = lock(&self.transport, "transport")?;
        Ok(f(&mut *transport))
    }

    /// Time source used for stamps.
    pub const fn clock(&self) -> &C {
        &self.clock
    }
}

fn filtered_raw(
    source: FilteredRawSource,
    raw: &WindowMean,
    calibrated: &WindowMean,
    bias: &BiasTable,
) -> SampleArray {
    match source {
        FilteredRawSource::RawMean => raw.mean,
        FilteredRawSource::CalibratedMean => Calibrator::restore_bias(&calibrated.mean, bias),
    }
}

impl<T, S, C> std::fmt::Debug for SamplingEngine<T, S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SamplingEngine")
            .field("lifecycle", &self.lifecycle)
            .field("settings", &self.settings)
            .field("calibration", &self.calibration)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

fn lock<'a, X>(mutex: &'a Mutex<X>, what: &'static str) -> Result<MutexGuard<'a, X>> {
    mutex.lock().map_err(|_| SamplerError::LockPoisoned(what))
}

fn read<'a, X>(lock: &'a RwLock<X>, what: &'static str) -> Result<RwLockReadGuard<'a, X>> {
    lock.read().map_err(|_| SamplerError::LockPoisoned(what))
}

fn write<'a, X>(lock: &'a RwLock<X>, what: &'static str) -> Result<RwLockWriteGuard<'a, X>> {
    lock.write().map_err(|_| SamplerError::LockPoisoned(what))
}
