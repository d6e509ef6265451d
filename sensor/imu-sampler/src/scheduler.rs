//! Fixed-rate driving of the poll and filter ticks.
//!
//! Each cadence runs on its own named thread. A slow transport read delays
//! only the poll loop; filter emissions keep their own rhythm. Periods are
//! re-read every iteration, so rate changes take effect on the next tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use imu_types::Duration;
use tracing::{debug, error, info, warn};

use crate::engine::SamplingEngine;
use crate::error::{Result, SamplerError};
use crate::transport::{Clock, OutputSink, Transport};

const POLL_THREAD: &str = "imu-poll";
const FILTER_THREAD: &str = "imu-filter";

/// How often a loop with nothing to do rechecks its period.
const IDLE_RECHECK: Duration = Duration::from_millis(100);

/// Counters for one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickStats {
    /// Ticks that completed.
    pub ticks: u64,
    /// Ticks that failed with a recoverable error and were skipped.
    pub skipped: u64,
    /// Ticks that took longer than their period.
    pub overruns: u64,
}

/// Counters for both loops of a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// Poll loop counters.
    pub poll: TickStats,
    /// Filter loop counters.
    pub filter: TickStats,
}

#[derive(Debug, Default)]
struct Counters {
    ticks: AtomicU64,
    skipped: AtomicU64,
    overruns: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> TickStats {
        TickStats {
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    stop: AtomicBool,
    poll: Counters,
    filter: Counters,
}

impl Shared {
    fn stopping(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Parks until `deadline` or until asked to stop.
    fn wait_until(&self, deadline: Instant) {
        while !self.stopping() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }
}

/// Drives a [`SamplingEngine`] at its configured rates.
///
/// Starting moves the engine to `Polling`; stopping (explicitly or on drop)
/// joins both threads, drops any partially accumulated window and returns
/// the engine to `Ready`.
///
/// A loop skips a tick on a recoverable error. Any other error stops both
/// loops; the engine stays `Polling` until the scheduler is stopped or dropped.
pub struct Scheduler<T, S, C>
where
    T: Transport + 'static,
    S: OutputSink + 'static,
    C: Clock + 'static,
{
    engine: Arc<SamplingEngine<T, S, C>>,
    shared: Arc<Shared>,
    poll: Option<JoinHandle<()>>,
    filter: Option<JoinHandle<()>>,
    shut_down: bool,
}

impl<T, S, C> Scheduler<T, S, C>
where
    T: Transport + 'static,
    S: OutputSink + 'static,
    C: Clock + 'static,
{
    /// Starts the poll and filter loops.
    ///
    /// # Errors
    ///
    /// - [`SamplerError::NotReady`] if the engine is not configured
    /// - [`SamplerError::AlreadyRunning`] if another scheduler drives it
    /// - [`SamplerError::Spawn`] if a thread cannot be created; any loop
    ///   already started is stopped and the engine is returned to `Ready`
    pub fn start(engine: Arc<SamplingEngine<T, S, C>>) -> Result<Self> {
        engine.begin_polling()?;

        let mut scheduler = Self {
            engine,
            shared: Arc::new(Shared::default()),
            poll: None,
            filter: None,
            shut_down: false,
        };

        let poll = {
            let engine = Arc::clone(&scheduler.engine);
            let shared = Arc::clone(&scheduler.shared);
            spawn(POLL_THREAD, move || {
                run_loop(
                    POLL_THREAD,
                    &shared,
                    &shared.poll,
                    || engine.poll_period().map(Some),
                    || engine.poll().map(|_| ()),
                );
            })
        };
        scheduler.poll = Some(poll?);

        let filter = {
            let engine = Arc::clone(&scheduler.engine);
            let shared = Arc::clone(&scheduler.shared);
            spawn(FILTER_THREAD, move || {
                run_loop(
                    FILTER_THREAD,
                    &shared,
                    &shared.filter,
                    || engine.filter_period(),
                    || engine.output_filter().map(|_| ()),
                );
            })
        };
        scheduler.filter = Some(filter?);

        info!("scheduler started");
        Ok(scheduler)
    }

    /// Engine being driven.
    #[must_use]
    pub fn engine(&self) -> &Arc<SamplingEngine<T, S, C>> {
        &self.engine
    }

    /// Returns `true` until [`Scheduler::stop`] is called or a loop exits on
    /// an unrecoverable error.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.shared.stopping()
    }

    /// Counters of both loops.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            poll: self.shared.poll.snapshot(),
            filter: self.shared.filter.snapshot(),
        }
    }

    /// Stops both loops and waits for them to exit.
    ///
    /// The window in progress is discarded, not flushed.
    ///
    /// # Errors
    ///
    /// Returns [`SamplerError::ThreadPanicked`] if a loop panicked. The
    /// engine is returned to `Ready` regardless.
    pub fn stop(mut self) -> Result<SchedulerStats> {
        self.shutdown()?;
        Ok(self.stats())
    }

    fn abort(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "scheduler shutdown failed");
        }
    }

    fn shutdown(&mut self) -> Result<()> {
        self.shut_down = true;
        self.shared.request_stop();

        let mut outcome = Ok(());
        for (name, handle) in [
            (POLL_THREAD, self.poll.take()),
            (FILTER_THREAD, self.filter.take()),
        ] {
            let Some(handle) = handle else { continue };
            handle.thread().unpark();
            if handle.join().is_err() {
                error!(thread = name, "loop panicked");
                outcome = Err(SamplerError::ThreadPanicked(name));
            }
        }

        self.engine.end_polling()?;
        debug!(stats = ?self.stats(), "scheduler stopped");
        outcome
    }
}

impl<T, S, C> Drop for Scheduler<T, S, C>
where
    T: Transport + 'static,
    S: OutputSink + 'static,
    C: Clock + 'static,
{
    fn drop(&mut self) {
        if !self.shut_down {
            self.abort();
        }
    }
}

impl<T, S, C> std::fmt::Debug for Scheduler<T, S, C>
where
    T: Transport + 'static,
    S: OutputSink + 'static,
    C: Clock + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("running", &self.is_running())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

fn spawn(name: &'static str, body: impl FnOnce() + Send + 'static) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(body)
        .map_err(|source| SamplerError::Spawn { name, source })
}

fn run_loop(
    name: &'static str,
    shared: &Shared,
    counters: &Counters,
    mut period: impl FnMut() -> Result<Option<Duration>>,
    mut tick: impl FnMut() -> Result<()>,
) {
    debug!(thread = name, "loop started");
    while !shared.stopping() {
        let started = Instant::now();
        let period = match period() {
            Ok(Some(period)) => std::time::Duration::from(period),
            Ok(None) => {
                // Disabled; wait for the rate to come back.
                shared.wait_until(started + std::time::Duration::from(IDLE_RECHECK));
                continue;
            }
            Err(err) => {
                error!(thread = name, error = %err, "loop stopped");
                shared.request_stop();
                break;
            }
        };

        match tick() {
            Ok(()) => {
                counters.ticks.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) if err.is_recoverable() => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
            }
            Err(err) => {
                error!(thread = name, error = %err, "loop stopped");
                shared.request_stop();
                break;
            }
        }

        let deadline = started + period;
        if Instant::now() > deadline {
            counters.overruns.fetch_add(1, Ordering::Relaxed);
        }
        shared.wait_until(deadline);
    }
    debug!(thread = name, "loop exited");
}
