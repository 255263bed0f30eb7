//! The backoff ticker and the scheduling task that drives it.

use crate::common::{Phase, Pulse};
use crate::components::schedule::BackoffSchedule;
use crate::components::slot::{
    delivery_slot, Delivery, PulseSlot, Pulses, StopHandle, StopListener, TryRecvError,
};
use crate::config::BackoffConfig;
use crate::error::{BackoffError, Result};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// A ticker that pulses at exponentially growing intervals.
///
/// The first pulse arrives after `min`; every following wait is the previous
/// one multiplied by `factor`, clamped at `max` unless `max` is zero. There is
/// no immediate pulse at construction.
///
/// The ticker owns one background task, spawned by the constructor. That task
/// is the only writer of the interval and the only producer of pulses, and it
/// never waits on the consumer: a pulse that finds the previous one unread is
/// dropped. A reader that falls behind therefore sees at most one buffered
/// pulse, never a backlog.
///
/// Stopping is permanent. Dropping the ticker also ends the background task.
#[derive(Debug)]
pub struct Ticker {
    pulses: Pulses,
    stop: StopHandle,
    task: JoinHandle<()>,
    schedule: BackoffSchedule,
}

impl Ticker {
    /// Validates the parameters and starts a new ticker.
    ///
    /// `min` must be non-zero, `max` must be zero (no ceiling) or at least
    /// `min`, and `factor` must be a finite value greater than 1.0. Must be
    /// called from within a Tokio runtime, since the scheduling task is
    /// spawned right away.
    pub fn new(min: Duration, max: Duration, factor: f32) -> Result<Self> {
        let schedule = BackoffSchedule::new(min, max, factor)?;
        let runtime = Handle::try_current().map_err(|_| BackoffError::NoRuntime)?;

        let stop = StopHandle::new();
        let (slot, pulses) = delivery_slot(&stop);
        let task = runtime.spawn(run(schedule.clone(), slot, stop.listener()));

        Ok(Self {
            pulses,
            stop,
            task,
            schedule,
        })
    }

    /// Like [`Ticker::new`], but panics on invalid parameters.
    ///
    /// Meant for call sites whose parameters are constants known to be valid.
    ///
    /// # Panics
    ///
    /// Panics if [`Ticker::new`] would return an error.
    pub fn must_new(min: Duration, max: Duration, factor: f32) -> Self {
        match Self::new(min, max, factor) {
            Ok(ticker) => ticker,
            Err(err) => panic!("backoff ticker init error: {err}"),
        }
    }

    /// Starts a ticker from loaded configuration.
    pub fn from_config(config: &BackoffConfig) -> Result<Self> {
        Self::new(config.min_interval(), config.max_interval(), config.factor)
    }

    /// Waits for the next pulse. Returns `None` once the ticker is stopped.
    pub async fn recv(&mut self) -> Option<Pulse> {
        self.pulses.recv().await
    }

    /// Takes the buffered pulse, if any, without waiting.
    pub fn try_recv(&mut self) -> std::result::Result<Pulse, TryRecvError> {
        self.pulses.try_recv()
    }

    /// The read side of the ticker.
    pub fn pulses(&mut self) -> &mut Pulses {
        &mut self.pulses
    }

    /// Requests the ticker to stop.
    ///
    /// Never blocks and may be called any number of times. Reads return
    /// `None` from now on; the background task exits at its current wait.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// A handle that can stop this ticker from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> Phase {
        if self.stop.is_stopped() || self.task.is_finished() {
            Phase::Stopped
        } else {
            Phase::Running
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.phase().is_stopped()
    }

    pub fn min_interval(&self) -> Duration {
        self.schedule.min_interval()
    }

    /// The ceiling, or `None` when the interval grows without bound.
    pub fn max_interval(&self) -> Option<Duration> {
        self.schedule.max_interval()
    }

    pub fn factor(&self) -> f32 {
        self.schedule.factor()
    }

    /// Stops the ticker and waits for its background task to exit.
    pub async fn shutdown(self) {
        self.stop.stop();
        if let Err(err) = self.task.await {
            warn!("Ticker task did not exit cleanly: {}", err);
        }
    }
}

/// Why the scheduling task woke up.
enum Wake {
    Elapsed,
    Stopped,
    ConsumerGone,
}

async fn run(mut schedule: BackoffSchedule, slot: PulseSlot, mut stop: StopListener) {
    debug!(
        min = ?schedule.min_interval(),
        max = ?schedule.max_interval(),
        factor = schedule.factor(),
        "Ticker started."
    );
    let mut deadline = Instant::now();
    let mut rounds: u64 = 0;

    loop {
        let interval = schedule.current();
        // Deadlines accumulate so timer latency does not turn into drift.
        let Some(next) = deadline.checked_add(interval) else {
            debug!(?interval, "Interval is out of timer range, idling until stopped.");
            tokio::select! {
                _ = stop.wait() => {}
                _ = slot.closed() => {}
            }
            break;
        };

        let wake = tokio::select! {
            biased;
            _ = stop.wait() => Wake::Stopped,
            _ = slot.closed() => Wake::ConsumerGone,
            _ = time::sleep_until(next) => Wake::Elapsed,
        };
        match wake {
            Wake::Elapsed => {}
            Wake::Stopped => break,
            Wake::ConsumerGone => {
                debug!("All readers are gone.");
                break;
            }
        }
        if stop.is_requested() {
            break;
        }

        rounds += 1;
        match slot.offer() {
            Delivery::Delivered => trace!(rounds, ?interval, "Pulse delivered."),
            Delivery::Dropped => trace!(rounds, ?interval, "Pulse dropped, previous one unread."),
            Delivery::Closed => break,
        }

        deadline = next;
        let now = Instant::now();
        let behind = now.saturating_duration_since(deadline);
        if behind > interval {
            debug!(?behind, "Ticker fell behind, rebasing.");
            deadline = now;
        }
        schedule.advance();
    }

    debug!(rounds, "Ticker stopped.");
}
