//! The single-slot delivery channel and the stop signal.
//!
//! The scheduling task is the only producer. It offers a pulse without ever
//! waiting: if the previous pulse is still unread, the new one is dropped.
//! The stop signal is a `watch` flag, so triggering it is non-blocking and
//! safe to repeat from any number of handles.

use crate::common::Pulse;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tracing::debug;

pub use tokio::sync::mpsc::error::TryRecvError;

/// Creates a connected producer/consumer pair observing `stop`.
pub(crate) fn delivery_slot(stop: &StopHandle) -> (PulseSlot, Pulses) {
    let (tx, rx) = mpsc::channel(1);
    let pulses = Pulses {
        rx,
        stop: stop.tx.subscribe(),
    };
    (PulseSlot { tx }, pulses)
}

/// What happened to an offered pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// The slot was empty and now holds the pulse.
    Delivered,
    /// The slot already held an unread pulse.
    Dropped,
    /// The consumer is gone.
    Closed,
}

/// The write side of the delivery slot, owned by the scheduling task.
#[derive(Debug)]
pub(crate) struct PulseSlot {
    tx: mpsc::Sender<Pulse>,
}

impl PulseSlot {
    /// Offers a pulse without waiting for the consumer.
    pub(crate) fn offer(&self) -> Delivery {
        match self.tx.try_send(Pulse) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Dropped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }

    /// Resolves once the read side has been dropped.
    pub(crate) async fn closed(&self) {
        self.tx.closed().await
    }
}

/// The read side of a ticker's delivery slot.
///
/// Holds at most one undelivered pulse. Once the ticker is stopped every read
/// reports exhaustion immediately, even if a pulse was still buffered.
#[derive(Debug)]
pub struct Pulses {
    rx: mpsc::Receiver<Pulse>,
    stop: watch::Receiver<bool>,
}

impl Pulses {
    /// Waits for the next pulse.
    ///
    /// Returns `None` once the ticker has been stopped. Cancel safe.
    pub async fn recv(&mut self) -> Option<Pulse> {
        if self.is_stopped() {
            return None;
        }
        tokio::select! {
            biased;
            // `false` means every stop handle is gone; keep waiting on the slot.
            true = stop_requested(&mut self.stop) => None,
            pulse = self.rx.recv() => pulse,
        }
    }

    /// Takes the buffered pulse, if any, without waiting.
    ///
    /// Fails with `Empty` when nothing is buffered and with `Disconnected`
    /// once the ticker has been stopped.
    pub fn try_recv(&mut self) -> Result<Pulse, TryRecvError> {
        if self.is_stopped() {
            return Err(TryRecvError::Disconnected);
        }
        self.rx.try_recv()
    }

    /// Blocking variant of [`Pulses::recv`] for synchronous consumers.
    ///
    /// # Panics
    ///
    /// Panics when called from within an asynchronous execution context.
    pub fn blocking_recv(&mut self) -> Option<Pulse> {
        if self.is_stopped() {
            return None;
        }
        let pulse = self.rx.blocking_recv();
        // A stop may have landed while we were parked.
        if self.is_stopped() {
            return None;
        }
        pulse
    }

    /// Returns `true` once a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }
}

/// A cloneable handle that stops a ticker.
///
/// Stopping is idempotent and never blocks. The scheduling task observes the
/// request at its current wait point and exits without a trailing pulse.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests the ticker to stop. Calling this more than once is harmless.
    pub fn stop(&self) {
        if !self.tx.send_replace(true) {
            debug!("Stop requested.");
        }
    }

    /// Returns `true` once a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates the listener the scheduling task waits on.
    pub(crate) fn listener(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }
}

/// The scheduling task's view of the stop signal.
#[derive(Debug)]
pub(crate) struct StopListener {
    rx: watch::Receiver<bool>,
}

impl StopListener {
    /// Resolves when a stop is requested or every `StopHandle` has been dropped.
    pub(crate) async fn wait(&mut self) {
        stop_requested(&mut self.rx).await;
    }

    pub(crate) fn is_requested(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Resolves to `true` on a stop request and to `false` if the sender is gone.
async fn stop_requested(rx: &mut watch::Receiver<bool>) -> bool {
    loop {
        if *rx.borrow_and_update() {
            return true;
        }
        if rx.changed().await.is_err() {
            return false;
        }
    }
}
