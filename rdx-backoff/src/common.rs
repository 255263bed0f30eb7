//! Contains common, primitive types shared across the crate.
//!
//! These are the small value types that cross the boundary between the
//! scheduling task and the code consuming its pulses.

/// A single emitted tick. It carries no payload; receiving one means that at
/// least one interval has elapsed since the previously observed pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pulse;

/// The lifecycle phase of a `Ticker`.
///
/// A ticker is `Running` from the moment it is constructed. `Stopped` is
/// terminal: no transition leads back to `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Running,
    Stopped,
}

impl Phase {
    /// Returns `true` once the ticker has been asked to stop.
    pub fn is_stopped(self) -> bool {
        matches!(self, Phase::Stopped)
    }
}
