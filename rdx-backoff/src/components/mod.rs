//! Contains the building blocks a `Ticker` is assembled from.
//!
//! The `schedule` computes the interval sequence and knows nothing about time
//! passing. The `slot` is the hand-off between the scheduling task and the
//! consumer, together with the stop signal that ends it. The `Ticker` wires
//! both into a single background task.

pub mod schedule;
pub mod slot;
