//! # Backoff
//!
//! A self-resetting ticker that pulses at exponentially growing intervals.
//!
//! The ticker is a timing primitive for retry and polling loops. It owns a
//! background task that waits, pulses, and stretches the next wait by a
//! constant factor until an optional ceiling is reached. Callers only read
//! pulses; they never do the arithmetic or the timer bookkeeping themselves.
//!
//! ## Core Concepts
//!
//! - **Pulse**: a payload-free event meaning "an interval has elapsed".
//! - **Schedule**: the interval sequence `min, min*f, min*f^2, ...`, clamped at
//!   `max` when a ceiling is configured (`max == 0` means unbounded).
//! - **Delivery Slot**: a single-capacity hand-off. If the previous pulse has not
//!   been read, the new one is dropped; a slow reader never builds a backlog.
//! - **Stop**: an idempotent, non-blocking request that ends the ticker for good.
//!   A stopped ticker cannot be restarted; create a new one instead.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use backoff::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Start a ticker: 100ms, 200ms, 400ms, ... capped at 5s.
//!     let mut ticker = Ticker::new(
//!         Duration::from_millis(100),
//!         Duration::from_secs(5),
//!         2.0,
//!     )?;
//!
//!     // 2. Retry until the operation succeeds.
//!     while ticker.recv().await.is_some() {
//!         if try_connect().await {
//!             break;
//!         }
//!     }
//!
//!     // 3. Stop the ticker. Further reads return `None` immediately.
//!     ticker.stop();
//!     Ok(())
//! }
//! # async fn try_connect() -> bool { true }
//! ```

pub const TICKER_NAME: &str = "Backoff Ticker";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Declare all the modules in the crate.
pub mod common;
pub mod components;
pub mod config;
pub mod error;
pub mod ticker;

/// A prelude module for easy importing of the most common backoff types.
pub mod prelude {
    pub use crate::common::{Phase, Pulse};
    pub use crate::components::schedule::BackoffSchedule;
    pub use crate::components::slot::{Pulses, StopHandle, TryRecvError};
    pub use crate::config::BackoffConfig;
    pub use crate::error::BackoffError;
    pub use crate::ticker::Ticker;
}
