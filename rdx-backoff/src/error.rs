//! Defines the error type returned by the backoff crate.
//!
//! Every variant except `Config` is a construction-time validation failure.
//! Once a `Ticker` is running it never fails; the pulse source becoming
//! exhausted after a stop is normal termination, not an error.

use std::time::Duration;

/// The result for fallible operations in this crate.
pub type Result<T> = std::result::Result<T, BackoffError>;

/// An error raised while configuring or constructing a `Ticker`.
#[derive(Debug, thiserror::Error)]
pub enum BackoffError {
    /// The starting interval was zero.
    #[error("non-positive min backoff interval of {0:?} specified for ticker")]
    NonPositiveMin(Duration),

    /// The ceiling was set but lies below the starting interval.
    #[error("max backoff interval of {max:?} is below the min interval of {min:?}")]
    MaxBelowMin { min: Duration, max: Duration },

    /// The growth factor was not a finite value strictly greater than 1.0.
    #[error("backoff factor must be a finite value greater than 1.0, got {0}")]
    InvalidFactor(f32),

    /// The ticker was constructed outside of a Tokio runtime.
    #[error("a backoff ticker must be created from within a Tokio runtime")]
    NoRuntime,

    /// Loading the configuration failed.
    #[error(transparent)]
    Config(#[from] ::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = BackoffError::NonPositiveMin(Duration::ZERO);
        assert_eq!(
            err.to_string(),
            "non-positive min backoff interval of 0ns specified for ticker"
        );

        let err = BackoffError::MaxBelowMin {
            min: Duration::from_micros(4),
            max: Duration::from_micros(3),
        };
        assert!(err.to_string().contains("3µs"));
        assert!(err.to_string().contains("4µs"));

        let err = BackoffError::InvalidFactor(0.9);
        assert!(err.to_string().ends_with("got 0.9"));
    }
}
