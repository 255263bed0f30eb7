//! Defines the configuration structure for a backoff ticker.
//!
//! The struct is designed to be deserialized with `serde`, so the backoff
//! parameters of a service can live in its configuration file (or in
//! `BACKOFF_*` environment variables) instead of in the application code.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// The parameters of a backoff ticker.
///
/// Intervals are expressed in whole milliseconds. A `max_interval_ms` of zero
/// means the interval grows without a ceiling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackoffConfig {
    /// The first wait, before the first pulse.
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// The ceiling for the wait. Zero disables the ceiling.
    #[serde(default)]
    pub max_interval_ms: u64,

    /// The multiplier applied to the wait after every pulse.
    #[serde(default = "default_factor")]
    pub factor: f32,
}

impl BackoffConfig {
    /// Loads the configuration from an optional TOML file, overlaid with
    /// `BACKOFF_*` environment variables (e.g. `BACKOFF_FACTOR=1.5`).
    ///
    /// A missing file is not an error; absent keys fall back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(
            path,
            Some(::config::Environment::with_prefix("BACKOFF").try_parsing(true)),
        )
    }

    fn from_sources(path: Option<&Path>, env: Option<::config::Environment>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(false),
            );
        }
        if let Some(env) = env {
            builder = builder.add_source(env);
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// The ceiling, where `Duration::ZERO` means unbounded.
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

// --- Default value functions for serde ---

fn default_min_interval_ms() -> u64 {
    100
}

fn default_factor() -> f32 {
    2.0
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
            max_interval_ms: 0,
            factor: default_factor(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(text: &str) -> BackoffConfig {
        ::config::Config::builder()
            .add_source(::config::File::from_str(text, ::config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(from_toml(""), BackoffConfig::default());
    }

    #[test]
    fn reads_all_fields() {
        let config = from_toml(
            r#"
            min_interval_ms = 250
            max_interval_ms = 30000
            factor = 1.5
            "#,
        );
        assert_eq!(config.min_interval(), Duration::from_millis(250));
        assert_eq!(config.max_interval(), Duration::from_secs(30));
        assert_eq!(config.factor, 1.5);
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config =
            BackoffConfig::from_sources(Some(Path::new("does/not/exist.toml")), None).unwrap();
        assert_eq!(config.min_interval_ms, default_min_interval_ms());
    }

    #[test]
    fn reads_a_file_on_disk() {
        let path = std::env::temp_dir().join(format!("rdx-backoff-{}.toml", std::process::id()));
        std::fs::write(&path, "min_interval_ms = 5\nfactor = 3.0\n").unwrap();
        let config = BackoffConfig::from_sources(Some(&path), None).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.min_interval(), Duration::from_millis(5));
        assert_eq!(config.max_interval(), Duration::ZERO);
        assert_eq!(config.factor, 3.0);
    }

    #[test]
    fn environment_overrides_the_file() {
        let path = std::env::temp_dir().join(format!("rdx-backoff-env-{}.toml", std::process::id()));
        std::fs::write(&path, "min_interval_ms = 5\nfactor = 3.0\n").unwrap();
        let vars = ::config::Map::from([
            ("BACKOFF_FACTOR".to_string(), "1.5".to_string()),
            ("BACKOFF_MAX_INTERVAL_MS".to_string(), "40".to_string()),
        ]);
        let env = ::config::Environment::with_prefix("BACKOFF")
            .try_parsing(true)
            .source(Some(vars));
        let config = BackoffConfig::from_sources(Some(&path), Some(env)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.min_interval(), Duration::from_millis(5));
        assert_eq!(config.max_interval(), Duration::from_millis(40));
        assert_eq!(config.factor, 1.5);
    }
}
