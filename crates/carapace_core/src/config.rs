//! # World Configuration
//!
//! Loaded once at startup from TOML.
//!
//! ```toml
//! initial_capacity = 1024
//! slow_tick_warn_ms = 16.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Tuning knobs for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Starting capacity of each per-kind component store, applied when the
    /// first component of a kind is attached.
    pub initial_capacity: usize,
    /// A tick slower than this (milliseconds) is logged as a warning.
    /// `None` disables the check.
    pub slow_tick_warn_ms: Option<f64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            slow_tick_warn_ms: Some(16.0),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a non-positive or non-finite
    /// slow-tick threshold.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(ms) = self.slow_tick_warn_ms {
            if !ms.is_finite() || ms <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "slow_tick_warn_ms must be a positive number, got {ms}"
                )));
            }
        }
        Ok(())
    }
}
