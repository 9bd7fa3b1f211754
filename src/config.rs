//! Configuration for jotdb
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Configuration for a [`Database`](crate::Database) instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Save Scheduler Configuration
    // -------------------------------------------------------------------------
    /// Minimum wall-clock time between two scheduler-triggered flushes.
    ///
    /// Explicit [`save`](crate::Database::save) calls bypass this throttle.
    pub save_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_interval: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the minimum interval between scheduled background flushes
    pub fn save_interval(mut self, interval: Duration) -> Self {
        self.config.save_interval = interval;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
