//! Store Configuration
//!
//! Capacity and removal delay for a notification store.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use toaststore::notifications::StoreConfig;
//!
//! let config = StoreConfig::builder()
//!     .with_capacity(3)
//!     .with_remove_delay(Duration::from_millis(250))
//!     .build()?;
//! # Ok::<(), toaststore::notifications::ToastError>(())
//! ```

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::notifications::error::{ToastError, ToastResult};
use crate::notifications::reducer::DEFAULT_CAPACITY;

/// Default delay between a dismissal and the removal of the entry
pub const DEFAULT_REMOVE_DELAY: Duration = Duration::from_millis(1000);

/// Notification store parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of notifications held at once
    pub capacity: usize,
    /// Delay between a dismissal and the automatic removal
    pub remove_delay: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            remove_delay: DEFAULT_REMOVE_DELAY,
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder {
            config: Self::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ToastResult<()> {
        if self.capacity == 0 {
            return Err(ToastError::invalid_config("capacity", "must be at least 1"));
        }
        Ok(())
    }

    pub fn remove_delay_ms(&self) -> u64 {
        self.remove_delay.as_millis() as u64
    }
}

/// Fluent builder for [`StoreConfig`]
#[derive(Debug, Clone)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    pub fn with_remove_delay(mut self, delay: Duration) -> Self {
        self.config.remove_delay = delay;
        self
    }

    pub fn with_remove_delay_ms(self, delay_ms: u64) -> Self {
        self.with_remove_delay(Duration::from_millis(delay_ms))
    }

    /// Build and validate the configuration
    pub fn build(self) -> ToastResult<StoreConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
