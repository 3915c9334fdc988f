//! Notification Store Error Types
//!
//! Store operations themselves never fail; unknown ids and repeated
//! dismissals are silent no-ops. These errors cover construction and
//! configuration only.

use thiserror::Error;

/// Result type for notification store operations
pub type ToastResult<T> = Result<T, ToastError>;

/// Errors that can occur while setting up a notification store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToastError {
    /// Removal timers need a tokio runtime to run on
    #[error("No tokio runtime available - create the toaster from within a runtime or pass a handle")]
    NoRuntime,

    /// A store configuration value is out of range
    #[error("Invalid store configuration for '{key}': {message}")]
    InvalidConfig { key: String, message: String },
}

impl ToastError {
    /// Create an invalid configuration error
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }
}
