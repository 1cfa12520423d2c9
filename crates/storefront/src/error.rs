//! Unified error handling.
//!
//! Provides a unified `StoreError` type for the operations a caller can act
//! on. The page-facing surface (button clicks, badge refresh, cart writes)
//! logs and swallows instead of propagating; see [`StoreError::report`].

use oplung_core::ItemError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the cart store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A cart item was rejected.
    #[error("Invalid item: {0}")]
    InvalidItem(#[from] ItemError),

    /// A value passed in from the page was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The page environment is missing something the store needs.
    #[error("Environment error: {0}")]
    Environment(String),
}

impl StoreError {
    /// Log the error at a level matching its severity.
    ///
    /// Bad input from the page is a warning; broken environment or
    /// configuration is an error.
    pub fn report(&self) {
        match self {
            Self::InvalidItem(_) | Self::Json(_) => {
                tracing::warn!(error = %self, "Rejected input");
            }
            Self::Storage(StorageError::Unavailable) => {
                tracing::debug!(error = %self, "Storage unavailable");
            }
            Self::Storage(_) | Self::Config(_) | Self::Environment(_) => {
                tracing::error!(error = %self, "Store error");
            }
        }
    }
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Settle a page-facing call: report the error and use `fallback` instead.
///
/// Calls from page scripts never throw; a rejected call leaves the cart as
/// it was and logs why.
pub fn or_report<T>(result: Result<T>, fallback: impl FnOnce() -> T) -> T {
    result.unwrap_or_else(|e| {
        e.report();
        fallback()
    })
}
