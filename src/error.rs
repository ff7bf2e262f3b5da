//! Error taxonomy for the registry core.
//!
//! Callers branch on these variants: validation and not-found errors are
//! relayed as user-facing failures, `StoreCorrupt` aborts startup, and
//! `Durability` fails the triggering write while the store's visible state
//! stays exactly as it was before the attempt.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// A malformed or missing required input field. `field` names every
    /// offending field, comma-separated.
    #[error("invalid record: {reason} ({field})")]
    Validation { field: String, reason: String },

    /// Lookup miss; signals absence, not failure.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The backing file exists but could not be read or parsed at load
    /// time. Fatal at startup; the store must not silently come up empty
    /// when data actually exists.
    #[error("document store at {path} is corrupt: {reason}")]
    StoreCorrupt { path: PathBuf, reason: String },

    /// The atomic file swap could not complete. The triggering put fails
    /// and no in-memory change is published.
    #[error("failed to persist document store: {reason}")]
    Durability { reason: String },
}

impl RegistryError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RegistryError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
