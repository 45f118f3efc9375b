//! Domain error types
//!
//! This module defines the error hierarchy for rxsync. Errors are grouped by
//! the scope they affect: store errors can be run-fatal, mapping errors are
//! per-row, and nothing here exposes third-party driver types.

use super::record::BatchKey;
use thiserror::Error;

/// Main rxsync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum RxSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Row mapping errors
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Downstream delivery errors raised outside of a batch send
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RxSyncError {
    /// Whether this error should abort the current run
    ///
    /// Only connectivity-class store failures are run-fatal. Everything else
    /// is recovered at row or batch level.
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, RxSyncError::Store(e) if e.is_connectivity())
    }
}

/// Source store errors
///
/// Errors that occur when talking to the relational store holding the
/// dispense rows. These errors don't expose `tokio-postgres` types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to obtain a connection
    #[error("Failed to connect to source store: {0}")]
    ConnectionFailed(String),

    /// Selection query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A store operation exceeded its time budget
    #[error("Store operation timed out: {0}")]
    Timeout(String),

    /// Bulk status update failed
    #[error("Status update failed: {0}")]
    UpdateFailed(String),

    /// Another process holds the run lock for this date
    #[error("Run lock unavailable: {0}")]
    LockUnavailable(String),
}

impl StoreError {
    /// Connectivity-class errors abort the run
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectionFailed(_) | StoreError::QueryFailed(_) | StoreError::Timeout(_)
        )
    }
}

/// Per-row mapping failures
///
/// A mapping failure skips only the offending row. When enough of the row
/// survived to address it in the store, [`MappingError::salvaged_key`]
/// returns the key so the row can be marked failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The row has no prescription number
    #[error("Row has no rx_no (rx_date: {})", record_date.as_deref().unwrap_or("<none>"))]
    MissingIdentifier {
        /// Record date, if present
        record_date: Option<String>,
    },

    /// The row has no record date
    #[error("Row {rx_no} has no rx_date")]
    MissingRecordDate {
        /// Prescription number
        rx_no: String,
    },

    /// The record date does not start with a calendar date
    #[error("Row {rx_no} has an unparseable rx_date '{value}'")]
    InvalidRecordDate {
        /// Prescription number
        rx_no: String,
        /// Line number, when present
        seq_no: Option<String>,
        /// Raw record date
        value: String,
    },

    /// One or more columns could not be read from the store row
    #[error("Row could not be decoded: {}", detail.join("; "))]
    ColumnDecode {
        /// Per-column decode messages
        detail: Vec<String>,
        /// Key, when rx_no and rx_date were readable
        key: Option<BatchKey>,
    },
}

impl MappingError {
    /// Returns the key of the failed row when it can still be addressed
    pub fn salvaged_key(&self) -> Option<BatchKey> {
        match self {
            MappingError::MissingIdentifier { .. } | MappingError::MissingRecordDate { .. } => {
                None
            }
            MappingError::InvalidRecordDate {
                rx_no,
                seq_no,
                value,
            } => Some(BatchKey::new(rx_no.clone(), seq_no.as_deref(), value.clone())),
            MappingError::ColumnDecode { key, .. } => key.clone(),
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for RxSyncError {
    fn from(err: std::io::Error) -> Self {
        RxSyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RxSyncError {
    fn from(err: serde_json::Error) -> Self {
        RxSyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RxSyncError {
    fn from(err: toml::de::Error) -> Self {
        RxSyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
