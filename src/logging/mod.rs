//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output on stderr for operators
//! - JSON-formatted local log files with rotation
//! - `RUST_LOG` filter overrides
//!
//! # Example
//!
//! ```no_run
//! use rxsync::logging::init_logging;
//! use rxsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LogRotation, LoggingGuard, LOG_FILE_NAME};

/// Log the start of a sync run
///
/// # Example
///
/// ```no_run
/// use rxsync::log_run_start;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_run_start!(run_id, "2025-03-01", 100);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $target_date:expr, $batch_size:expr) => {
        tracing::info!(
            run_id = %$run_id,
            target_date = %$target_date,
            batch_size = $batch_size,
            "Starting sync run"
        );
    };
}

/// Log the completion of a sync run
///
/// # Example
///
/// ```no_run
/// use rxsync::log_run_complete;
/// use std::time::Duration;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_run_complete!(run_id, 250, 0, Duration::from_secs(3));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $success:expr, $failed:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            success = $success,
            failed = $failed,
            duration_ms = $duration.as_millis() as u64,
            "Sync run completed"
        );
    };
}

/// Log the classified outcome of one dispatched batch
///
/// # Example
///
/// ```no_run
/// use rxsync::log_batch_outcome;
///
/// let run_id = uuid::Uuid::new_v4();
/// log_batch_outcome!(run_id, 2, 100, "delivered");
/// ```
#[macro_export]
macro_rules! log_batch_outcome {
    ($run_id:expr, $batch_no:expr, $records:expr, $status:expr) => {
        tracing::info!(
            run_id = %$run_id,
            batch_no = $batch_no,
            records = $records,
            status = %$status,
            "Batch dispatched"
        );
    };
}
