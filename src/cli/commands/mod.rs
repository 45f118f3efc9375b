//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod status;
pub mod sync;
pub mod validate;

use crate::domain::TargetDate;

/// Resolves the `--date` argument, defaulting to today in local time
pub(crate) fn resolve_target(date: Option<&str>, date_format: &str) -> Result<TargetDate, String> {
    match date {
        Some(value) => TargetDate::parse_iso(value, date_format),
        None => Ok(TargetDate::today(date_format)),
    }
}
