//! Result type alias for rxsync

use super::errors::RxSyncError;

/// Result type alias for rxsync operations
///
/// # Examples
///
/// ```
/// use rxsync::domain::result::Result;
/// use rxsync::domain::errors::RxSyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RxSyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RxSyncError>;
