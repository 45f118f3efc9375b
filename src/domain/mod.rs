//! Domain models and types for rxsync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Row and record models** ([`SourceRow`], [`NormalizedRecord`], [`BatchKey`])
//! - **Delivery status** ([`DeliveryStatus`], [`FailurePolicy`]) with the legacy code mapping
//! - **Run scoping** ([`TargetDate`])
//! - **Error types** ([`RxSyncError`], [`StoreError`], [`MappingError`])
//! - **Result type alias** ([`Result`])
//!
//! # Status codes
//!
//! ```rust
//! use rxsync::domain::DeliveryStatus;
//!
//! assert_eq!(DeliveryStatus::Delivered.code(), Some("1"));
//! assert_eq!(DeliveryStatus::Failed.code(), Some("3"));
//! assert_eq!(DeliveryStatus::Pending.code(), None);
//! ```

pub mod errors;
pub mod record;
pub mod result;
pub mod status;
pub mod target;

// Re-export commonly used types for convenience
pub use errors::{MappingError, RxSyncError, StoreError};
pub use record::{BatchKey, NormalizedRecord, SourceRow};
pub use result::Result;
pub use status::{DeliveryStatus, FailurePolicy};
pub use target::TargetDate;
