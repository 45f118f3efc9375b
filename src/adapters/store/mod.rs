//! Source store abstraction layer
//!
//! The pipeline only sees [`DispenseStore`]; the PostgreSQL implementation
//! lives in [`crate::adapters::postgresql`].

pub mod traits;

pub use traits::{DispenseStore, SourceRowStream, StatusCounts};
