//! Sync orchestration and batch processing
//!
//! This module provides the pipeline for one sync run:
//! - Extraction of selectable rows
//! - Batch accumulation
//! - Status reconciliation
//! - Orchestration and the run result

pub mod batch;
pub mod coordinator;
pub mod extract;
pub mod reconcile;
pub mod summary;

pub use batch::{Batch, BatchAccumulator};
pub use coordinator::{SyncOrchestrator, SyncSettings};
pub use extract::Extractor;
pub use reconcile::StatusReconciler;
pub use summary::{RunResult, RunTally};
