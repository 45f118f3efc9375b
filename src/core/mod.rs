//! Core business logic for rxsync.
//!
//! # Modules
//!
//! - [`mapping`] - Pure row-to-record field mapping
//! - [`sync`] - Extraction, batching, reconciliation and orchestration
//!
//! # Sync Workflow
//!
//! 1. **Lock** (optional): take the per-date run lock
//! 2. **Extract**: stream Pending rows for the target date
//! 3. **Map**: normalize each row; unmappable rows are counted failed
//! 4. **Batch**: group records up to `sync.batch_size`
//! 5. **Send**: POST each full batch, in order, one at a time
//! 6. **Reconcile**: write Delivered or Failed back for the batch keys
//! 7. **Report**: return a [`sync::RunResult`]
//!
//! # Example
//!
//! ```rust,no_run
//! use rxsync::config::load_config;
//! use rxsync::core::sync::SyncOrchestrator;
//! use rxsync::domain::TargetDate;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rxsync.toml")?;
//! let orchestrator = SyncOrchestrator::from_config(&config, false)?;
//!
//! let target = TargetDate::today(&config.sync.date_format);
//! let result = orchestrator.run(&target).await;
//!
//! println!("Delivered: {}", result.success_count());
//! println!("Failed: {}", result.failed_count());
//! # Ok(())
//! # }
//! ```

pub mod mapping;
pub mod sync;
