// rxsync - Pharmacy dispense sync
// Copyright (c) 2025 rxsync Contributors
// Licensed under the MIT License

//! # rxsync - Pharmacy dispense sync
//!
//! rxsync moves pending dispense lines from a PostgreSQL table to a
//! downstream HTTP endpoint and writes the delivery outcome back to the
//! source rows.
//!
//! ## Overview
//!
//! One run:
//! - **Extracts** rows of one record date whose status is pending
//! - **Maps** each row into a normalized record (dates joined, carrier
//!   fields split, codes decoded, empty text dropped)
//! - **Batches** records up to a configured size
//! - **Sends** each batch as one JSON POST
//! - **Reconciles** the delivered/failed status of every row in the batch
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Mapping and the sync pipeline
//! - [`adapters`] - Source store and downstream endpoint
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rxsync::config::load_config;
//! use rxsync::core::sync::SyncOrchestrator;
//! use rxsync::domain::TargetDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("rxsync.toml")?;
//!     let orchestrator = SyncOrchestrator::from_config(&config, false)?;
//!
//!     let target = TargetDate::today(&config.sync.date_format);
//!     let result = orchestrator.run(&target).await;
//!
//!     println!(
//!         "Delivered {}, failed {}",
//!         result.success_count(),
//!         result.failed_count()
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], backed by
//! [`domain::RxSyncError`]. A run itself never fails: per-row and per-batch
//! problems are counted, run-fatal ones land in [`core::sync::RunResult::errors`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
