//! External system integrations for rxsync.
//!
//! This module provides adapters for the systems a sync run talks to:
//!
//! - [`store`] - Source store abstraction (trait-based)
//! - [`postgresql`] - PostgreSQL implementation of the source store
//! - [`http`] - Downstream endpoint senders
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind [`store::DispenseStore`] and
//! [`http::BatchSender`], so the pipeline can be driven by in-memory
//! implementations in tests.
//!
//! ```rust,no_run
//! use rxsync::adapters::http::HttpSender;
//! use rxsync::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
//! use rxsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rxsync.toml")?;
//!
//! let store = PostgreSQLAdapter::new(PostgreSQLClient::new(config.source.clone())?)?;
//! let sender = HttpSender::new(&config.destination)?;
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod postgresql;
pub mod store;
