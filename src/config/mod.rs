//! Configuration management for rxsync.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! rxsync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `RXSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use rxsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("rxsync.toml")?;
//!
//! println!("Source table: {}", config.source.table);
//! println!("Endpoint: {}", config.destination.endpoint);
//! println!("Batch size: {}", config.sync.batch_size);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry-run switch
//! - [`SourceConfig`] - PostgreSQL connection, table and timeouts
//! - [`DestinationConfig`] - Endpoint URL, timeout and bearer token
//! - [`SyncConfig`] - Batch size, row cap, date format and failure policy
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [source]
//! connection_string = "${RXSYNC_SOURCE_DSN}"
//! table = "dispense_rx"
//!
//! [destination]
//! endpoint = "https://cabinet.example.com/api/dispense"
//! auth_token = "${RXSYNC_CABINET_TOKEN}"
//!
//! [sync]
//! batch_size = 100
//! failure_policy = "terminal"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, DestinationConfig, Environment, LoggingConfig, RxSyncConfig, SourceConfig,
    SyncConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
