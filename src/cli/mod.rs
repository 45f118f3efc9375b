//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for rxsync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Exit code for a clean run
pub const EXIT_OK: i32 = 0;
/// Exit code when some records failed
pub const EXIT_PARTIAL: i32 = 1;
/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when a store or endpoint cannot be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code for any other fatal error
pub const EXIT_FATAL: i32 = 5;
/// Exit code after SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// rxsync - Pharmacy dispense sync
#[derive(Parser, Debug)]
#[command(name = "rxsync")]
#[command(version, about, long_about = None)]
#[command(author = "rxsync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rxsync.toml", env = "RXSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RXSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send pending dispense records downstream and write back their status
    Sync(commands::sync::SyncArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show row counts per delivery status for a date
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
