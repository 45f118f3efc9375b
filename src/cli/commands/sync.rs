//! Sync command implementation
//!
//! This module implements the `sync` command: one pipeline run for a date,
//! or a polling loop with `--watch`.

use super::resolve_target;
use crate::cli::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK, EXIT_PARTIAL};
use crate::config::load_config;
use crate::core::sync::{RunResult, SyncOrchestrator};
use clap::Args;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Record date to sync (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,

    /// Dry run mode - log batches instead of sending, write no status
    #[arg(long)]
    pub dry_run: bool,

    /// Keep running, one sync every `sync.poll_interval_seconds`
    #[arg(long)]
    pub watch: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        mut shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let date_format = config.sync.date_format.clone();
        let poll_interval = Duration::from_secs(config.sync.poll_interval_seconds);

        // Reject a bad --date before touching the store
        if let Err(e) = resolve_target(self.date.as_deref(), &date_format) {
            eprintln!("{e}");
            return Ok(EXIT_CONFIG);
        }

        let orchestrator = match SyncOrchestrator::from_config(&config, self.dry_run) {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sync orchestrator");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = orchestrator.store().test_connection().await {
            tracing::error!(error = %e, "Source store is unreachable");
            eprintln!("Failed to connect to source store: {e}");
            return Ok(EXIT_CONNECTION);
        }

        if orchestrator.settings().dry_run {
            println!("🔍 DRY RUN MODE - No batches will be sent and no status will be written");
            println!();
        }

        if !self.watch {
            let target = resolve_target(self.date.as_deref(), &date_format)
                .map_err(anyhow::Error::msg)?;
            println!("🚀 Syncing dispense records for {target}...");
            let result = orchestrator.run(&target).await;
            print_summary(&result);
            return Ok(exit_code(&result));
        }

        tracing::info!(
            poll_interval_secs = poll_interval.as_secs(),
            "Watch mode enabled"
        );

        loop {
            if *shutdown_signal.borrow() {
                break;
            }

            // Today is re-evaluated every cycle
            let target = resolve_target(self.date.as_deref(), &date_format)
                .map_err(anyhow::Error::msg)?;
            let result = orchestrator.run(&target).await;
            print_summary(&result);

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                changed = shutdown_signal.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        println!("⚠️  Watch loop stopped by shutdown signal.");
        tracing::info!("Sync watch interrupted by user signal");
        Ok(EXIT_INTERRUPTED)
    }
}

/// Exit code for a finished run
pub fn exit_code(result: &RunResult) -> i32 {
    if !result.errors().is_empty() {
        EXIT_FATAL
    } else if result.failed_count() > 0 {
        EXIT_PARTIAL
    } else {
        EXIT_OK
    }
}

fn print_summary(result: &RunResult) {
    result.log_summary();

    println!();
    println!("📊 Sync Summary ({}):", result.target_date());
    println!("  Delivered: {}", result.success_count());
    println!("  Failed: {}", result.failed_count());
    println!("  Batches: {}", result.batches_dispatched());
    println!("  Duration: {:.2}s", result.duration().as_secs_f64());
    println!("  Success Rate: {:.2}%", result.success_rate());
    println!();

    if !result.errors().is_empty() {
        println!("⚠️  Errors encountered:");
        for error in result.errors() {
            println!("  - {error}");
        }
        println!();
    }

    if result.is_successful() {
        println!("✅ Sync completed successfully!");
    } else if result.errors().is_empty() {
        println!("⚠️  Sync completed with failures");
    } else {
        println!("❌ Sync aborted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::RunTally;
    use crate::domain::TargetDate;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn tally() -> RunTally {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        RunTally::new(Uuid::new_v4(), TargetDate::new(date, "%Y-%m-%d"))
    }

    #[test]
    fn test_sync_args_defaults() {
        let args = SyncArgs {
            date: None,
            dry_run: false,
            watch: false,
        };

        assert!(args.date.is_none());
        assert!(!args.dry_run);
        assert!(!args.watch);
    }

    #[test]
    fn test_exit_code_clean_run() {
        let mut t = tally();
        t.delivered(10);
        assert_eq!(exit_code(&t.finish(Duration::ZERO)), EXIT_OK);
    }

    #[test]
    fn test_exit_code_partial_failure() {
        let mut t = tally();
        t.delivered(10);
        t.failed(1);
        assert_eq!(exit_code(&t.finish(Duration::ZERO)), EXIT_PARTIAL);
    }

    #[test]
    fn test_exit_code_aborted_run() {
        let mut t = tally();
        t.add_error("Store error: Connection failed: refused");
        assert_eq!(exit_code(&t.finish(Duration::ZERO)), EXIT_FATAL);
    }

    #[tokio::test]
    async fn test_missing_config_is_config_error() {
        let (_tx, rx) = watch::channel(false);
        let args = SyncArgs {
            date: None,
            dry_run: true,
            watch: false,
        };

        let code = args.execute("/nonexistent/rxsync.toml", rx).await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
