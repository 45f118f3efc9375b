//! Status command implementation
//!
//! This module implements the `status` command for displaying row counts
//! per delivery status for one record date.

use super::resolve_target;
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::{DispenseStore, StatusCounts};
use crate::cli::{EXIT_CONFIG, EXIT_CONNECTION, EXIT_FATAL, EXIT_OK};
use crate::config::load_config;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Record date to inspect (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub date: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking delivery status");

        println!("📊 Delivery Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let target = match resolve_target(self.date.as_deref(), &config.sync.date_format) {
            Ok(t) => t,
            Err(e) => {
                println!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match PostgreSQLClient::new(config.source.clone())
            .and_then(PostgreSQLAdapter::new)
        {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to configure source store");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = store.test_connection().await {
            println!("❌ Failed to connect to database");
            println!("   Error: {e}");
            return Ok(EXIT_CONNECTION);
        }

        let counts = match store.status_counts(&target).await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load status counts");
                println!("   Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("Table: {}", config.source.table);
        println!("Date:  {target} (prefix '{}')", target.prefix());
        println!();
        print!("{}", render_counts(&counts));
        println!();
        Ok(EXIT_OK)
    }
}

/// Formats counts as a two-column table
fn render_counts(counts: &StatusCounts) -> String {
    let rows = [
        ("⏸️  Pending", counts.pending),
        ("✅ Delivered", counts.delivered),
        ("❌ Failed", counts.failed),
        ("🔄 Retry Eligible", counts.retry_eligible),
        ("❓ Unknown", counts.unknown),
    ];

    let mut out = format!("{:<20} {:>10}\n", "Status", "Rows");
    out.push_str(&"-".repeat(31));
    out.push('\n');
    for (label, count) in rows {
        out.push_str(&format!("{label:<20} {count:>10}\n"));
    }
    out.push_str(&"-".repeat(31));
    out.push('\n');
    out.push_str(&format!("{:<20} {:>10}\n", "Total", counts.total()));
    out
}
