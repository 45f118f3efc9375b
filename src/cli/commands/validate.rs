//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the rxsync configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// [`load_config`] already validates, so any load failure is reported
    /// as a configuration error.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Source: {}",
            config
                .source
                .connection_string
                .expose_secret()
                .as_ref()
                .rsplit('@')
                .next()
                .unwrap_or("***")
        );
        println!("  Source Table: {}", config.source.table);
        println!("  Max Connections: {}", config.source.max_connections);
        println!("  SSL Mode: {}", config.source.ssl_mode);
        println!("  Destination: {}", config.destination.endpoint);
        println!(
            "  Destination Auth: {}",
            if config.destination.auth_token.is_some() {
                "bearer token"
            } else {
                "none"
            }
        );
        println!("  Batch Size: {}", config.sync.batch_size);
        println!("  Max Rows: {}", config.sync.max_rows);
        println!("  Date Format: {}", config.sync.date_format);
        println!("  Failure Policy: {:?}", config.sync.failure_policy);
        println!("  Exclusive Run: {}", config.sync.exclusive_run);
        println!("  Poll Interval: {}s", config.sync.poll_interval_seconds);
        println!();
        Ok(EXIT_OK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[source]
connection_string = "postgresql://rx:pw@db.local:5432/pharmacy"

[destination]
endpoint = "https://dispense.example.com/api/batches"
"#,
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_OK);
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[source]
connection_string = "postgresql://rx:pw@db.local:5432/pharmacy"

[destination]
endpoint = "https://dispense.example.com/api/batches"

[sync]
batch_size = 0
"#,
        )
        .unwrap();

        let code = ValidateArgs {}
            .execute(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
