//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{Environment, RxSyncConfig};
use super::secret::secret_string;
use crate::domain::errors::RxSyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RxSyncConfig
/// 4. Applies environment variable overrides (RXSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`RxSyncError::Configuration`] if the file is missing or
/// unreadable, a referenced environment variable is unset, the TOML is
/// malformed, or validation fails.
///
/// # Examples
///
/// ```no_run
/// use rxsync::config::loader::load_config;
///
/// let config = load_config("rxsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RxSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RxSyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RxSyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: RxSyncConfig = toml::from_str(&contents)
        .map_err(|e| RxSyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RxSyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .unwrap_or_else(|e| panic!("placeholder pattern: {e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let processed = re.replace_all(line, |cap: &regex::Captures<'_>| {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => value,
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                    String::new()
                }
            }
        });
        result.push_str(&processed);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RxSyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Parses an override value, reporting which variable was malformed
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RxSyncError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using RXSYNC_* prefix
///
/// Environment variables follow the pattern: RXSYNC_<SECTION>_<KEY>
/// For example: RXSYNC_SOURCE_TABLE, RXSYNC_SYNC_BATCH_SIZE
fn apply_env_overrides(config: &mut RxSyncConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("RXSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Some(val) = var("RXSYNC_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_override("RXSYNC_APPLICATION_DRY_RUN", &val)?;
    }
    if let Some(val) = var("RXSYNC_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => Environment::Development,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            _ => {
                return Err(RxSyncError::Configuration(format!(
                    "Invalid value '{val}' for RXSYNC_ENVIRONMENT"
                )))
            }
        };
    }

    // Source overrides
    if let Some(val) = var("RXSYNC_SOURCE_CONNECTION_STRING") {
        config.source.connection_string = secret_string(val);
    }
    if let Some(val) = var("RXSYNC_SOURCE_TABLE") {
        config.source.table = val;
    }
    if let Some(val) = var("RXSYNC_SOURCE_MAX_CONNECTIONS") {
        config.source.max_connections = parse_override("RXSYNC_SOURCE_MAX_CONNECTIONS", &val)?;
    }
    if let Some(val) = var("RXSYNC_SOURCE_SSL_MODE") {
        config.source.ssl_mode = val;
    }
    if let Some(val) = var("RXSYNC_SOURCE_TLS_VERIFY") {
        config.source.tls_verify = parse_override("RXSYNC_SOURCE_TLS_VERIFY", &val)?;
    }

    // Destination overrides
    if let Some(val) = var("RXSYNC_DESTINATION_ENDPOINT") {
        config.destination.endpoint = val;
    }
    if let Some(val) = var("RXSYNC_DESTINATION_TIMEOUT_SECONDS") {
        config.destination.timeout_seconds =
            parse_override("RXSYNC_DESTINATION_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("RXSYNC_DESTINATION_TLS_VERIFY") {
        config.destination.tls_verify = parse_override("RXSYNC_DESTINATION_TLS_VERIFY", &val)?;
    }
    if let Some(val) = var("RXSYNC_DESTINATION_AUTH_TOKEN") {
        config.destination.auth_token = Some(secret_string(val));
    }

    // Sync overrides
    if let Some(val) = var("RXSYNC_SYNC_BATCH_SIZE") {
        config.sync.batch_size = parse_override("RXSYNC_SYNC_BATCH_SIZE", &val)?;
    }
    if let Some(val) = var("RXSYNC_SYNC_MAX_ROWS") {
        config.sync.max_rows = parse_override("RXSYNC_SYNC_MAX_ROWS", &val)?;
    }
    if let Some(val) = var("RXSYNC_SYNC_FAILURE_POLICY") {
        config.sync.failure_policy = val
            .parse()
            .map_err(|e: String| RxSyncError::Configuration(e))?;
    }
    if let Some(val) = var("RXSYNC_SYNC_EXCLUSIVE_RUN") {
        config.sync.exclusive_run = parse_override("RXSYNC_SYNC_EXCLUSIVE_RUN", &val)?;
    }
    if let Some(val) = var("RXSYNC_SYNC_POLL_INTERVAL_SECONDS") {
        config.sync.poll_interval_seconds =
            parse_override("RXSYNC_SYNC_POLL_INTERVAL_SECONDS", &val)?;
    }

    // Logging overrides
    if let Some(val) = var("RXSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("RXSYNC_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = var("RXSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
