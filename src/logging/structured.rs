//! Subscriber setup for rxsync
//!
//! Human-readable events go to stderr so that command output on stdout stays
//! clean. With `logging.local_enabled` the same events are also written as
//! JSON lines to `rxsync.log` under `logging.local_path`, rolled over daily
//! or hourly.

use crate::config::LoggingConfig;
use crate::domain::{Result, RxSyncError};
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// File name prefix of the JSON log; the appender adds the period suffix
pub const LOG_FILE_NAME: &str = "rxsync.log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the background log writer alive
///
/// Buffered file events are flushed when this is dropped, so hold it until
/// the process is about to exit.
#[must_use]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
}

impl FromStr for LogRotation {
    type Err = RxSyncError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "daily" => Ok(LogRotation::Daily),
            "hourly" => Ok(LogRotation::Hourly),
            other => Err(RxSyncError::Configuration(format!(
                "Invalid logging.local_rotation '{other}'. Must be one of: daily, hourly"
            ))),
        }
    }
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
        }
    }
}

/// Installs the global subscriber
///
/// `RUST_LOG` replaces the `rxsync=<level>` filter when it is set.
///
/// # Errors
///
/// Returns a configuration error if the level or rotation is unknown, the
/// log directory cannot be created, or a subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use rxsync::logging::init_logging;
/// use rxsync::config::LoggingConfig;
///
/// let _guard = init_logging("info", &LoggingConfig::default())?;
/// # Ok::<(), rxsync::domain::RxSyncError>(())
/// ```
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer> = vec![console_layer(level_filter(level)?)];

    let file = if config.local_enabled {
        let (layer, guard) = file_layer(config, level_filter(level)?)?;
        layers.push(layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| RxSyncError::Configuration(format!("Logging already initialized: {e}")))?;

    tracing::debug!(
        log_level = level,
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard { _file: file })
}

/// Filter for rxsync events at `level`, unless `RUST_LOG` says otherwise
fn level_filter(level: &str) -> Result<EnvFilter> {
    let parsed = Level::from_str(level.trim()).map_err(|_| {
        RxSyncError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: trace, debug, info, warn, error"
        ))
    })?;
    let directive = format!("rxsync={}", parsed.as_str().to_ascii_lowercase());
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)))
}

fn console_layer(filter: EnvFilter) -> BoxedLayer {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter)
        .boxed()
}

fn file_layer(config: &LoggingConfig, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard)> {
    let rotation: LogRotation = config.local_rotation.parse()?;

    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        RxSyncError::Configuration(format!(
            "Failed to create log directory {}: {}",
            config.local_path, e
        ))
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation.into())
        .filename_prefix(LOG_FILE_NAME)
        .build(&config.local_path)
        .map_err(|e| {
            RxSyncError::Configuration(format!(
                "Failed to open log file in {}: {}",
                config.local_path, e
            ))
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();

    Ok((layer, guard))
}
