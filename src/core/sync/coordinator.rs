//! Sync orchestrator - drives one extract, map, batch, send, reconcile run
//!
//! A run is strictly sequential: one extraction stream, one batch in flight,
//! batches dispatched in extraction order. Every run ends in a [`RunResult`];
//! only a failed extraction or a refused run lock cuts it short.

use crate::adapters::http::{BatchSender, DryRunSender, HttpSender, SendOutcome};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::store::DispenseStore;
use crate::config::RxSyncConfig;
use crate::core::mapping::FieldMapper;
use crate::core::sync::batch::{Batch, BatchAccumulator};
use crate::core::sync::extract::Extractor;
use crate::core::sync::reconcile::StatusReconciler;
use crate::core::sync::summary::{RunResult, RunTally};
use crate::domain::{BatchKey, DeliveryStatus, FailurePolicy, Result, TargetDate};
use crate::{log_batch_outcome, log_run_complete, log_run_start};
use futures::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Tunables for a run
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Maximum records per batch
    pub batch_size: usize,
    /// Maximum rows extracted per run
    pub max_rows: usize,
    /// chrono format of the record-date prefix
    pub date_format: String,
    /// Status written for failed rows
    pub failure_policy: FailurePolicy,
    /// Take the per-date run lock before extracting
    pub exclusive_run: bool,
    /// Time budget for starting the selection and for each row fetch
    pub fetch_timeout: Duration,
    /// Skip status writes
    pub dry_run: bool,
}

impl SyncSettings {
    /// Settings from a loaded configuration
    ///
    /// `dry_run` is forced on when the configuration already enables it.
    pub fn from_config(config: &RxSyncConfig, dry_run: bool) -> Self {
        Self {
            batch_size: config.sync.batch_size,
            max_rows: config.sync.max_rows,
            date_format: config.sync.date_format.clone(),
            failure_policy: config.sync.failure_policy,
            exclusive_run: config.sync.exclusive_run,
            fetch_timeout: Duration::from_secs(config.source.statement_timeout_seconds),
            dry_run: dry_run || config.application.dry_run,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_rows: 5000,
            date_format: "%Y-%m-%d".to_string(),
            failure_policy: FailurePolicy::Terminal,
            exclusive_run: true,
            fetch_timeout: Duration::from_secs(30),
            dry_run: false,
        }
    }
}

/// Sync orchestrator
pub struct SyncOrchestrator {
    store: Arc<dyn DispenseStore>,
    sender: Arc<dyn BatchSender>,
    extractor: Extractor,
    mapper: FieldMapper,
    reconciler: StatusReconciler,
    settings: SyncSettings,
}

impl SyncOrchestrator {
    /// Create an orchestrator over an existing store and sender
    pub fn new(
        store: Arc<dyn DispenseStore>,
        sender: Arc<dyn BatchSender>,
        settings: SyncSettings,
    ) -> Self {
        let extractor = Extractor::new(
            store.clone(),
            settings.max_rows,
            settings.fetch_timeout,
            settings.failure_policy,
        );
        let reconciler = StatusReconciler::new(store.clone(), settings.dry_run);
        let mapper = FieldMapper::new(settings.date_format.clone());

        Self {
            store,
            sender,
            extractor,
            mapper,
            reconciler,
            settings,
        }
    }

    /// Create an orchestrator backed by PostgreSQL and the HTTP endpoint
    ///
    /// In dry-run mode the HTTP sender is replaced by [`DryRunSender`].
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the store client or HTTP client
    /// cannot be built. No connection is opened here.
    pub fn from_config(config: &RxSyncConfig, dry_run: bool) -> Result<Self> {
        let settings = SyncSettings::from_config(config, dry_run);

        let client = PostgreSQLClient::new(config.source.clone())?;
        let store: Arc<dyn DispenseStore> = Arc::new(PostgreSQLAdapter::new(client)?);

        let sender: Arc<dyn BatchSender> = if settings.dry_run {
            tracing::info!("Dry run enabled: batches are logged, not sent");
            Arc::new(DryRunSender)
        } else {
            Arc::new(HttpSender::new(&config.destination)?)
        };

        Ok(Self::new(store, sender, settings))
    }

    /// The store this orchestrator reads from
    pub fn store(&self) -> &Arc<dyn DispenseStore> {
        &self.store
    }

    /// Run settings
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Execute one run for `target`
    ///
    /// Never fails: every error is either folded into the counters or
    /// reported in [`RunResult::errors`].
    pub async fn run(&self, target: &TargetDate) -> RunResult {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4();
        let mut tally = RunTally::new(run_id, target.clone());

        log_run_start!(run_id, target, self.settings.batch_size);

        let locked = if self.settings.exclusive_run {
            match self.store.try_acquire_run_lock(target).await {
                Ok(true) => true,
                Ok(false) => {
                    tracing::warn!(
                        run_id = %run_id,
                        target_date = %target,
                        "Another run holds the lock for this date, skipping"
                    );
                    tally.add_error(format!(
                        "Run lock for {target} is held by another process"
                    ));
                    return tally.finish(start_time.elapsed());
                }
                Err(e) => {
                    tracing::error!(run_id = %run_id, error = %e, "Failed to acquire run lock");
                    tally.add_error(e.to_string());
                    return tally.finish(start_time.elapsed());
                }
            }
        } else {
            false
        };

        self.pipeline(run_id, target, &mut tally).await;

        if locked {
            if let Err(e) = self.store.release_run_lock(target).await {
                tracing::warn!(run_id = %run_id, error = %e, "Failed to release run lock");
            }
        }

        let result = tally.finish(start_time.elapsed());
        log_run_complete!(
            run_id,
            result.success_count(),
            result.failed_count(),
            result.duration()
        );
        result
    }

    async fn pipeline(&self, run_id: Uuid, target: &TargetDate, tally: &mut RunTally) {
        let mut rows = match self.extractor.extract(target).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(run_id = %run_id, error = %e, "Extraction failed");
                tally.add_error(e.to_string());
                return;
            }
        };

        let mut accumulator = BatchAccumulator::new(self.settings.batch_size);

        while let Some(item) = rows.next().await {
            let row = match item {
                Ok(row) => row,
                Err(e) => {
                    tracing::error!(
                        run_id = %run_id,
                        error = %e,
                        left_pending = accumulator.len(),
                        "Extraction failed mid-stream"
                    );
                    tally.add_error(e.to_string());
                    return;
                }
            };

            match self.mapper.map(&row) {
                Ok(record) => {
                    let key = BatchKey::new(
                        record.rx_no.clone(),
                        row.seq_no.as_deref(),
                        record.rx_date.clone(),
                    );
                    accumulator.add(record, key);
                    if accumulator.is_full() {
                        self.dispatch(run_id, target, accumulator.drain(), tally)
                            .await;
                    }
                }
                Err(e) => {
                    tally.failed(1);
                    tracing::warn!(run_id = %run_id, error = %e, "Skipping unmappable row");
                    if let Some(key) = e.salvaged_key() {
                        self.reconciler
                            .reconcile(
                                &[key],
                                target,
                                self.settings.failure_policy.failed_status(),
                            )
                            .await;
                    }
                }
            }
        }

        if !accumulator.is_empty() {
            self.dispatch(run_id, target, accumulator.drain(), tally)
                .await;
        }
    }

    async fn dispatch(&self, run_id: Uuid, target: &TargetDate, batch: Batch, tally: &mut RunTally) {
        let batch_no = tally.batch_dispatched();
        let outcome = self.sender.send(&batch).await;

        let status = match &outcome {
            SendOutcome::Delivered { .. } => {
                tally.delivered(batch.len());
                DeliveryStatus::Delivered
            }
            SendOutcome::Rejected { status, body } => {
                tracing::warn!(
                    run_id = %run_id,
                    batch_no,
                    http_status = status,
                    body = %body,
                    "Batch rejected by endpoint"
                );
                tally.failed(batch.len());
                self.settings.failure_policy.failed_status()
            }
            SendOutcome::TransportFailure(cause) => {
                tracing::warn!(
                    run_id = %run_id,
                    batch_no,
                    cause = %cause,
                    "Batch could not be delivered"
                );
                tally.failed(batch.len());
                self.settings.failure_policy.failed_status()
            }
        };

        log_batch_outcome!(run_id, batch_no, batch.len(), status);

        self.reconciler
            .reconcile(batch.keys(), target, status)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_settings_from_config() {
        let toml_content = r#"
[application]
dry_run = true

[source]
connection_string = "postgresql://rx:pw@localhost:5432/pharmacy"
statement_timeout_seconds = 12

[destination]
endpoint = "http://localhost:9000/dispense"

[sync]
batch_size = 25
failure_policy = "retry"
"#;
        let mut config: RxSyncConfig = toml::from_str(toml_content).unwrap();

        let settings = SyncSettings::from_config(&config, false);
        assert_eq!(settings.batch_size, 25);
        assert_eq!(settings.failure_policy, FailurePolicy::Retry);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(12));
        assert!(settings.dry_run);

        config.application.dry_run = false;
        assert!(!SyncSettings::from_config(&config, false).dry_run);
        assert!(SyncSettings::from_config(&config, true).dry_run);

        config.source.connection_string = secret_string("not a dsn".to_string());
        assert!(SyncOrchestrator::from_config(&config, false).is_err());
    }
}
