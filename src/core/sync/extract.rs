//! Pending-row extraction
//!
//! Wraps the store selection with the run's row cap and a per-fetch time
//! budget. The first error ends the stream.

use crate::adapters::store::{DispenseStore, SourceRowStream};
use crate::domain::{FailurePolicy, Result, RxSyncError, StoreError, TargetDate};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Streams selectable rows for a target date
pub struct Extractor {
    store: Arc<dyn DispenseStore>,
    max_rows: usize,
    fetch_timeout: Duration,
    policy: FailurePolicy,
}

impl Extractor {
    /// Create a new extractor
    pub fn new(
        store: Arc<dyn DispenseStore>,
        max_rows: usize,
        fetch_timeout: Duration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            store,
            max_rows,
            fetch_timeout,
            policy,
        }
    }

    /// Starts a fresh extraction for `target`
    ///
    /// # Errors
    ///
    /// Returns a store error if the selection cannot be started within the
    /// fetch timeout.
    pub async fn extract(&self, target: &TargetDate) -> Result<SourceRowStream> {
        let fetch_timeout = self.fetch_timeout;
        let rows = tokio::time::timeout(
            fetch_timeout,
            self.store.fetch_pending(target, self.max_rows, self.policy),
        )
        .await
        .map_err(|_| {
            StoreError::Timeout(format!(
                "Selection did not start within {}s",
                fetch_timeout.as_secs()
            ))
        })??;

        let capped = rows.take(self.max_rows);
        let stream = stream::unfold(Some(capped), move |state| async move {
            let mut rows = state?;
            match tokio::time::timeout(fetch_timeout, rows.next()).await {
                Ok(Some(Ok(row))) => Some((Ok(row), Some(rows))),
                Ok(Some(Err(e))) => Some((Err(e), None)),
                Ok(None) => None,
                Err(_) => Some((
                    Err(RxSyncError::Store(StoreError::Timeout(format!(
                        "Row fetch exceeded {}s",
                        fetch_timeout.as_secs()
                    )))),
                    None,
                )),
            }
        });

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::StatusCounts;
    use crate::domain::{BatchKey, DeliveryStatus, SourceRow};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    enum Script {
        Rows(usize),
        RowsThenError(usize),
        Stall,
        Refuse,
    }

    struct ScriptedStore(Script);

    fn row(i: usize) -> SourceRow {
        SourceRow {
            rx_no: Some(format!("RX{i:03}")),
            rx_date: Some("2025-03-01".to_string()),
            ..Default::default()
        }
    }

    #[async_trait]
    impl DispenseStore for ScriptedStore {
        async fn test_connection(&self) -> Result<()> {
            Ok(())
        }

        async fn fetch_pending(
            &self,
            _target: &TargetDate,
            _max_rows: usize,
            _policy: FailurePolicy,
        ) -> Result<SourceRowStream> {
            match self.0 {
                Script::Rows(n) => Ok(stream::iter((0..n).map(|i| Ok(row(i)))).boxed()),
                Script::RowsThenError(n) => {
                    let rows = (0..n).map(|i| Ok(row(i)));
                    let fail = std::iter::once(Err(RxSyncError::Store(StoreError::QueryFailed(
                        "connection reset".to_string(),
                    ))));
                    let after = std::iter::once(Ok(row(999)));
                    Ok(stream::iter(rows.chain(fail).chain(after)).boxed())
                }
                Script::Stall => Ok(stream::pending().boxed()),
                Script::Refuse => Err(StoreError::ConnectionFailed("refused".to_string()).into()),
            }
        }

        async fn update_status(
            &self,
            _keys: &[BatchKey],
            _target: &TargetDate,
            _status: DeliveryStatus,
        ) -> Result<u64> {
            Ok(0)
        }

        async fn status_counts(&self, _target: &TargetDate) -> Result<StatusCounts> {
            Ok(StatusCounts::default())
        }

        async fn try_acquire_run_lock(&self, _target: &TargetDate) -> Result<bool> {
            Ok(true)
        }

        async fn release_run_lock(&self, _target: &TargetDate) -> Result<()> {
            Ok(())
        }
    }

    fn target() -> TargetDate {
        TargetDate::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), "%Y-%m-%d")
    }

    fn extractor(script: Script, max_rows: usize) -> Extractor {
        Extractor::new(
            Arc::new(ScriptedStore(script)),
            max_rows,
            Duration::from_millis(200),
            FailurePolicy::Terminal,
        )
    }

    #[tokio::test]
    async fn test_caps_row_count() {
        let rows: Vec<_> = extractor(Script::Rows(10), 4)
            .extract(&target())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let rows: Vec<_> = extractor(Script::RowsThenError(2), 100)
            .extract(&target())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(rows.len(), 3);
        assert!(rows[2].is_err());
    }

    #[tokio::test]
    async fn test_connect_failure_is_run_fatal() {
        let err = extractor(Script::Refuse, 100)
            .extract(&target())
            .await
            .err()
            .unwrap();

        assert!(err.is_run_fatal());
    }

    #[tokio::test]
    async fn test_stalled_fetch_times_out() {
        let rows: Vec<_> = extractor(Script::Stall, 100)
            .extract(&target())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(rows.len(), 1);
        let err = rows.into_iter().next().unwrap().unwrap_err();
        assert!(matches!(err, RxSyncError::Store(StoreError::Timeout(_))));
    }
}
