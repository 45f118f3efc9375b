//! PostgreSQL adapter implementing the dispense store trait

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::store::{DispenseStore, SourceRowStream, StatusCounts};
use crate::config::schema::is_valid_table_name;
use crate::domain::{
    BatchKey, DeliveryStatus, FailurePolicy, Result, RxSyncError, SourceRow, StoreError,
    TargetDate,
};
use async_trait::async_trait;
use deadpool_postgres::Object;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;

/// PostgreSQL implementation of [`DispenseStore`]
///
/// The run lock is a session-level advisory lock, so the connection that
/// took it is parked here until the lock is released.
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
    table: String,
    lock_holder: Mutex<Option<Object>>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the configured table name is not a
    /// plain or schema-qualified identifier.
    pub fn new(client: PostgreSQLClient) -> Result<Self> {
        Self::new_with_arc(Arc::new(client))
    }

    /// Create a new PostgreSQL adapter with an Arc-wrapped client
    pub fn new_with_arc(client: Arc<PostgreSQLClient>) -> Result<Self> {
        let table = client.config().table.clone();
        if !is_valid_table_name(&table) {
            return Err(RxSyncError::Configuration(format!(
                "Invalid source table name '{table}'"
            )));
        }
        Ok(Self {
            client,
            table,
            lock_holder: Mutex::new(None),
        })
    }

    fn lock_key(&self, target: &TargetDate) -> String {
        format!("rxsync:{}:{}", self.table, target.prefix())
    }
}

/// Builds the status filter for the statuses a policy selects
fn status_filter(policy: FailurePolicy) -> String {
    policy
        .selectable()
        .iter()
        .map(|status| match status.code() {
            None => "status IS NULL OR TRIM(status) = ''".to_string(),
            Some(code) => format!("status = '{code}'"),
        })
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Builds the selection query for `table`
///
/// `$1` is the record-date LIKE pattern and `$2` the row limit.
pub(crate) fn selection_query(table: &str, policy: FailurePolicy) -> String {
    let columns = SourceRow::COLUMNS
        .iter()
        .map(|c| format!("{c}::text AS {c}"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "SELECT {columns} FROM {table} \
         WHERE ({filter}) AND rx_date LIKE $1 \
         ORDER BY modified_at, rx_no, seq_no \
         LIMIT $2",
        filter = status_filter(policy)
    )
}

/// Builds the bulk status update for `table`
///
/// `$1` is the status code, `$2` and `$3` the parallel rx_no and seq_no
/// arrays naming the lines to touch, and `$4` the record-date LIKE pattern.
/// A null seq_no matches only a null or blank stored line number.
pub(crate) fn update_query(table: &str) -> String {
    format!(
        "UPDATE {table} AS t SET status = $1 \
         FROM unnest($2::text[], $3::text[]) AS k(rx_no, seq_no) \
         WHERE t.rx_no = k.rx_no \
         AND NULLIF(TRIM(t.seq_no::text), '') IS NOT DISTINCT FROM k.seq_no \
         AND t.rx_date LIKE $4 \
         AND t.status IS DISTINCT FROM $1"
    )
}

fn decode_row(row: &Row) -> SourceRow {
    SourceRow::from_lookup(|column| {
        row.try_get::<_, Option<String>>(column)
            .map_err(|e| e.to_string())
    })
}

fn params_iter<'a>(
    params: &'a [&'a (dyn ToSql + Sync)],
) -> impl ExactSizeIterator<Item = &'a dyn ToSql> + 'a {
    params.iter().map(|p| *p as &dyn ToSql)
}

#[async_trait]
impl DispenseStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn fetch_pending(
        &self,
        target: &TargetDate,
        max_rows: usize,
        policy: FailurePolicy,
    ) -> Result<SourceRowStream> {
        let query = selection_query(&self.table, policy);
        let pattern = target.like_pattern();
        let limit = i64::try_from(max_rows).unwrap_or(i64::MAX);

        let conn = self.client.get_streaming_connection().await?;
        let params: [&(dyn ToSql + Sync); 2] = [&pattern, &limit];
        let rows = conn
            .query_raw(query.as_str(), params_iter(&params))
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Selection failed: {}", e)))?;

        tracing::debug!(
            table = %self.table,
            target_date = %target,
            max_rows,
            "Selection query started"
        );

        // The pooled connection travels with the stream so it outlives the query
        let state = Some((conn, Box::pin(rows)));
        let stream = stream::unfold(state, |state| async move {
            let (conn, mut rows) = state?;
            match rows.next().await {
                Some(Ok(row)) => Some((Ok(decode_row(&row)), Some((conn, rows)))),
                Some(Err(e)) => Some((
                    Err(RxSyncError::Store(StoreError::QueryFailed(format!(
                        "Row fetch failed: {}",
                        e
                    )))),
                    None,
                )),
                None => None,
            }
        });

        Ok(stream.boxed())
    }

    async fn update_status(
        &self,
        keys: &[BatchKey],
        target: &TargetDate,
        status: DeliveryStatus,
    ) -> Result<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let query = update_query(&self.table);
        let code = status.code();
        let pattern = target.like_pattern();
        let rx_nos: Vec<&str> = keys.iter().map(|k| k.rx_no.as_str()).collect();
        let seq_nos: Vec<Option<&str>> = keys.iter().map(|k| k.seq_no.as_deref()).collect();

        self.client
            .execute(&query, &[&code, &rx_nos, &seq_nos, &pattern])
            .await
    }

    async fn status_counts(&self, target: &TargetDate) -> Result<StatusCounts> {
        let query = format!(
            "SELECT NULLIF(TRIM(status::text), '') AS code, COUNT(*) AS n \
             FROM {} WHERE rx_date LIKE $1 GROUP BY 1",
            self.table
        );
        let pattern = target.like_pattern();
        let rows = self.client.query(&query, &[&pattern]).await?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let code: Option<String> = row
                .try_get("code")
                .map_err(|e| StoreError::QueryFailed(format!("Failed to read status: {}", e)))?;
            let n: i64 = row
                .try_get("n")
                .map_err(|e| StoreError::QueryFailed(format!("Failed to read count: {}", e)))?;
            counts.record(code.as_deref(), u64::try_from(n).unwrap_or(0));
        }
        Ok(counts)
    }

    async fn try_acquire_run_lock(&self, target: &TargetDate) -> Result<bool> {
        let mut holder = self.lock_holder.lock().await;
        if holder.is_some() {
            return Ok(false);
        }

        let key = self.lock_key(target);
        let conn = self.client.get_connection().await?;
        let row = conn
            .query_one("SELECT pg_try_advisory_lock(hashtext($1)::bigint)", &[&key])
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Run lock query failed: {}", e)))?;
        let acquired: bool = row
            .try_get(0)
            .map_err(|e| StoreError::QueryFailed(format!("Run lock query failed: {}", e)))?;

        if acquired {
            tracing::debug!(lock = %key, "Run lock acquired");
            *holder = Some(conn);
        }
        Ok(acquired)
    }

    async fn release_run_lock(&self, target: &TargetDate) -> Result<()> {
        let Some(conn) = self.lock_holder.lock().await.take() else {
            return Ok(());
        };

        let key = self.lock_key(target);
        match conn
            .query_one("SELECT pg_advisory_unlock(hashtext($1)::bigint)", &[&key])
            .await
        {
            Ok(_) => {
                tracing::debug!(lock = %key, "Run lock released");
                Ok(())
            }
            Err(e) => {
                // Closing the session drops any advisory lock it still holds
                drop(Object::take(conn));
                Err(StoreError::UpdateFailed(format!("Run lock release failed: {}", e)).into())
            }
        }
    }
}
