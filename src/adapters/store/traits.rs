//! Source store abstraction
//!
//! This module defines the trait a dispense store must implement to feed
//! the sync pipeline, plus the value types it returns.

use crate::domain::{BatchKey, DeliveryStatus, FailurePolicy, Result, SourceRow, TargetDate};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy, finite stream of rows for one run
///
/// Each call to [`DispenseStore::fetch_pending`] yields a fresh stream; an
/// `Err` item ends extraction for the run.
pub type SourceRowStream = BoxStream<'static, Result<SourceRow>>;

/// Row counts per delivery status for one date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Rows with no status yet
    pub pending: u64,
    /// Rows accepted downstream
    pub delivered: u64,
    /// Rows that failed terminally
    pub failed: u64,
    /// Rows waiting to be retried
    pub retry_eligible: u64,
    /// Rows carrying a code rxsync does not recognise
    pub unknown: u64,
}

impl StatusCounts {
    /// Adds `count` rows stored with `code`
    pub fn record(&mut self, code: Option<&str>, count: u64) {
        match DeliveryStatus::from_code(code) {
            Some(DeliveryStatus::Pending) => self.pending += count,
            Some(DeliveryStatus::Delivered) => self.delivered += count,
            Some(DeliveryStatus::Failed) => self.failed += count,
            Some(DeliveryStatus::RetryEligible) => self.retry_eligible += count,
            None => self.unknown += count,
        }
    }

    /// Total rows counted
    pub fn total(&self) -> u64 {
        self.pending + self.delivered + self.failed + self.retry_eligible + self.unknown
    }
}

/// Store holding the dispense rows and their delivery status
///
/// Implementations must not expose driver error types; failures are mapped
/// to [`crate::domain::StoreError`].
#[async_trait]
pub trait DispenseStore: Send + Sync {
    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the store cannot be reached.
    async fn test_connection(&self) -> Result<()>;

    /// Streams selectable rows for `target`
    ///
    /// Rows are those whose status is one of `policy.selectable()` and whose
    /// record date starts with the target prefix, ordered by
    /// `(modified_at, rx_no, seq_no)`, at most `max_rows` of them.
    ///
    /// # Errors
    ///
    /// Returns a connectivity error if the selection cannot be started.
    async fn fetch_pending(
        &self,
        target: &TargetDate,
        max_rows: usize,
        policy: FailurePolicy,
    ) -> Result<SourceRowStream>;

    /// Sets `status` on exactly the lines named by `keys` recorded on `target`
    ///
    /// A line is addressed by its `(rx_no, seq_no)` pair; other lines of the
    /// same prescription are not touched. Rows already at `status` are left
    /// alone. Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::StoreError::UpdateFailed`] if the update fails.
    async fn update_status(
        &self,
        keys: &[BatchKey],
        target: &TargetDate,
        status: DeliveryStatus,
    ) -> Result<u64>;

    /// Counts rows per status for `target`
    async fn status_counts(&self, target: &TargetDate) -> Result<StatusCounts>;

    /// Tries to take the run lock for `target` without waiting
    ///
    /// Returns `false` if another process holds it.
    async fn try_acquire_run_lock(&self, target: &TargetDate) -> Result<bool>;

    /// Releases a lock taken with [`DispenseStore::try_acquire_run_lock`]
    async fn release_run_lock(&self, target: &TargetDate) -> Result<()>;
}
