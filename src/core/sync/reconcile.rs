//! Delivery status write-back
//!
//! One set-based update per call. Failures are logged and swallowed: the
//! counted outcome of a batch never depends on whether its status write
//! succeeded.

use crate::adapters::store::DispenseStore;
use crate::domain::{BatchKey, DeliveryStatus, TargetDate};
use std::collections::HashSet;
use std::sync::Arc;

/// Writes delivery outcomes back to the source store
pub struct StatusReconciler {
    store: Arc<dyn DispenseStore>,
    dry_run: bool,
}

impl StatusReconciler {
    /// Create a new reconciler
    ///
    /// In dry-run mode no update is ever issued.
    pub fn new(store: Arc<dyn DispenseStore>, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// Sets `status` on the lines addressed by `keys` on `target`
    ///
    /// Returns the number of rows changed, or `None` if the update failed.
    /// Repeating a call with the same arguments changes nothing further.
    pub async fn reconcile(
        &self,
        keys: &[BatchKey],
        target: &TargetDate,
        status: DeliveryStatus,
    ) -> Option<u64> {
        let lines = unique_lines(keys);
        if lines.is_empty() {
            return Some(0);
        }

        if self.dry_run {
            tracing::info!(
                keys = lines.len(),
                status = %status,
                "DRY RUN: Would update delivery status"
            );
            return Some(0);
        }

        match self.store.update_status(&lines, target, status).await {
            Ok(affected) => {
                tracing::debug!(
                    keys = lines.len(),
                    affected,
                    status = %status,
                    "Delivery status updated"
                );
                Some(affected)
            }
            Err(e) => {
                tracing::error!(
                    keys = lines.len(),
                    status = %status,
                    first_rx_no = %lines[0].rx_no,
                    error = %e,
                    "Failed to update delivery status"
                );
                None
            }
        }
    }
}

/// Distinct `(rx_no, seq_no)` lines in first-seen order
fn unique_lines(keys: &[BatchKey]) -> Vec<BatchKey> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.iter()
        .filter(|k| seen.insert((k.rx_no.as_str(), k.seq_no.as_deref())))
        .cloned()
        .collect()
}
