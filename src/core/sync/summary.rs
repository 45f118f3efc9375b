//! Run result and reporting
//!
//! [`RunResult`] is what a caller gets back from one orchestrator run. It is
//! assembled from a [`RunTally`] and cannot be changed after it is returned.

use crate::domain::TargetDate;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of one sync run
#[derive(Debug, Clone)]
pub struct RunResult {
    run_id: Uuid,
    target_date: TargetDate,
    success_count: usize,
    failed_count: usize,
    batches_dispatched: usize,
    errors: Vec<String>,
    duration: Duration,
}

impl RunResult {
    /// Identifier tagging every log line of the run
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Day the run operated on
    pub fn target_date(&self) -> &TargetDate {
        &self.target_date
    }

    /// Records in batches the endpoint accepted
    pub fn success_count(&self) -> usize {
        self.success_count
    }

    /// Records that failed mapping or were in a failed batch
    pub fn failed_count(&self) -> usize {
        self.failed_count
    }

    /// Number of batches sent downstream
    pub fn batches_dispatched(&self) -> usize {
        self.batches_dispatched
    }

    /// Run-level errors: fatal extraction failures and run-lock refusal
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Wall-clock time of the run
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// True when every selected record was delivered and nothing aborted the run
    pub fn is_successful(&self) -> bool {
        self.failed_count == 0 && self.errors.is_empty()
    }

    /// Total records counted as either delivered or failed
    pub fn processed(&self) -> usize {
        self.success_count + self.failed_count
    }

    /// Get success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.processed() == 0 {
            return 100.0;
        }
        (self.success_count as f64 / self.processed() as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            target_date = %self.target_date,
            success = self.success_count,
            failed = self.failed_count,
            batches = self.batches_dispatched,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Sync summary"
        );

        for error in &self.errors {
            tracing::warn!(run_id = %self.run_id, message = %error, "Run error");
        }
    }
}

/// Mutable counters for a run in progress
#[derive(Debug)]
pub struct RunTally {
    run_id: Uuid,
    target_date: TargetDate,
    success_count: usize,
    failed_count: usize,
    batches_dispatched: usize,
    errors: Vec<String>,
}

impl RunTally {
    /// Starts a tally for a run
    pub fn new(run_id: Uuid, target_date: TargetDate) -> Self {
        Self {
            run_id,
            target_date,
            success_count: 0,
            failed_count: 0,
            batches_dispatched: 0,
            errors: Vec::new(),
        }
    }

    /// Counts delivered records
    pub fn delivered(&mut self, count: usize) {
        self.success_count += count;
    }

    /// Counts failed records
    pub fn failed(&mut self, count: usize) {
        self.failed_count += count;
    }

    /// Counts a dispatched batch
    pub fn batch_dispatched(&mut self) -> usize {
        self.batches_dispatched += 1;
        self.batches_dispatched
    }

    /// Adds a run-level error
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Seals the tally into an immutable result
    pub fn finish(self, duration: Duration) -> RunResult {
        RunResult {
            run_id: self.run_id,
            target_date: self.target_date,
            success_count: self.success_count,
            failed_count: self.failed_count,
            batches_dispatched: self.batches_dispatched,
            errors: self.errors,
            duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn tally() -> RunTally {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        RunTally::new(Uuid::new_v4(), TargetDate::new(date, "%Y-%m-%d"))
    }

    #[test]
    fn test_empty_run() {
        let result = tally().finish(Duration::from_millis(5));

        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failed_count(), 0);
        assert_eq!(result.batches_dispatched(), 0);
        assert!(result.errors().is_empty());
        assert!(result.is_successful());
        assert_eq!(result.success_rate(), 100.0);
        assert_eq!(result.duration(), Duration::from_millis(5));
    }

    #[test]
    fn test_counts() {
        let mut t = tally();
        assert_eq!(t.batch_dispatched(), 1);
        t.delivered(100);
        assert_eq!(t.batch_dispatched(), 2);
        t.failed(100);
        t.delivered(50);
        t.batch_dispatched();

        let result = t.finish(Duration::ZERO);
        assert_eq!(result.success_count(), 150);
        assert_eq!(result.failed_count(), 100);
        assert_eq!(result.processed(), 250);
        assert_eq!(result.batches_dispatched(), 3);
        assert_eq!(result.success_rate(), 60.0);
        assert!(!result.is_successful());
    }

    #[test]
    fn test_errors_make_run_unsuccessful() {
        let mut t = tally();
        t.add_error("Store error: connection refused");

        let result = t.finish(Duration::ZERO);
        assert_eq!(result.errors().to_vec(), vec!["Store error: connection refused".to_string()]);
        assert!(!result.is_successful());
        assert_eq!(result.target_date().to_string(), "2025-03-01");
    }
}
