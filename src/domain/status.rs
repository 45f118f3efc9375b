//! Delivery status and failure policy
//!
//! The store persists delivery status as a short legacy code string. This
//! module keeps the closed enumeration and its mapping to those codes in one
//! place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery status of one dispense row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Not yet sent (NULL or empty code)
    Pending,
    /// Accepted by the downstream endpoint
    Delivered,
    /// Rejected or not deliverable; excluded from later runs
    Failed,
    /// Failed, but eligible for selection by a later run
    RetryEligible,
}

impl DeliveryStatus {
    /// Legacy storage code; `None` means NULL
    pub fn code(&self) -> Option<&'static str> {
        match self {
            DeliveryStatus::Pending => None,
            DeliveryStatus::Delivered => Some("1"),
            DeliveryStatus::Failed => Some("3"),
            DeliveryStatus::RetryEligible => Some("4"),
        }
    }

    /// Decodes a stored code. Unknown codes return `None`.
    ///
    /// ```
    /// use rxsync::domain::DeliveryStatus;
    ///
    /// assert_eq!(DeliveryStatus::from_code(None), Some(DeliveryStatus::Pending));
    /// assert_eq!(DeliveryStatus::from_code(Some("  ")), Some(DeliveryStatus::Pending));
    /// assert_eq!(DeliveryStatus::from_code(Some("1")), Some(DeliveryStatus::Delivered));
    /// assert_eq!(DeliveryStatus::from_code(Some("7")), None);
    /// ```
    pub fn from_code(code: Option<&str>) -> Option<Self> {
        match code.map(str::trim) {
            None | Some("") => Some(DeliveryStatus::Pending),
            Some("1") => Some(DeliveryStatus::Delivered),
            Some("3") => Some(DeliveryStatus::Failed),
            Some("4") => Some(DeliveryStatus::RetryEligible),
            Some(_) => None,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryStatus::Pending => "pending",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::RetryEligible => "retry_eligible",
        };
        write!(f, "{name}")
    }
}

/// What a failed batch is persisted as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Failed rows are never selected again
    #[default]
    Terminal,
    /// Failed rows re-enter the selection on the next poll
    Retry,
}

impl FailurePolicy {
    /// Status written for rows whose delivery failed
    pub fn failed_status(&self) -> DeliveryStatus {
        match self {
            FailurePolicy::Terminal => DeliveryStatus::Failed,
            FailurePolicy::Retry => DeliveryStatus::RetryEligible,
        }
    }

    /// Statuses the extractor selects
    pub fn selectable(&self) -> &'static [DeliveryStatus] {
        match self {
            FailurePolicy::Terminal => &[DeliveryStatus::Pending],
            FailurePolicy::Retry => &[DeliveryStatus::Pending, DeliveryStatus::RetryEligible],
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(FailurePolicy::Terminal),
            "retry" => Ok(FailurePolicy::Retry),
            other => Err(format!(
                "Invalid failure policy '{other}'. Must be one of: terminal, retry"
            )),
        }
    }
}
