//! Batch senders
//!
//! [`HttpSender`] POSTs one batch per request to the downstream endpoint.
//! [`DryRunSender`] stands in for it when no network I/O is wanted.

use crate::config::DestinationConfig;
use crate::core::sync::batch::Batch;
use crate::domain::{NormalizedRecord, Result, RxSyncError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use std::time::Duration;

/// Outcome of dispatching one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The endpoint answered 2xx
    Delivered {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
    /// The endpoint answered with a non-2xx status
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },
    /// No usable response: timeout, refused connection, DNS or body read failure
    TransportFailure(String),
}

impl SendOutcome {
    /// Whether the batch was accepted
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// Dispatches a batch downstream
///
/// A sender makes exactly one attempt per call. It never retries.
#[async_trait]
pub trait BatchSender: Send + Sync {
    /// Sends `batch` and classifies the response
    async fn send(&self, batch: &Batch) -> SendOutcome;
}

#[derive(Serialize)]
struct DispensePayload<'a> {
    dispense_list: &'a [NormalizedRecord],
}

/// Renders the JSON body for a batch
///
/// Keys are not part of the payload; absent fields are omitted.
pub fn payload(batch: &Batch) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&DispensePayload {
        dispense_list: batch.records(),
    })
}

/// HTTP sender for the downstream dispense endpoint
pub struct HttpSender {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
}

impl HttpSender {
    /// Create a new HTTP sender
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built.
    pub fn new(config: &DestinationConfig) -> Result<Self> {
        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds));

        if !config.tls_verify {
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            RxSyncError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            auth_token: config
                .auth_token
                .as_ref()
                .map(|t| t.expose_secret().as_ref().to_string()),
        })
    }

    /// Endpoint the sender posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl BatchSender for HttpSender {
    async fn send(&self, batch: &Batch) -> SendOutcome {
        let body = match payload(batch) {
            Ok(body) => body,
            Err(e) => return SendOutcome::TransportFailure(format!("Failed to encode batch: {e}")),
        };

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);

        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let cause = if e.is_timeout() {
                    format!("Request timed out: {e}")
                } else if e.is_connect() {
                    format!("Connection failed: {e}")
                } else {
                    format!("Request failed: {e}")
                };
                return SendOutcome::TransportFailure(cause);
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return SendOutcome::TransportFailure(format!(
                    "Failed to read response body (status {status}): {e}"
                ))
            }
        };

        if status.is_success() {
            SendOutcome::Delivered {
                status: status.as_u16(),
                body,
            }
        } else {
            SendOutcome::Rejected {
                status: status.as_u16(),
                body,
            }
        }
    }
}

/// Sender that logs the batch and reports it delivered
pub struct DryRunSender;

#[async_trait]
impl BatchSender for DryRunSender {
    async fn send(&self, batch: &Batch) -> SendOutcome {
        let first = batch.keys().first().map(|k| k.rx_no.as_str()).unwrap_or("");
        let last = batch.keys().last().map(|k| k.rx_no.as_str()).unwrap_or("");
        tracing::info!(
            records = batch.len(),
            first_rx_no = first,
            last_rx_no = last,
            "DRY RUN: Would send {} records",
            batch.len()
        );
        SendOutcome::Delivered {
            status: 200,
            body: String::new(),
        }
    }
}
