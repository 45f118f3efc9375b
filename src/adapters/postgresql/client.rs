//! PostgreSQL client implementation
//!
//! This module provides the pooled client used to reach the source store.

use crate::config::schema::SourceConfig;
use crate::domain::{Result, RxSyncError, StoreError};
use deadpool_postgres::{Manager, ManagerConfig, Object, Pool, RecyclingMethod};
use postgres_native_tls::MakeTlsConnector;
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::config::SslMode;
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for rxsync
///
/// Provides pooled connections with a statement timeout applied before every
/// query.
pub struct PostgreSQLClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: SourceConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// No connection is opened until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the TLS
    /// connector or pool cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let mut pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .parse()
            .map_err(|e| {
                RxSyncError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        pg_config.connect_timeout(Duration::from_secs(config.connection_timeout_seconds));

        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };

        let manager = match config.ssl_mode.as_str() {
            "disable" => {
                pg_config.ssl_mode(SslMode::Disable);
                Manager::from_config(pg_config, NoTls, manager_config)
            }
            mode => {
                pg_config.ssl_mode(if mode == "require" {
                    SslMode::Require
                } else {
                    SslMode::Prefer
                });
                let connector = native_tls::TlsConnector::builder()
                    .danger_accept_invalid_certs(!config.tls_verify)
                    .build()
                    .map_err(|e| {
                        RxSyncError::Configuration(format!("Failed to build TLS connector: {}", e))
                    })?;
                Manager::from_config(pg_config, MakeTlsConnector::new(connector), manager_config)
            }
        };

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(deadpool_postgres::Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| {
                RxSyncError::Configuration(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    ///
    /// Attempts to get a connection from the pool and execute a simple query.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("Connection test failed: {}", e)))?;

        tracing::info!(
            target = %self.connection_string_safe(),
            "PostgreSQL connection test successful"
        );
        Ok(())
    }

    /// Get a connection from the pool with the statement timeout applied
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_connection(&self) -> Result<Object> {
        self.checkout(self.statement_timeout()).await
    }

    /// Get a connection for a selection that is consumed as a stream
    ///
    /// The server-side statement timeout is disabled on this connection.
    /// A streamed selection stays open while the caller works through its
    /// rows, so only the caller's per-fetch timeout bounds it.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    pub async fn get_streaming_connection(&self) -> Result<Object> {
        self.checkout(Duration::ZERO).await
    }

    async fn checkout(&self, statement_timeout: Duration) -> Result<Object> {
        let client = self.pool.get().await.map_err(|e| {
            StoreError::ConnectionFailed(format!("Failed to get connection from pool: {}", e))
        })?;

        client
            .batch_execute(&statement_timeout_sql(statement_timeout))
            .await
            .map_err(|e| {
                StoreError::ConnectionFailed(format!("Failed to set statement timeout: {}", e))
            })?;

        Ok(client)
    }

    /// Execute a query and return rows
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(&self, query: &str, params: &[&(dyn ToSql + Sync)]) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;

        client
            .query(query, params)
            .await
            .map_err(|e| StoreError::QueryFailed(format!("Query failed: {}", e)).into())
    }

    /// Execute a statement and return the number of affected rows
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn execute(&self, statement: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64> {
        let client = self.get_connection().await?;

        client
            .execute(statement, params)
            .await
            .map_err(|e| StoreError::UpdateFailed(format!("Statement execution failed: {}", e)).into())
    }

    /// Source configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Statement timeout as a duration
    pub fn statement_timeout(&self) -> Duration {
        Duration::from_secs(self.config.statement_timeout_seconds)
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> String {
        self.config
            .connection_string
            .expose_secret()
            .as_ref()
            .rsplit('@')
            .next()
            .map(|s| format!("postgresql://***@{}", s))
            .unwrap_or_else(|| "postgresql://***".to_string())
    }

    /// Get the pool statistics
    pub fn pool_status(&self) -> deadpool_postgres::Status {
        self.pool.status()
    }
}

/// Session statement for a statement timeout; zero disables it
pub(crate) fn statement_timeout_sql(timeout: Duration) -> String {
    format!("SET statement_timeout = {}", timeout.as_millis())
}
