//! PostgreSQL source store
//!
//! This module provides the pooled client and the [`DispenseStore`]
//! implementation reading dispense rows from PostgreSQL.
//!
//! [`DispenseStore`]: crate::adapters::store::DispenseStore

pub mod adapter;
pub mod client;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
