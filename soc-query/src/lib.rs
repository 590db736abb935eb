//! # SOC Query
//!
//! Command-line entry point for running query-string searches against a
//! Security Onion cluster.
//!
//! This crate provides the settings loader and error type used by the
//! `soc-query` binary.

pub mod config;

pub use config::Settings;

use thiserror::Error;

/// Errors that can occur while configuring or running a query.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Query error.
    #[error("Query error: {0}")]
    QueryError(#[from] soc_query_repository::SocQueryError),

    /// Output serialization error.
    #[error("Output error: {0}")]
    OutputError(#[from] serde_json::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// A short remedy to print next to the error, when one is known.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::QueryError(err) if err.is_not_found() => {
                Some("the index was not found; check --index or SO_DEFAULT_INDEX")
            }
            Self::QueryError(err) if matches!(err.status(), Some(401) | Some(403)) => {
                Some("the cluster rejected the credentials; check SO_API_KEY or SO_USERNAME/SO_PASSWORD")
            }
            _ => None,
        }
    }
}
