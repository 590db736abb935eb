//! Query adapter error types.
//!
//! This module defines the error types that can occur while resolving an
//! index or executing a query.

use thiserror::Error;

/// Errors that can occur during a query.
#[derive(Debug, Clone, Error)]
pub enum SocQueryError {
    /// Failed to build a client or reach the cluster.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The cluster answered with a non-success status.
    ///
    /// Covers authentication failures (401/403), missing indices (404) and
    /// query syntax rejected by the backend (400).
    #[error("Backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    /// Alias listing returned no indices to choose from.
    #[error("No suitable index found")]
    NoSuitableIndex,

    /// Failed to parse a response from the cluster.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The query was rejected before reaching the cluster.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

impl SocQueryError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a backend status error.
    pub fn backend(status: u16, body: impl Into<String>) -> Self {
        Self::Backend {
            status,
            body: body.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create an invalid query error.
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// The HTTP status the backend answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 404 responses.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
