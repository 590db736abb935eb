//! Search backend trait definitions.
//!
//! This module defines the abstract interface for the two cluster calls the
//! adapter makes, plus the factory used to build a backend per query.

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::errors::SocQueryError;

/// A connection to a search cluster, scoped to a single query.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a query future can move across
/// worker threads.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// List the index names reported by the cluster's alias endpoint.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Names in the order the backend returned them
    /// * `Err(SocQueryError)` - If the cluster is unreachable or rejects the call
    async fn list_aliases(&self) -> Result<Vec<String>, SocQueryError>;

    /// Run a search against `index` and return the raw response body.
    ///
    /// # Arguments
    ///
    /// * `index` - Concrete index, alias or pattern to search
    /// * `body` - The search request body
    /// * `size` - Maximum number of hits
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The backend response, unmodified
    /// * `Err(SocQueryError)` - If the request fails or returns a non-success status
    async fn search(&self, index: &str, body: Value, size: u32) -> Result<Value, SocQueryError>;

    /// Release the connection. Called exactly once, when the query finishes,
    /// immediately before the backend itself is dropped.
    fn close(&self);
}

/// Builds a fresh [`SearchBackend`] for each query.
pub trait BackendConnector: Send + Sync {
    /// Create a backend from the given configuration.
    ///
    /// Building a backend does not contact the cluster; connection problems
    /// surface on the first request.
    fn connect(&self, config: &ConnectionConfig) -> Result<Box<dyn SearchBackend>, SocQueryError>;
}
