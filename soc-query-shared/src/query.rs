//! The query request handed to the adapter.

use serde::{Deserialize, Serialize};

use crate::SortClause;

/// Number of hits returned when the caller does not ask for a size.
pub const DEFAULT_SIZE: u32 = 20;

fn default_size() -> u32 {
    DEFAULT_SIZE
}

/// A free-text query against the Security Onion cluster.
///
/// `query_string` uses the backend's query-string syntax (`field:value`,
/// boolean operators, wildcards). `sort` is accepted and carried along but
/// is not attached to the outgoing request; results come back in the
/// backend's relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Raw query-string expression.
    pub query_string: String,
    /// Maximum number of hits to return.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Optional explicit sort specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortClause>>,
    /// Explicit index or index pattern. Overrides the configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
}

impl QueryRequest {
    /// Create a request with the default size and no sort or index override.
    pub fn new(query_string: impl Into<String>) -> Self {
        Self {
            query_string: query_string.into(),
            size: DEFAULT_SIZE,
            sort: None,
            index: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_sort(mut self, sort: Vec<SortClause>) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// True when the query text is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.query_string.trim().is_empty()
    }
}
