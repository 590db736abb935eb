//! OpenSearch implementation of the search backend.
//!
//! This module provides a concrete implementation of `SearchBackend` and
//! `BackendConnector` using the OpenSearch client.

mod client;
mod queries;

pub use client::{OpenSearchBackend, OpenSearchConnector};
pub use queries::{alias_names, build_query_string_body};
