//! # SOC Query Repository
//!
//! This crate provides the query adapter used to search a Security Onion
//! OpenSearch cluster. It includes the connection configuration, error
//! types, the backend interfaces, index resolution, and a concrete
//! implementation for OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod index_resolver;
pub mod interfaces;
pub mod opensearch;

pub use client::SocQueryClient;
pub use config::ConnectionConfig;
pub use errors::SocQueryError;
pub use index_resolver::{resolve_index, IndexResolver};
pub use interfaces::{BackendConnector, SearchBackend};
pub use crate::opensearch::{OpenSearchBackend, OpenSearchConnector};
