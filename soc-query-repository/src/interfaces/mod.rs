//! Interface definitions for the search backend.
//!
//! The adapter talks to the cluster only through these traits, so the
//! OpenSearch implementation can be swapped for a mock in tests.

mod search_backend;

pub use search_backend::{BackendConnector, SearchBackend};
