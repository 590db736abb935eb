//! Error types for the query repository.

mod soc_query_error;

pub use soc_query_error::SocQueryError;
