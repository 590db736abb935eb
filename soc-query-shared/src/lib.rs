//! # SOC Query Shared
//!
//! Request types shared between the query repository and the binary.

mod query;
mod sort;

pub use query::{QueryRequest, DEFAULT_SIZE};
pub use sort::{ParseSortError, SortClause, SortOrder};
