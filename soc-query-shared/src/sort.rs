//! Sort directives attached to a query request.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// A single sort clause, e.g. `@timestamp` descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortClause {
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl SortClause {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortOrder::Desc)
    }
}

/// Error returned when a `field[:order]` string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseSortError {
    #[error("sort field is empty")]
    EmptyField,

    #[error("unknown sort order '{0}', expected 'asc' or 'desc'")]
    UnknownOrder(String),
}

impl FromStr for SortClause {
    type Err = ParseSortError;

    /// Parses `field`, `field:asc` or `field:desc`. The order defaults to
    /// descending. The split happens on the last `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = match s.rsplit_once(':') {
            Some((field, order)) => {
                let order = match order.trim().to_ascii_lowercase().as_str() {
                    "asc" => SortOrder::Asc,
                    "desc" => SortOrder::Desc,
                    other => return Err(ParseSortError::UnknownOrder(other.to_string())),
                };
                (field, order)
            }
            None => (s, SortOrder::default()),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(ParseSortError::EmptyField);
        }

        Ok(Self::new(field, order))
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.order)
    }
}
