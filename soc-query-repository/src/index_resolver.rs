//! Index resolution for Security Onion naming conventions.
//!
//! Security Onion stores its data in `so-*` indices, with some deployments
//! also writing `logs-*` data streams. When no index pattern is configured
//! the adapter asks the cluster for its alias listing and picks a target
//! from it.

use tracing::{debug, error};

use crate::errors::SocQueryError;
use crate::interfaces::SearchBackend;

/// Fallback target when the examined name matches no convention.
pub const WILDCARD_INDEX: &str = "*";

/// Prefix of Security Onion managed indices.
pub const SO_PREFIX: &str = "so-";

/// Which naming rule picked an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMatch {
    /// Name starts with `so-`.
    Prefix,
    /// Name contains `so`.
    Substring,
    /// Name contains `logs`.
    Logs,
    /// Nothing matched; the wildcard is used.
    Wildcard,
}

impl IndexMatch {
    pub fn classify(name: &str) -> Self {
        if name.starts_with(SO_PREFIX) {
            Self::Prefix
        } else if name.contains("so") {
            Self::Substring
        } else if name.contains("logs") {
            Self::Logs
        } else {
            Self::Wildcard
        }
    }
}

/// Pick a target index from enumerated names.
///
/// Only the first name is examined: it is returned when it matches any of
/// the rules in [`IndexMatch`], otherwise the wildcard is returned. A later
/// `so-` name never wins over an earlier one. Returns `None` for an empty
/// listing.
pub fn resolve_index<I, S>(names: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let first = names.into_iter().next()?;
    let name = first.as_ref();

    let rule = IndexMatch::classify(name);
    debug!(name = %name, rule = ?rule, "Classified index");

    match rule {
        IndexMatch::Wildcard => Some(WILDCARD_INDEX.to_string()),
        _ => Some(name.to_string()),
    }
}

/// Resolves the index a query runs against.
pub struct IndexResolver<'a> {
    backend: &'a dyn SearchBackend,
}

impl<'a> IndexResolver<'a> {
    pub fn new(backend: &'a dyn SearchBackend) -> Self {
        Self { backend }
    }

    /// Resolve `pattern` to a concrete target.
    ///
    /// A non-empty pattern is returned verbatim without contacting the
    /// cluster. An empty pattern triggers an alias listing and
    /// [`resolve_index`] over the result.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The index to search
    /// * `Err(SocQueryError::NoSuitableIndex)` - If the listing was empty
    /// * `Err(SocQueryError)` - If the listing failed; returned unchanged
    pub async fn resolve(&self, pattern: &str) -> Result<String, SocQueryError> {
        if !pattern.is_empty() {
            return Ok(pattern.to_string());
        }

        let result = match self.backend.list_aliases().await {
            Ok(names) => resolve_index(&names).ok_or(SocQueryError::NoSuitableIndex),
            Err(e) => Err(e),
        };

        match result {
            Ok(index) => {
                debug!(index = %index, "Resolved index from alias listing");
                Ok(index)
            }
            Err(e) => {
                error!(error = %e, "Index resolution error");
                Err(e)
            }
        }
    }
}
