//! OpenSearch request bodies and response helpers.

use serde_json::{json, Value};

use crate::errors::SocQueryError;

/// Build the search body for a raw query-string expression.
///
/// The text is passed through untouched; field filters, boolean operators
/// and wildcards are interpreted by the backend. No sort clause is added,
/// so hits come back in relevance order.
pub fn build_query_string_body(query_text: &str) -> Value {
    json!({
        "query": {
            "query_string": {
                "query": query_text
            }
        }
    })
}

/// Extract the index names from a `GET /*/_alias` response.
///
/// The response is an object keyed by index name; the keys are returned in
/// the order the backend sent them.
pub fn alias_names(body: &Value) -> Result<Vec<String>, SocQueryError> {
    let indices = body
        .as_object()
        .ok_or_else(|| SocQueryError::parse("alias response is not a JSON object"))?;

    Ok(indices.keys().cloned().collect())
}
