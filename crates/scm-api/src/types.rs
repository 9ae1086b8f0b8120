//! Wire envelopes shared by every SCM endpoint.
//!
//! Resource payloads themselves are modeled in `scm-core`; this module only
//! knows about the listing envelope and the error envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Pagination ───────────────────────────────────────────────────────

/// Listing envelope returned by every collection endpoint:
/// `{ "data": [...], "total": N, "limit": L, "offset": O }`.
///
/// `total`, `limit` and `offset` are optional because some endpoints omit
/// them when the result fits in a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Response of a lookup-by-name request.
///
/// Depending on the endpoint the API answers either with the object itself
/// or with a listing envelope holding the candidates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FetchResponse<T> {
    Page(Page<T>),
    Single(T),
}

impl<T> FetchResponse<T> {
    /// Flatten into the list of candidates.
    pub fn into_candidates(self) -> Vec<T> {
        match self {
            Self::Page(page) => page.data,
            Self::Single(item) => vec![item],
        }
    }
}

// ── Error envelope ───────────────────────────────────────────────────

/// Error envelope: `{ "_errors": [ {code, message, details} ], "_request_id": "…" }`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorEnvelope {
    #[serde(rename = "_errors", default)]
    pub errors: Vec<ApiErrorEntry>,
    #[serde(rename = "_request_id", default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorEntry {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl ApiErrorEntry {
    /// `details.errorType`, the discriminator the API uses for conflict kinds.
    pub fn error_type(&self) -> Option<String> {
        self.details
            .as_ref()
            .and_then(|d| d.get("errorType"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// Best human-readable message: top-level message, then `details.message`.
    pub fn best_message(&self) -> Option<String> {
        self.message.clone().or_else(|| {
            self.details
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
    }
}
