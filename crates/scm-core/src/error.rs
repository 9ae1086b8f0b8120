// ── Core error types ──
//
// User-facing errors from scm-core. Callers branch on `kind()` rather than
// on HTTP details; the `From<scm_api::Error>` impl translates transport-layer
// errors into these variants. Every error exposes a message (Display), a
// machine-readable `code()`, the HTTP status if any, and optional details.

use std::time::Duration;

use serde_json::Value;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Broad failure category, for differentiated caller handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    NotFound,
    Conflict,
    Server,
    ResponseShape,
    Transport,
    Timeout,
    Cancelled,
    Config,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Validation (raised before any request) ───────────────────────
    #[error("Exactly one of folder, snippet, or device must be provided (got {provided})")]
    InvalidContainer { provided: usize },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        status: Option<u16>,
    },

    // ── Lookup ───────────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
        code: Option<String>,
        details: Option<Value>,
    },

    #[error("Multiple {entity_type} objects named '{name}' in {container} ({count} candidates)")]
    Ambiguous {
        entity_type: String,
        name: String,
        container: String,
        count: usize,
    },

    // ── Conflicts ────────────────────────────────────────────────────
    #[error("Name conflict: {message}")]
    NameConflict {
        message: String,
        status: u16,
        code: Option<String>,
        details: Option<Value>,
    },

    #[error("Object is still referenced: {message}")]
    ReferenceNotZero {
        message: String,
        status: u16,
        code: Option<String>,
        details: Option<Value>,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    Api {
        message: String,
        status: u16,
        /// The API error code (e.g. `"E003"`).
        code: Option<String>,
        error_type: Option<String>,
        details: Option<Value>,
    },

    #[error("Server error (HTTP {status}): {message}")]
    Server {
        message: String,
        status: u16,
        code: Option<String>,
        details: Option<Value>,
    },

    #[error("Unexpected response shape: {message}")]
    ResponseShape { message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out: {reason}")]
    RequestTimeout { reason: String },

    // ── Job tracking ─────────────────────────────────────────────────
    #[error("Job {job_id} did not finish within {waited:?}")]
    JobTimeout { job_id: String, waited: Duration },

    #[error("Waiting for job {job_id} was cancelled")]
    Cancelled { job_id: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// The failure category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidContainer { .. } | Self::ValidationFailed { .. } => ErrorKind::Validation,
            Self::AuthenticationFailed { .. } => ErrorKind::Authentication,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Ambiguous { .. } | Self::NameConflict { .. } | Self::ReferenceNotZero { .. } => {
                ErrorKind::Conflict
            }
            Self::Api { status, .. } => match status {
                400 | 422 => ErrorKind::Validation,
                403 => ErrorKind::Authentication,
                404 => ErrorKind::NotFound,
                409 => ErrorKind::Conflict,
                _ => ErrorKind::Server,
            },
            Self::Server { .. } => ErrorKind::Server,
            Self::ResponseShape { .. } => ErrorKind::ResponseShape,
            Self::ConnectionFailed { .. } => ErrorKind::Transport,
            Self::RequestTimeout { .. } | Self::JobTimeout { .. } => ErrorKind::Timeout,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Machine-readable code: the server's error code when it sent one,
    /// otherwise a stable identifier for the variant.
    pub fn code(&self) -> &str {
        let server_code = match self {
            Self::NotFound { code, .. }
            | Self::NameConflict { code, .. }
            | Self::ReferenceNotZero { code, .. }
            | Self::Api { code, .. }
            | Self::Server { code, .. } => code.as_deref(),
            _ => None,
        };
        server_code.unwrap_or(match self {
            Self::InvalidContainer { .. } => "missing_or_conflicting_container",
            Self::ValidationFailed { .. } => "validation_failed",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::NotFound { .. } => "object_not_present",
            Self::Ambiguous { .. } => "ambiguous_name",
            Self::NameConflict { .. } => "name_not_unique",
            Self::ReferenceNotZero { .. } => "reference_not_zero",
            Self::Api { .. } => "api_error",
            Self::Server { .. } => "server_error",
            Self::ResponseShape { .. } => "invalid_response",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::RequestTimeout { .. } => "request_timeout",
            Self::JobTimeout { .. } => "job_timeout",
            Self::Cancelled { .. } => "cancelled",
            Self::Config { .. } => "config_error",
        })
    }

    /// HTTP status of the response that caused this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailed { status, .. } => *status,
            Self::NotFound { .. } => Some(404),
            Self::NameConflict { status, .. }
            | Self::ReferenceNotZero { status, .. }
            | Self::Api { status, .. }
            | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured details from the API error envelope, if any.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::NotFound { details, .. }
            | Self::NameConflict { details, .. }
            | Self::ReferenceNotZero { details, .. }
            | Self::Api { details, .. }
            | Self::Server { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` for failures a caller may reasonably retry.
    /// The library itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Server | ErrorKind::Transport | ErrorKind::Timeout
        ) && !matches!(self, Self::JobTimeout { .. } | Self::Server { status: 501, .. })
    }

    /// Attach the entity type and identifier to a bare 404.
    pub(crate) fn for_entity(self, entity_type: &str, identifier: &str) -> Self {
        match self {
            Self::NotFound { code, details, .. } => Self::NotFound {
                entity_type: entity_type.to_owned(),
                identifier: identifier.to_owned(),
                code,
                details,
            },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

const NAME_CONFLICT_TYPES: &[&str] = &["Name Not Unique", "Object Already Exists"];
const REFERENCE_NOT_ZERO: &str = "Reference Not Zero";

impl From<scm_api::Error> for CoreError {
    fn from(err: scm_api::Error) -> Self {
        match err {
            scm_api::Error::Authentication { message } => CoreError::AuthenticationFailed {
                message,
                status: None,
            },
            scm_api::Error::Unauthorized { status, message } => CoreError::AuthenticationFailed {
                message,
                status: Some(status),
            },
            scm_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::RequestTimeout {
                        reason: e.to_string(),
                    }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else if e.is_decode() {
                    CoreError::ResponseShape {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url: e.url().map(ToString::to_string).unwrap_or_default(),
                        reason: e.to_string(),
                    }
                }
            }
            scm_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            scm_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            scm_api::Error::Api {
                status,
                message,
                code,
                error_type,
                details,
            } => from_api_error(status, message, code, error_type, details),
            scm_api::Error::Deserialization { message, body: _ } => {
                CoreError::ResponseShape { message }
            }
        }
    }
}

fn from_api_error(
    status: u16,
    message: String,
    code: Option<String>,
    error_type: Option<String>,
    details: Option<Value>,
) -> CoreError {
    let kind = error_type.as_deref();

    if kind == Some(REFERENCE_NOT_ZERO) {
        return CoreError::ReferenceNotZero {
            message,
            status,
            code,
            details,
        };
    }
    if kind.is_some_and(|k| NAME_CONFLICT_TYPES.contains(&k)) {
        return CoreError::NameConflict {
            message,
            status,
            code,
            details,
        };
    }

    match status {
        404 => CoreError::NotFound {
            entity_type: "Object".into(),
            identifier: message,
            code,
            details,
        },
        500..=599 => CoreError::Server {
            message,
            status,
            code,
            details,
        },
        _ => CoreError::Api {
            message,
            status,
            code,
            error_type,
            details,
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn api(status: u16, error_type: Option<&str>) -> scm_api::Error {
        scm_api::Error::Api {
            status,
            message: "msg".into(),
            code: Some("E009".into()),
            error_type: error_type.map(str::to_owned),
            details: Some(json!({ "errorType": error_type })),
        }
    }

    #[test]
    fn reference_not_zero_is_a_conflict() {
        let err = CoreError::from(api(409, Some("Reference Not Zero")));
        assert!(matches!(err, CoreError::ReferenceNotZero { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.code(), "E009");
        assert_eq!(err.http_status(), Some(409));
        assert!(err.details().is_some());
    }

    #[test]
    fn name_not_unique_maps_to_name_conflict_even_on_400() {
        let err = CoreError::from(api(400, Some("Name Not Unique")));
        assert!(matches!(err, CoreError::NameConflict { status: 400, .. }));
    }

    #[test]
    fn server_errors_are_retryable_except_not_implemented() {
        let gateway = CoreError::from(api(504, None));
        assert_eq!(gateway.kind(), ErrorKind::Server);
        assert!(gateway.is_retryable());

        let not_implemented = CoreError::from(api(501, None));
        assert!(!not_implemented.is_retryable());
    }

    #[test]
    fn validation_errors_carry_stable_codes() {
        let err = CoreError::InvalidContainer { provided: 2 };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "missing_or_conflicting_container");
        assert_eq!(err.http_status(), None);
        assert!(!err.is_retryable());
    }

    #[test]
    fn not_found_gets_entity_context() {
        let err = CoreError::from(api(404, None)).for_entity("Address", "abc");
        assert_eq!(err.to_string(), "Address not found: abc");
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
    }
}
