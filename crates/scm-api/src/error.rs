use serde_json::Value;
use thiserror::Error;

/// Top-level error type for the `scm-api` crate.
///
/// Covers every failure mode of the transport surface: OAuth2 token
/// acquisition, HTTP transport, structured API errors, and response decoding.
/// `scm-core` maps these into user-facing error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Token acquisition failed (bad client credentials, unknown TSG, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API rejected a bearer token that could not be renewed.
    #[error("Access token rejected (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Structured error from the SCM API (parsed from the `_errors` envelope).
    #[error("SCM API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Server error code, e.g. `"E006"`.
        code: Option<String>,
        /// `details.errorType`, e.g. `"Reference Not Zero"`.
        error_type: Option<String>,
        details: Option<Value>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the failure came from credentials or token handling.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::Unauthorized { .. })
    }

    /// Returns `true` if this is a transient error worth retrying by the caller.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Extract `details.errorType`, if available.
    pub fn api_error_type(&self) -> Option<&str> {
        match self {
            Self::Api { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    fn api(status: u16) -> Error {
        Error::Api {
            status,
            message: "boom".into(),
            code: None,
            error_type: None,
            details: None,
        }
    }

    #[test]
    fn gateway_errors_are_transient() {
        assert!(api(504).is_transient());
        assert!(api(502).is_transient());
        assert!(!api(500).is_transient());
        assert!(!api(400).is_transient());
    }

    #[test]
    fn not_found_is_detected_from_status() {
        assert!(api(404).is_not_found());
        assert!(!api(409).is_not_found());
        assert_eq!(api(409).status(), Some(409));
    }
}
