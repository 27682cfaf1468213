//! Gateway-related errors.

use thiserror::Error;

/// Errors that can occur when talking to the backend gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP transport failed before a response arrived.
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway rejected the bearer token (401 or 403).
    ///
    /// Callers must treat this as session expiry: clear stored session data
    /// and send the user back to login, regardless of which feature made
    /// the call.
    #[error("gateway rejected the session token")]
    Unauthorized,

    /// Any other non-success response.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON shape.
    #[error("gateway response parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl GatewayError {
    /// Whether this error means the session is no longer valid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Best-effort extraction of a human-readable message from an error body.
///
/// The backend services are inconsistent: some return `{"message": ...}`,
/// some `{"error": ...}`, some plain text, some nothing. Mirrors the
/// fallback chain the call sites expect.
pub(crate) fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(msg) = value.get(key).and_then(serde_json::Value::as_str)
                && !msg.is_empty()
            {
                return msg.to_owned();
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "unknown error".to_owned()
    } else {
        // Cap pathological bodies (HTML error pages and the like)
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_field() {
        assert_eq!(
            extract_error_message(r#"{"message": "stock not enough"}"#),
            "stock not enough"
        );
    }

    #[test]
    fn test_extract_error_field() {
        assert_eq!(
            extract_error_message(r#"{"error": "duplicate username"}"#),
            "duplicate username"
        );
    }

    #[test]
    fn test_extract_prefers_message_over_error() {
        assert_eq!(
            extract_error_message(r#"{"error": "e", "message": "m"}"#),
            "m"
        );
    }

    #[test]
    fn test_extract_plain_text_body() {
        assert_eq!(extract_error_message("  bad request  "), "bad request");
    }

    #[test]
    fn test_extract_empty_body_falls_back() {
        assert_eq!(extract_error_message(""), "unknown error");
        assert_eq!(extract_error_message("   "), "unknown error");
    }

    #[test]
    fn test_extract_truncates_long_bodies() {
        let long = "x".repeat(1000);
        assert_eq!(extract_error_message(&long).len(), 200);
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "gateway returned 500: boom");
        assert!(GatewayError::Unauthorized.is_unauthorized());
        assert!(!err.is_unauthorized());
    }
}
