use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response reached the client (offline, DNS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The access token was rejected (HTTP 401).
    #[error("Unauthorized - access token expired or invalid")]
    Unauthorized,

    /// The refresh call itself failed. Always fatal to the session.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),

    /// Any other non-2xx response, passed through to the caller.
    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Structured error body the backend sends alongside failure statuses.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// The server's structured `{"message": ...}` field, if the body has one.
    pub fn server_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            code => {
                let message = Self::server_message(body)
                    .unwrap_or_else(|| Self::truncate_body(body));
                ApiError::Http {
                    status: code,
                    message,
                }
            }
        }
    }

    /// Human-readable message for toast-style notifications.
    ///
    /// Prefers the structured server message, then the transport message,
    /// then the supplied fallback. Never panics.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Http { message, .. } if !message.is_empty() => message.clone(),
            ApiError::RefreshFailed(message) if !message.is_empty() => message.clone(),
            ApiError::Network(e) => e.to_string(),
            ApiError::Unauthorized => self.to_string(),
            ApiError::InvalidResponse(message) if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_401_is_unauthorized() {
        let err = ApiError::from_status(reqwest::StatusCode::UNAUTHORIZED, "whatever");
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[test]
    fn test_from_status_extracts_server_message() {
        let err = ApiError::from_status(
            reqwest::StatusCode::NOT_FOUND,
            r#"{"message": "Card not found"}"#,
        );
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Card not found");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn test_from_status_falls_back_to_body() {
        let err = ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ApiError::Http { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = ApiError::Http {
            status: 409,
            message: "Title already taken".to_string(),
        };
        assert_eq!(err.user_message("fallback"), "Title already taken");
    }

    #[test]
    fn test_user_message_uses_fallback_for_empty() {
        let err = ApiError::Http {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message("Something went wrong"), "Something went wrong");
    }

    #[test]
    fn test_user_message_refresh_failed() {
        let err = ApiError::RefreshFailed("Session timed out".to_string());
        assert_eq!(err.user_message("fallback"), "Session timed out");
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(600);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        match err {
            ApiError::Http { message, .. } => {
                assert!(message.contains("truncated"));
                assert!(message.contains("600 total bytes"));
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }
}
