use thiserror::Error;

/// Message shown for payloads that claim success but cannot be read.
pub const GENERIC_LOAD_FAILURE: &str = "Could not load content";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    /// HTTP 2xx whose envelope reported failure (`success: false` or `code != 0`).
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Coarse classification used by the cache and screen layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkFailure,
    ServerRejection,
    MalformedResponse,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::Rejected(format!("Status {}: {}", status, truncated)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout | ApiError::NetworkError(_) => ErrorKind::NetworkFailure,
            ApiError::InvalidResponse(_) => ErrorKind::MalformedResponse,
            ApiError::Unauthorized
            | ApiError::AccessDenied(_)
            | ApiError::NotFound(_)
            | ApiError::RateLimited
            | ApiError::ServerError(_)
            | ApiError::Rejected(_) => ErrorKind::ServerRejection,
        }
    }

    /// Whether the user should be offered a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout
                | ApiError::NetworkError(_)
                | ApiError::RateLimited
                | ApiError::ServerError(_)
        )
    }

    /// Text suitable for a transient notice after a user-initiated action.
    ///
    /// Server messages are passed through; malformed payloads and transport
    /// failures get generic wording so raw details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Rejected(msg) if !msg.trim().is_empty() => msg.clone(),
            ApiError::Timeout | ApiError::NetworkError(_) => {
                format!("{}. Check your connection and try again.", GENERIC_LOAD_FAILURE)
            }
            ApiError::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            ApiError::RateLimited => "Too many requests. Please wait a moment.".to_string(),
            _ => GENERIC_LOAD_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_mapping() {
        assert_eq!(ApiError::from_status(StatusCode::UNAUTHORIZED, ""), ApiError::Unauthorized);
        assert_eq!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, ""), ApiError::RateLimited);
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "gone"),
            ApiError::NotFound(ref b) if b == "gone"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            ApiError::ServerError(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_REQUEST, "bad"),
            ApiError::Rejected(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        let body = "é".repeat(300);
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.contains("truncated"));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ApiError::Timeout.kind(), ErrorKind::NetworkFailure);
        assert_eq!(ApiError::NetworkError("reset".into()).kind(), ErrorKind::NetworkFailure);
        assert_eq!(ApiError::Rejected("no".into()).kind(), ErrorKind::ServerRejection);
        assert_eq!(ApiError::ServerError("500".into()).kind(), ErrorKind::ServerRejection);
        assert_eq!(ApiError::InvalidResponse("x".into()).kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_user_message() {
        assert_eq!(ApiError::Rejected("Group is full".into()).user_message(), "Group is full");
        assert_eq!(ApiError::Rejected("  ".into()).user_message(), GENERIC_LOAD_FAILURE);
        assert_eq!(
            ApiError::InvalidResponse("missing field".into()).user_message(),
            GENERIC_LOAD_FAILURE
        );
        assert!(ApiError::Timeout.user_message().starts_with(GENERIC_LOAD_FAILURE));
    }

    #[test]
    fn test_is_retryable() {
        assert!(ApiError::Timeout.is_retryable());
        assert!(ApiError::ServerError("boom".into()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::InvalidResponse("x".into()).is_retryable());
    }
}
