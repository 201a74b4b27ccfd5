//! Error types and helpers for mapping HTTP/reqwest failures.

use std::time::Duration;

/// Errors returned by the Ollama generate client.
#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    /// Network-level error (connection refused, connection reset, DNS failure).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// Request timed out.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Requested model does not exist on the server.
    #[error("model not found: {0}")]
    ModelNotFound(String),
    /// Malformed or invalid request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Ollama service is temporarily unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// The stream terminated with a transport failure.
    #[error("stream error: {0}")]
    Stream(String),
}

impl OllamaError {
    /// Whether this error is likely transient.
    ///
    /// Classification only. The client never retries on its own; callers that
    /// want retry behavior decide based on this.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::ServiceUnavailable(_)
        )
    }
}

/// Map an HTTP status code from the Ollama API to an [`OllamaError`].
///
/// Reference: <https://github.com/ollama/ollama/blob/main/docs/api.md>
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> OllamaError {
    match status.as_u16() {
        404 => OllamaError::ModelNotFound(body.to_string()),
        400 => OllamaError::InvalidRequest(body.to_string()),
        500..=599 => OllamaError::ServiceUnavailable(body.to_string()),
        _ => OllamaError::InvalidRequest(format!("HTTP {status}: {body}")),
    }
}

/// Map a [`reqwest::Error`] to an [`OllamaError`].
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> OllamaError {
    if err.is_timeout() {
        OllamaError::Timeout(Duration::from_secs(30))
    } else {
        OllamaError::Network(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_404_maps_to_model_not_found() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "model 'foo' not found");
        assert!(matches!(err, OllamaError::ModelNotFound(msg) if msg == "model 'foo' not found"));
    }

    #[test]
    fn status_400_maps_to_invalid_request() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "bad body");
        assert!(matches!(err, OllamaError::InvalidRequest(msg) if msg == "bad body"));
    }

    #[test]
    fn status_5xx_maps_to_service_unavailable() {
        for code in [500u16, 502, 503, 599] {
            let status = reqwest::StatusCode::from_u16(code).expect("valid status");
            let err = map_http_status(status, "unavailable");
            assert!(
                matches!(err, OllamaError::ServiceUnavailable(_)),
                "expected ServiceUnavailable for {code}"
            );
        }
    }

    #[test]
    fn unknown_status_maps_to_invalid_request_with_status() {
        let err = map_http_status(reqwest::StatusCode::FORBIDDEN, "forbidden");
        match err {
            OllamaError::InvalidRequest(msg) => {
                assert!(msg.contains("403"), "expected status in message: {msg}");
                assert!(msg.contains("forbidden"), "expected body in message: {msg}");
            }
            other => panic!("expected InvalidRequest, got: {other:?}"),
        }
    }

    #[test]
    fn status_5xx_errors_are_retryable() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "internal error");
        assert!(err.is_retryable());
    }

    #[test]
    fn status_404_errors_are_not_retryable() {
        let err = map_http_status(reqwest::StatusCode::NOT_FOUND, "not found");
        assert!(!err.is_retryable());
    }

    #[test]
    fn stream_errors_are_not_retryable() {
        let err = OllamaError::Stream("connection dropped".into());
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, OllamaError::InvalidRequest(msg) if msg.is_empty()));
    }
}
