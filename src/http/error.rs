//! Uniform failure shape for every API call.

use serde::Deserialize;

use super::transport::{RawResponse, TransportError};

/// Message used when a deadline elapses before a response arrives.
pub const TIMEOUT_MESSAGE: &str = "Request timeout - check your connection";

/// Message used when no CSRF token could be obtained.
pub const CSRF_INIT_MESSAGE: &str = "Unable to initialize secure connection";

/// Root cause of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The transport failed before any HTTP status was obtained.
    Connection,
    /// The request deadline elapsed.
    Timeout,
    /// HTTP 4xx.
    Client,
    /// HTTP 5xx.
    Server,
    /// A 2xx body did not match the expected shape.
    Decode,
    /// The request could not be built (bad URL, bad header value).
    Configuration,
}

/// Typed error surfaced to callers of the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
    pub status: Option<u16>,
    pub code: Option<String>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            code: None,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Connection, message)
    }

    pub fn timeout() -> Self {
        Self::new(ApiErrorKind::Timeout, TIMEOUT_MESSAGE)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Configuration, message)
    }

    /// Builds an error from a non-2xx status, preferring the server's own message.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let kind = if status >= 500 {
            ApiErrorKind::Server
        } else {
            ApiErrorKind::Client
        };

        let (message, code) = match parse_error_body(body) {
            Some((message, code)) => (message, code),
            None => (format!("HTTP {}", status), None),
        };

        Self {
            kind,
            message,
            status: Some(status),
            code,
        }
    }

    fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Connection failures, timeouts and 5xx responses may succeed on resubmission.
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            ApiErrorKind::Connection | ApiErrorKind::Timeout => true,
            ApiErrorKind::Server => true,
            ApiErrorKind::Client | ApiErrorKind::Decode | ApiErrorKind::Configuration => false,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ApiErrorKind::Connection => write!(f, "Connection error: {}", self.message),
            ApiErrorKind::Decode => write!(f, "Unexpected response: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Build(message) => Self::configuration(message),
            TransportError::Network(message) => Self::connection(message),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
    message: Option<String>,
    code: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

/// Accepts `{"error": {"message", "code"}}` and the flat `{"message", "code"}` shape.
fn parse_error_body(body: &[u8]) -> Option<(String, Option<String>)> {
    let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
    match envelope.error {
        Some(ErrorDetail {
            message: Some(message),
            code,
        }) => Some((message, code.or(envelope.code))),
        _ => envelope.message.map(|message| (message, envelope.code)),
    }
}

/// Normalizes a transport outcome into a typed payload or an [`ApiError`].
pub fn classify<T: serde::de::DeserializeOwned>(response: RawResponse) -> Result<T, ApiError> {
    if !(200..300).contains(&response.status) {
        return Err(ApiError::from_status(response.status, &response.body));
    }

    // 204 and empty bodies decode as JSON null so `()` and `Option<T>` succeed.
    if response.status == 204 || response.body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_value(serde_json::Value::Null).map_err(|e| {
            ApiError::decode(format!("empty response body ({})", e))
                .with_status(response.status)
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::decode(e.to_string()).with_status(response.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_classify_success_payload() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Script {
            id: String,
        }

        let script: Script = classify(raw(200, r#"{"id": "123"}"#)).unwrap();
        assert_eq!(script.id, "123");
    }

    #[test]
    fn test_classify_no_content_is_void() {
        let result: Result<(), ApiError> = classify(raw(204, ""));
        assert!(result.is_ok());

        let result: Result<Option<serde_json::Value>, ApiError> = classify(raw(200, ""));
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_classify_nested_error_message() {
        let err = classify::<serde_json::Value>(raw(
            400,
            r#"{"error": {"message": "Invalid request", "code": "BAD_INPUT"}}"#,
        ))
        .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Client);
        assert_eq!(err.message, "Invalid request");
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("BAD_INPUT"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_flat_error_message() {
        let err = classify::<serde_json::Value>(raw(404, r#"{"message": "Script not found"}"#))
            .unwrap_err();
        assert_eq!(err.message, "Script not found");
        assert_eq!(err.status, Some(404));
    }

    #[test]
    fn test_classify_unparseable_error_falls_back_to_status() {
        let err = classify::<serde_json::Value>(raw(502, "<html>Bad Gateway</html>")).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert_eq!(err.message, "HTTP 502");
        assert_eq!(err.status, Some(502));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_decode_error_is_not_retryable() {
        #[derive(serde::Deserialize, Debug)]
        #[allow(dead_code)]
        struct Script {
            id: String,
        }

        let err = classify::<Script>(raw(200, r#"{"title": "no id"}"#)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ApiError::connection("reset").is_retryable());
        assert!(ApiError::timeout().is_retryable());
        assert!(!ApiError::configuration("bad url").is_retryable());
    }

    #[test]
    fn test_transport_error_kinds() {
        let build = ApiError::from(TransportError::Build("builder error".to_string()));
        assert_eq!(build.kind, ApiErrorKind::Configuration);
        assert!(!build.is_retryable());

        let network = ApiError::from(TransportError::Network("connection reset".to_string()));
        assert_eq!(network.kind, ApiErrorKind::Connection);
        assert!(network.is_retryable());
    }

    #[test]
    fn test_display() {
        assert!(ApiError::timeout().to_string().contains("timeout"));
        assert!(
            ApiError::connection("refused")
                .to_string()
                .starts_with("Connection error")
        );
        let err = ApiError::from_status(400, br#"{"error": {"message": "Invalid request"}}"#);
        assert_eq!(err.to_string(), "Invalid request");
    }
}
