//! Request descriptors: what a logical call asks for, before tokens are resolved.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use super::error::ApiError;

/// Header carrying the anti-forgery token on mutating calls.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Header carrying the per-call deduplication key on non-idempotent writes.
pub const IDEMPOTENCY_HEADER: &str = "idempotency-key";

/// A file sent as one part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FilePart>),
}

/// Body in wire form. Multipart stays as parts; the transport builds the form
/// per attempt so a retried request is byte-for-byte the same.
#[derive(Debug, Clone, PartialEq)]
pub enum PreparedBody {
    Empty,
    Json(Vec<u8>),
    Multipart(Vec<FilePart>),
}

/// One logical call: method, path, query, extra headers, body and deadline.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Overrides the client-wide timeout when set.
    pub timeout: Option<Duration>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::configuration(format!("Failed to serialize body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FilePart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    /// Appends query pairs, skipping `None` values.
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, Option<V>)>) -> Self
    where
        K: Into<String>,
        V: ToString,
    {
        for (key, value) in pairs {
            if let Some(value) = value {
                self.query.push((key.into(), value.to_string()));
            }
        }
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Result<Self, ApiError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::configuration(format!("Invalid {} header: {}", name, e)))?;
        self.headers.insert(HeaderName::from_static(name), value);
        Ok(self)
    }

    /// Tags the call with a fresh deduplication key. The key is fixed for the
    /// lifetime of the descriptor, so every retry of this call repeats it.
    pub fn idempotent(mut self) -> Self {
        let key = uuid::Uuid::new_v4().hyphenated().to_string();
        if let Ok(value) = HeaderValue::from_str(&key) {
            self.headers
                .insert(HeaderName::from_static(IDEMPOTENCY_HEADER), value);
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// POST, PUT, PATCH and DELETE change server state and need a CSRF token.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self.method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        )
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, RequestBody::Multipart(_))
    }

    pub(crate) fn prepared_body(&self) -> Result<PreparedBody, ApiError> {
        Ok(match &self.body {
            RequestBody::Empty => PreparedBody::Empty,
            RequestBody::Json(value) => PreparedBody::Json(
                serde_json::to_vec(value)
                    .map_err(|e| ApiError::configuration(format!("Failed to encode body: {}", e)))?,
            ),
            RequestBody::Multipart(parts) => PreparedBody::Multipart(parts.clone()),
        })
    }
}

/// Joins the base URL and a path with exactly one slash between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
