//! The network seam: executes one prepared request and reports what came back.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest::multipart::{Form, Part};

use super::request::{FilePart, PreparedBody};
use crate::config::ClientConfig;

/// A request with every header resolved, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: PreparedBody,
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// The transport failed before an HTTP status was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request could not be built: bad URL, bad MIME type. Never sent.
    Build(String),
    /// The exchange failed on the wire.
    Network(String),
}

impl TransportError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::Build(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Build(message) | Self::Network(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for TransportError {}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by reqwest, with a cookie store so the CSRF cookie
/// issued alongside the token is sent back on every call.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| TransportError::Build(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::new(client))
    }
}

fn multipart_form(parts: &[FilePart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for part in parts {
        let mut file = Part::bytes(part.bytes.clone()).file_name(part.file_name.clone());
        if let Some(mime) = &part.mime_type {
            file = file
                .mime_str(mime)
                .map_err(|e| TransportError::Build(format!("Invalid MIME type {}: {}", mime, e)))?;
        }
        form = form.part(part.field.clone(), file);
    }
    Ok(form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: &PreparedRequest) -> Result<RawResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match &request.body {
            PreparedBody::Empty => builder,
            PreparedBody::Json(bytes) => builder.body(bytes.clone()),
            PreparedBody::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                TransportError::Network(format!("Failed to read response body: {}", e))
            })?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
