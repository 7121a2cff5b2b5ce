//! Anti-forgery token cache.
//!
//! One token is fetched lazily on the first mutating call and reused until
//! it is invalidated. Acquisition is single-flight: the lock is held across
//! the fetch, so callers that arrive while a fetch is in progress wait for it
//! and reuse its token instead of issuing their own.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use tokio::sync::Mutex;

use super::error::{ApiError, ApiErrorKind, CSRF_INIT_MESSAGE, classify};
use super::request::{PreparedBody, join_url};
use super::transport::{PreparedRequest, Transport};

#[derive(Deserialize)]
struct CsrfTokenResponse {
    #[serde(alias = "csrfToken")]
    token: String,
}

pub struct CsrfTokenCache {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
    token: Mutex<Option<String>>,
}

impl CsrfTokenCache {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str, path: &str, timeout: Duration) -> Self {
        Self {
            transport,
            url: join_url(base_url, path),
            timeout,
            token: Mutex::new(None),
        }
    }

    /// Returns the cached token, fetching it first if none is cached.
    #[tracing::instrument(skip(self))]
    pub async fn get_token(&self) -> Result<String, ApiError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        debug!("Fetching CSRF token from {}...", self.url);
        let token = self.fetch().await.map_err(|e| {
            warn!("CSRF token fetch failed: {}", e);
            ApiError {
                kind: e.kind,
                message: CSRF_INIT_MESSAGE.to_string(),
                status: e.status,
                code: e.code,
            }
        })?;

        *slot = Some(token.clone());
        Ok(token)
    }

    /// The cached token, if any, without fetching.
    pub async fn cached(&self) -> Option<String> {
        self.token.lock().await.clone()
    }

    /// Drops the cached token so the next mutating call fetches a fresh one.
    pub async fn invalidate(&self) {
        if self.token.lock().await.take().is_some() {
            debug!("CSRF token invalidated");
        }
    }

    async fn fetch(&self) -> Result<String, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let request = PreparedRequest {
            method: Method::GET,
            url: self.url.clone(),
            query: Vec::new(),
            headers,
            body: PreparedBody::Empty,
        };

        let response = tokio::time::timeout(self.timeout, self.transport.execute(&request))
            .await
            .map_err(|_| ApiError::timeout())?
            .map_err(ApiError::from)?;

        let body: CsrfTokenResponse = classify(response)?;
        if body.token.is_empty() {
            return Err(ApiError::new(ApiErrorKind::Decode, "empty CSRF token"));
        }
        Ok(body.token)
    }
}
