//! API client: token injection, deadlines, retry and error normalization.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::csrf::CsrfTokenCache;
use super::error::{ApiError, classify};
use super::request::{CSRF_HEADER, FilePart, RequestDescriptor, join_url};
use super::retry::{RetryPolicy, with_retry};
use super::transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::session::{SessionSource, mask_token};

/// Client shared by every endpoint group. Cloning is cheap and clones share
/// the transport, session source and CSRF cache.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionSource>,
    csrf: Arc<CsrfTokenCache>,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Creates a client backed by reqwest.
    pub fn new(config: ClientConfig, session: Arc<dyn SessionSource>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::from_config(&config)
            .map_err(|e| ApiError::configuration(e.to_string()))?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    /// Creates a client over any [`Transport`]. Each client owns its own CSRF cache.
    pub fn with_transport(
        config: ClientConfig,
        session: Arc<dyn SessionSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let csrf = CsrfTokenCache::new(
            Arc::clone(&transport),
            &config.base_url,
            &config.csrf_path,
            config.timeout,
        );
        Self {
            retry: RetryPolicy::from_config(&config),
            config: Arc::new(config),
            transport,
            session,
            csrf: Arc::new(csrf),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn csrf(&self) -> &CsrfTokenCache {
        &self.csrf
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(RequestDescriptor::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(RequestDescriptor::post(path).json(body)?).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(RequestDescriptor::put(path).json(body)?).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(RequestDescriptor::patch(path).json(body)?).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(RequestDescriptor::delete(path)).await
    }

    /// POSTs files as multipart form data.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FilePart>,
    ) -> Result<T, ApiError> {
        self.send(RequestDescriptor::post(path).multipart(parts)).await
    }

    /// Performs one logical call and decodes the response body.
    ///
    /// Tokens are resolved once; retries resubmit the same prepared request.
    /// A 401 on an authenticated call gets exactly one resubmission if the
    /// session source can refresh its token. A 403 on a call that carried a
    /// CSRF token drops the cached token for subsequent calls.
    #[tracing::instrument(skip(self, descriptor), fields(method = %descriptor.method, path = %descriptor.path))]
    pub async fn send<T: DeserializeOwned>(
        &self,
        descriptor: RequestDescriptor,
    ) -> Result<T, ApiError> {
        let timeout = descriptor.timeout.unwrap_or(self.config.timeout);
        let operation = format!("{} {}", descriptor.method, descriptor.path);

        let access_token = self.session.access_token().await;
        let authenticated = access_token.is_some();
        let prepared = self.prepare(&descriptor, access_token).await?;
        let mut sent_csrf = prepared.headers.contains_key(CSRF_HEADER);
        let mut outcome = self.execute_with_retry(&prepared, timeout, &operation).await;

        if authenticated && matches!(&outcome, Err(e) if e.status == Some(401)) {
            if let Some(token) = self.session.refresh_access_token().await {
                debug!("{}: retrying once with refreshed access token", operation);
                let prepared = self.prepare(&descriptor, Some(token)).await?;
                sent_csrf = prepared.headers.contains_key(CSRF_HEADER);
                outcome = self.execute_with_retry(&prepared, timeout, &operation).await;
            }
        }

        match outcome {
            Ok(response) => classify(response),
            Err(e) => {
                if e.status == Some(403) && sent_csrf {
                    self.csrf.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Resolves headers and URL for a descriptor.
    async fn prepare(
        &self,
        descriptor: &RequestDescriptor,
        access_token: Option<String>,
    ) -> Result<PreparedRequest, ApiError> {
        let mut headers = descriptor.headers.clone();

        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        // Multipart bodies get their boundary from the transport.
        if !descriptor.is_multipart() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(token) = access_token {
            let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::configuration(format!("Invalid access token: {}", e)))?;
            auth_value.set_sensitive(true);
            headers.insert(AUTHORIZATION, auth_value);
            debug!("Using access token {}", mask_token(&token));
        }

        if descriptor.is_mutating() {
            match self.csrf.get_token().await {
                Ok(token) => {
                    let value = HeaderValue::from_str(&token).map_err(|e| {
                        ApiError::configuration(format!("Invalid CSRF token: {}", e))
                    })?;
                    headers.insert(HeaderName::from_static(CSRF_HEADER), value);
                }
                Err(e) => warn!("{}; sending request without CSRF token", e),
            }
        }

        Ok(PreparedRequest {
            method: descriptor.method.clone(),
            url: join_url(&self.config.base_url, &descriptor.path),
            query: descriptor.query.clone(),
            headers,
            body: descriptor.prepared_body()?,
        })
    }

    async fn execute_with_retry(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
        operation: &str,
    ) -> Result<RawResponse, ApiError> {
        with_retry(self.retry, operation, || async move {
            let response = self.execute_once(request, timeout).await?;
            if (200..300).contains(&response.status) {
                Ok(response)
            } else {
                Err(ApiError::from_status(response.status, &response.body))
            }
        })
        .await
    }

    /// Runs a single attempt under the deadline. On elapse the in-flight
    /// transport future is dropped, which aborts the request.
    async fn execute_once(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
    ) -> Result<RawResponse, ApiError> {
        match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(ApiError::from(e)),
            Err(_) => {
                warn!("{} {} timed out after {:?}", request.method, request.url, timeout);
                Err(ApiError::timeout())
            }
        }
    }
}
