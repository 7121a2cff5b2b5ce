//! HTTP client module with token handling, retry logic and error classification.

mod client;
pub mod csrf;
pub mod error;
pub mod request;
pub mod retry;
pub mod transport;

pub use client::ApiClient;
pub use csrf::CsrfTokenCache;
pub use error::{ApiError, ApiErrorKind};
pub use request::{FilePart, RequestBody, RequestDescriptor};
pub use retry::{RetryPolicy, with_retry};
pub use transport::{PreparedRequest, RawResponse, ReqwestTransport, Transport, TransportError};
