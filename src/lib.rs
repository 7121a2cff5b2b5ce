//! Client for the scriptmarket backend API.
//!
//! Every endpoint group funnels through [`ApiClient`], which attaches the
//! session's bearer token, fetches and caches the CSRF token for mutating
//! calls, bounds each attempt with a deadline, retries transient failures
//! with linear backoff and normalizes every failure into an [`ApiError`].

pub mod api;
pub mod config;
pub mod http;
pub mod session;

pub use config::ClientConfig;
pub use http::{ApiClient, ApiError, ApiErrorKind};
pub use session::{AnonymousSession, SessionSource, StaticSession};
