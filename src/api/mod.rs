//! Endpoint groups.
//!
//! Each group declares only paths, methods and payload shapes. Tokens,
//! deadlines, retries and error shaping all happen in [`ApiClient`], which
//! every call goes through.

pub mod admin;
pub mod auth;
pub mod licenses;
pub mod payments;
pub mod profile;
pub mod scripts;

use serde::{Deserialize, Serialize};

use crate::http::ApiClient;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use licenses::LicensesApi;
pub use payments::PaymentsApi;
pub use profile::ProfileApi;
pub use scripts::ScriptsApi;

/// Generic acknowledgement body (`{"success": true, "message": "..."}`).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    pub fn profile(&self) -> ProfileApi<'_> {
        ProfileApi::new(self)
    }

    pub fn scripts(&self) -> ScriptsApi<'_> {
        ScriptsApi::new(self)
    }

    pub fn licenses(&self) -> LicensesApi<'_> {
        LicensesApi::new(self)
    }

    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(self)
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::ClientConfig;
    use crate::http::ApiClient;
    use crate::session::StaticSession;

    /// Client pointed at a mockito server, signed in with `test-token`.
    pub fn client(url: &str) -> ApiClient {
        ApiClient::new(
            ClientConfig::new(url).with_retry_base_delay(Duration::from_millis(10)),
            Arc::new(StaticSession::new(Some("test-token".to_string()))),
        )
        .unwrap()
    }

    pub async fn csrf(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/csrf-token")
            .with_status(200)
            .with_body(r#"{"token": "csrf-1"}"#)
            .create_async()
            .await
    }
}
