use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::http::{ApiClient, ApiError};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// `playwright`, `theater` or `admin`.
    pub role: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response to a password login: a one-time code has been sent.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    #[serde(default)]
    pub otp_required: bool,
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: Option<Identity>,
}

/// The signed-in identity.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    #[serde(default)]
    pub verified: bool,
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Identity, ApiError> {
        self.client.post("/auth/register", request).await
    }

    /// Checks credentials; the server answers by issuing a one-time code.
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<OtpChallenge, ApiError> {
        self.client.post("/auth/login", request).await
    }

    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<AuthTokens, ApiError> {
        self.client
            .post(
                "/auth/verify-otp",
                &serde_json::json!({ "email": email, "otp": code }),
            )
            .await
    }

    /// Ends the server-side session. Any response body is ignored.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .client
            .post("/auth/logout", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<Identity, ApiError> {
        self.client.get("/auth/me").await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        self.client
            .post(
                "/auth/refresh",
                &serde_json::json!({ "refreshToken": refresh_token }),
            )
            .await
    }
}
