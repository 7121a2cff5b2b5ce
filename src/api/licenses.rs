use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::http::{ApiClient, ApiError, RequestDescriptor};

/// A performance license held by a theater.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub id: String,
    pub script_id: String,
    pub script_title: Option<String>,
    /// `single`, `run` or `unlimited`.
    pub license_type: String,
    pub status: Option<String>,
    pub price: Option<f64>,
    #[serde(default)]
    pub performance_dates: Vec<String>,
    pub venue: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewLicense {
    pub script_id: String,
    pub license_type: String,
    pub payment_intent_id: Option<String>,
    pub performance_dates: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    #[serde(alias = "downloadUrl")]
    pub url: String,
    pub expires_at: Option<String>,
}

pub struct LicensesApi<'a> {
    client: &'a ApiClient,
}

impl<'a> LicensesApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<License>, ApiError> {
        self.client.get("/licenses").await
    }

    /// Creates a license. Tagged with an idempotency key so a retried
    /// submission cannot produce a second license.
    #[tracing::instrument(skip(self, license), fields(script_id = %license.script_id))]
    pub async fn create(&self, license: &NewLicense) -> Result<License, ApiError> {
        self.client
            .send(RequestDescriptor::post("/licenses").json(license)?.idempotent())
            .await
    }

    pub async fn get(&self, id: &str) -> Result<License, ApiError> {
        self.client.get(&format!("/licenses/{}", encode(id))).await
    }

    pub async fn download_url(&self, id: &str) -> Result<DownloadLink, ApiError> {
        self.client
            .get(&format!("/licenses/{}/download", encode(id)))
            .await
    }

    pub async fn update_performance_dates(
        &self,
        id: &str,
        dates: &[String],
    ) -> Result<License, ApiError> {
        self.client
            .patch(
                &format!("/licenses/{}/performance-dates", encode(id)),
                &serde_json::json!({ "performanceDates": dates }),
            )
            .await
    }
}
