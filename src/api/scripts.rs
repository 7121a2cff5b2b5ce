use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::http::{ApiClient, ApiError, FilePart, RequestDescriptor};

/// A script record in the catalog.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub id: String,
    pub title: String,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
    pub genre: Option<String>,
    pub synopsis: Option<String>,
    pub cast_size: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub price: Option<f64>,
    pub status: Option<String>,
    pub file_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub average_rating: Option<f64>,
}

/// Fields for creating or updating a script.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cast_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// Catalog search filters; unset filters are left out of the query string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptFilters {
    pub search: Option<String>,
    pub genre: Option<String>,
    pub min_cast: Option<u32>,
    pub max_cast: Option<u32>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub reviewer_name: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewReview {
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Location of an uploaded script file or cover image.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub url: String,
}

pub struct ScriptsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ScriptsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filters: &ScriptFilters) -> Result<Vec<Script>, ApiError> {
        let descriptor = RequestDescriptor::get("/scripts")
            .query([
                ("search", filters.search.clone()),
                ("genre", filters.genre.clone()),
                ("sort", filters.sort.clone()),
            ])
            .query([
                ("minCast", filters.min_cast),
                ("maxCast", filters.max_cast),
                ("page", filters.page),
                ("limit", filters.limit),
            ]);
        self.client.send(descriptor).await
    }

    pub async fn get(&self, id: &str) -> Result<Script, ApiError> {
        self.client.get(&format!("/scripts/{}", encode(id))).await
    }

    /// Scripts owned by the signed-in playwright.
    pub async fn mine(&self) -> Result<Vec<Script>, ApiError> {
        self.client.get("/scripts/my-scripts").await
    }

    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: &ScriptDraft) -> Result<Script, ApiError> {
        self.client
            .send(RequestDescriptor::post("/scripts").json(draft)?.idempotent())
            .await
    }

    pub async fn update(&self, id: &str, draft: &ScriptDraft) -> Result<Script, ApiError> {
        self.client
            .put(&format!("/scripts/{}", encode(id)), draft)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .client
            .delete(&format!("/scripts/{}", encode(id)))
            .await?;
        Ok(())
    }

    pub async fn publish(&self, id: &str) -> Result<Script, ApiError> {
        self.client
            .post(
                &format!("/scripts/{}/publish", encode(id)),
                &serde_json::json!({}),
            )
            .await
    }

    pub async fn unpublish(&self, id: &str) -> Result<Script, ApiError> {
        self.client
            .post(
                &format!("/scripts/{}/unpublish", encode(id)),
                &serde_json::json!({}),
            )
            .await
    }

    pub async fn upload_file(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, ApiError> {
        let part = FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            mime_type: Some(mime_for(file_name).to_string()),
            bytes,
        };
        self.client
            .upload(&format!("/scripts/{}/upload", encode(id)), vec![part])
            .await
    }

    pub async fn upload_cover(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, ApiError> {
        let part = FilePart {
            field: "cover".to_string(),
            file_name: file_name.to_string(),
            mime_type: Some(mime_for(file_name).to_string()),
            bytes,
        };
        self.client
            .upload(&format!("/scripts/{}/cover", encode(id)), vec![part])
            .await
    }

    pub async fn reviews(&self, id: &str) -> Result<Vec<Review>, ApiError> {
        self.client
            .get(&format!("/scripts/{}/reviews", encode(id)))
            .await
    }

    pub async fn create_review(&self, id: &str, review: &NewReview) -> Result<Review, ApiError> {
        self.client
            .post(&format!("/scripts/{}/reviews", encode(id)), review)
            .await
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
