use serde::{Deserialize, Serialize};
use urlencoding::encode;

use super::Ack;
use crate::http::{ApiClient, ApiError, RequestDescriptor};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_scripts: u64,
    #[serde(default)]
    pub total_licenses: u64,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub pending_reviews: u64,
    #[serde(default)]
    pub open_reports: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    /// `active`, `suspended` or `banned`.
    pub status: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingScript {
    pub id: String,
    pub title: String,
    pub author_name: Option<String>,
    pub submitted_at: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptReview {
    /// `approve` or `reject`.
    pub decision: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    pub reason: String,
    pub target_type: Option<String>,
    pub target_id: Option<String>,
    pub status: String,
    pub created_at: Option<String>,
}

pub struct AdminApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Dashboard totals for a time range such as `7d`, `30d` or `1y`.
    pub async fn stats(&self, time_range: &str) -> Result<DashboardStats, ApiError> {
        self.client
            .send(RequestDescriptor::get("/admin/stats").query([("timeRange", Some(time_range))]))
            .await
    }

    pub async fn users(&self, status: Option<&str>) -> Result<Vec<AdminUser>, ApiError> {
        self.client
            .send(RequestDescriptor::get("/admin/users").query([("status", status)]))
            .await
    }

    pub async fn update_user_status(
        &self,
        user_id: &str,
        status: &str,
    ) -> Result<AdminUser, ApiError> {
        self.client
            .patch(
                &format!("/admin/users/{}/status", encode(user_id)),
                &serde_json::json!({ "status": status }),
            )
            .await
    }

    pub async fn scripts(&self, status: Option<&str>) -> Result<Vec<PendingScript>, ApiError> {
        self.client
            .send(RequestDescriptor::get("/admin/scripts").query([("status", status)]))
            .await
    }

    pub async fn review_script(
        &self,
        script_id: &str,
        review: &ScriptReview,
    ) -> Result<Ack, ApiError> {
        self.client
            .post(&format!("/admin/scripts/{}/review", encode(script_id)), review)
            .await
    }

    pub async fn reports(&self, status: Option<&str>) -> Result<Vec<Report>, ApiError> {
        self.client
            .send(RequestDescriptor::get("/admin/reports").query([("status", status)]))
            .await
    }

    pub async fn resolve_report(&self, report_id: &str, resolution: &str) -> Result<Ack, ApiError> {
        self.client
            .post(
                &format!("/admin/reports/{}/resolve", encode(report_id)),
                &serde_json::json!({ "resolution": resolution }),
            )
            .await
    }
}
