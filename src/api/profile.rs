use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::http::{ApiClient, ApiError, RequestDescriptor};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub avatar_url: Option<String>,
}

/// Fields to change; `None` leaves the field as it is.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

pub struct ProfileApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ProfileApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Profile, ApiError> {
        self.client.get("/users/profile").await
    }

    pub async fn update(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.client.put("/users/profile", update).await
    }

    pub async fn public_profile(&self, user_id: &str) -> Result<Profile, ApiError> {
        self.client
            .get(&format!("/users/{}", encode(user_id)))
            .await
    }

    pub async fn search(&self, query: &str, role: Option<&str>) -> Result<Vec<Profile>, ApiError> {
        self.client
            .send(RequestDescriptor::get("/users/search").query([("q", Some(query)), ("role", role)]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{client, csrf};
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let mut server = Server::new_async().await;
        let _csrf = csrf(&mut server).await;
        let mock = server
            .mock("PUT", "/users/profile")
            .match_header("x-csrf-token", "csrf-1")
            .match_body(Matcher::Json(serde_json::json!({"bio": "Writes comedies"})))
            .with_status(200)
            .with_body(r#"{"id": "u1", "displayName": "Ana", "bio": "Writes comedies"}"#)
            .create_async()
            .await;

        let profile = client(&server.url())
            .profile()
            .update(&ProfileUpdate {
                bio: Some("Writes comedies".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(profile.bio.as_deref(), Some("Writes comedies"));
    }

    #[tokio::test]
    async fn test_search_passes_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "globe".into()),
                Matcher::UrlEncoded("role".into(), "theater".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id": "t1", "displayName": "The Globe"}]"#)
            .create_async()
            .await;

        let results = client(&server.url())
            .profile()
            .search("globe", Some("theater"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(results[0].display_name, "The Globe");
    }

    #[tokio::test]
    async fn test_public_profile_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/users/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let err = client(&server.url())
            .profile()
            .public_profile("missing")
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.message, "HTTP 404");
    }
}
