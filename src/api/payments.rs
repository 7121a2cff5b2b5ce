//! Payment calls. The payment provider's own protocol stays opaque: the
//! client only relays intent ids and client secrets.

use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::http::{ApiClient, ApiError, RequestDescriptor};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub script_id: String,
    pub license_type: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    pub currency: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub status: String,
    pub license_id: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub amount: u64,
    pub currency: Option<String>,
    pub status: String,
    pub script_title: Option<String>,
    pub created_at: Option<String>,
}

pub struct PaymentsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> PaymentsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[tracing::instrument(skip(self, request), fields(script_id = %request.script_id))]
    pub async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<PaymentIntent, ApiError> {
        self.client
            .send(
                RequestDescriptor::post("/payments/create-intent")
                    .json(request)?
                    .idempotent(),
            )
            .await
    }

    pub async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentConfirmation, ApiError> {
        self.client
            .send(
                RequestDescriptor::post(format!("/payments/confirm/{}", encode(intent_id)))
                    .json(&serde_json::json!({}))?
                    .idempotent(),
            )
            .await
    }

    pub async fn history(&self) -> Result<Vec<Payment>, ApiError> {
        self.client.get("/payments/history").await
    }
}
