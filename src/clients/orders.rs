use crate::errors::ServiceError;
use crate::models::OrderPayload;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    order_id: i64,
}

/// Order persistence collaborator. The order record is created exactly once
/// per successful submission; this core never mutates it afterwards.
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn create_order(&self, payload: &OrderPayload) -> Result<i64, ServiceError>;
}

#[derive(Clone)]
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOrderApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    #[instrument(skip(self, payload), fields(order_reference = %payload.order_reference))]
    async fn create_order(&self, payload: &OrderPayload) -> Result<i64, ServiceError> {
        let url = format!("{}/orders", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let body: CreateOrderResponse = response.json().await?;
        Ok(body.order_id)
    }
}
