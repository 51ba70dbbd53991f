use crate::errors::ServiceError;
use crate::models::{normalize_address, DeliveryAddress};
use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

/// Payload for creating a saved delivery address.
#[derive(Debug, Clone, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDeliveryAddress {
    pub recipient_name: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub landmark: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub phone_number: String,
    pub delivery_instructions: Option<String>,
    pub saturday_delivery: bool,
    pub sunday_delivery: bool,
    pub is_default: bool,
}

/// Saved-address collaborator. Records are normalized at this boundary;
/// callers never see the camelCase/snake_case split.
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn list_addresses(&self, user_id: i64) -> Result<Vec<DeliveryAddress>, ServiceError>;
    async fn create_address(
        &self,
        user_id: i64,
        address: &NewDeliveryAddress,
    ) -> Result<DeliveryAddress, ServiceError>;
}

#[derive(Clone)]
pub struct HttpAddressApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAddressApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl AddressApi for HttpAddressApi {
    #[instrument(skip(self))]
    async fn list_addresses(&self, user_id: i64) -> Result<Vec<DeliveryAddress>, ServiceError> {
        let url = format!("{}/delivery-addresses", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?;

        let raw: Vec<serde_json::Value> = response.json().await?;
        Ok(raw.iter().map(normalize_address).collect())
    }

    #[instrument(skip(self, address))]
    async fn create_address(
        &self,
        user_id: i64,
        address: &NewDeliveryAddress,
    ) -> Result<DeliveryAddress, ServiceError> {
        let url = format!("{}/delivery-addresses", self.base_url);
        let mut body = serde_json::to_value(address)?;
        if let Some(map) = body.as_object_mut() {
            map.insert("userId".to_string(), serde_json::json!(user_id));
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let raw: serde_json::Value = response.json().await?;
        Ok(normalize_address(&raw))
    }
}
