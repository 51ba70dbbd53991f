use crate::errors::ServiceError;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

/// One courier quoted by the serviceability backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CourierOption {
    #[serde(default)]
    pub courier_name: String,
    pub rate: Decimal,
    #[serde(default)]
    pub estimated_delivery_days: Option<u32>,
}

/// Destination serviceability and courier-rate lookups.
#[async_trait]
pub trait ServiceabilityApi: Send + Sync {
    /// `GET /pincode/validate`: format-level validity per the postal
    /// backend. Errors mean *indeterminate*, not invalid.
    async fn validate_pincode(&self, pincode: &str) -> Result<bool, ServiceError>;

    /// `GET /check-pincode`: whether the primary courier reaches this
    /// destination. Drives courier-vs-manual routing.
    async fn check_pincode(&self, pincode: &str) -> Result<bool, ServiceError>;

    /// `GET /shiprocket/serviceability`: available couriers for the
    /// destination, parcel weight, and COD flag.
    async fn courier_options(
        &self,
        pincode: &str,
        weight: Decimal,
        cod: bool,
    ) -> Result<Vec<CourierOption>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct ValidatePincodeResponse {
    status: String,
    #[serde(default)]
    pincode_valid: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct CheckPincodeResponse {
    available: bool,
}

#[derive(Debug, Deserialize)]
struct ServiceabilityResponse {
    data: ServiceabilityData,
}

#[derive(Debug, Deserialize)]
struct ServiceabilityData {
    #[serde(default)]
    available_courier_companies: Vec<CourierOption>,
}

#[derive(Clone)]
pub struct HttpServiceabilityApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpServiceabilityApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl ServiceabilityApi for HttpServiceabilityApi {
    #[instrument(skip(self))]
    async fn validate_pincode(&self, pincode: &str) -> Result<bool, ServiceError> {
        let url = format!("{}/pincode/validate", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("pincode", pincode)])
            .send()
            .await?
            .error_for_status()?;

        let body: ValidatePincodeResponse = response.json().await?;
        Ok(body.status == "success" && body.pincode_valid.unwrap_or(false))
    }

    #[instrument(skip(self))]
    async fn check_pincode(&self, pincode: &str) -> Result<bool, ServiceError> {
        let url = format!("{}/check-pincode", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("pincode", pincode)])
            .send()
            .await?
            .error_for_status()?;

        let body: CheckPincodeResponse = response.json().await?;
        Ok(body.available)
    }

    #[instrument(skip(self))]
    async fn courier_options(
        &self,
        pincode: &str,
        weight: Decimal,
        cod: bool,
    ) -> Result<Vec<CourierOption>, ServiceError> {
        let url = format!("{}/shiprocket/serviceability", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("deliveryPincode", pincode.to_string()),
                ("weight", weight.to_string()),
                ("cod", if cod { "1".to_string() } else { "0".to_string() }),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ServiceabilityResponse = response.json().await?;
        Ok(body.data.available_courier_companies)
    }
}
