use crate::errors::ServiceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Cashback wallet balance. Figures arrive as raw JSON numbers and are
/// NaN-guarded before entering any arithmetic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    #[serde(default)]
    pub cashback_balance: f64,
    #[serde(default)]
    pub display_cashback_balance: Option<f64>,
}

/// Post-order affiliate wallet transaction record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffiliateTransaction {
    pub user_id: i64,
    pub amount: Decimal,
    pub order_reference: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReserveRequest<'a> {
    user_id: i64,
    amount: Decimal,
    description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveResponse {
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AffiliateWalletResponse {
    #[serde(default)]
    commission_balance: f64,
}

/// Cashback and affiliate wallet collaborator.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn wallet(&self, user_id: i64) -> Result<WalletBalance, ServiceError>;

    /// Reserves `amount` from the cashback wallet; returns the absolute
    /// expiry of the server-side hold.
    async fn reserve(
        &self,
        user_id: i64,
        amount: Decimal,
        description: &str,
    ) -> Result<DateTime<Utc>, ServiceError>;

    async fn affiliate_wallet(&self, user_id: i64) -> Result<f64, ServiceError>;

    /// Best-effort transaction log; callers treat failures as non-fatal.
    async fn log_affiliate_transaction(
        &self,
        transaction: &AffiliateTransaction,
    ) -> Result<(), ServiceError>;
}

#[derive(Clone)]
pub struct HttpWalletApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWalletApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    #[instrument(skip(self))]
    async fn wallet(&self, user_id: i64) -> Result<WalletBalance, ServiceError> {
        let url = format!("{}/wallet", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    #[instrument(skip(self))]
    async fn reserve(
        &self,
        user_id: i64,
        amount: Decimal,
        description: &str,
    ) -> Result<DateTime<Utc>, ServiceError> {
        let url = format!("{}/wallet/reserve", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ReserveRequest {
                user_id,
                amount,
                description,
            })
            .send()
            .await?
            .error_for_status()?;

        let body: ReserveResponse = response.json().await?;
        Ok(body.expires_at)
    }

    #[instrument(skip(self))]
    async fn affiliate_wallet(&self, user_id: i64) -> Result<f64, ServiceError> {
        let url = format!("{}/affiliate/wallet", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?
            .error_for_status()?;

        let body: AffiliateWalletResponse = response.json().await?;
        Ok(body.commission_balance)
    }

    #[instrument(skip(self, transaction))]
    async fn log_affiliate_transaction(
        &self,
        transaction: &AffiliateTransaction,
    ) -> Result<(), ServiceError> {
        let url = format!("{}/affiliate/transactions", self.base_url);
        self.client
            .post(&url)
            .json(transaction)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
