use crate::errors::ServiceError;
use crate::models::{ContactDetails, OrderPayload};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Request for a hosted Cashfree payment session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentSessionRequest {
    pub order_reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub customer: ContactDetails,
    pub return_url: String,
    /// Full order snapshot so the backend can persist the order alongside
    /// the gateway session and reconcile after redirect.
    pub order: OrderPayload,
}

/// A gateway session the browser SDK can open.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSession {
    pub order_id: String,
    #[serde(default)]
    pub payment_session_id: String,
    #[serde(default)]
    pub environment: String,
}

/// Payment gateway collaborator.
#[async_trait]
pub trait PaymentGatewayApi: Send + Sync {
    async fn create_payment_session(
        &self,
        request: &CreatePaymentSessionRequest,
    ) -> Result<PaymentSession, ServiceError>;
}

#[derive(Clone)]
pub struct HttpCashfreeApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCashfreeApi {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PaymentGatewayApi for HttpCashfreeApi {
    #[instrument(skip(self, request), fields(order_reference = %request.order_reference))]
    async fn create_payment_session(
        &self,
        request: &CreatePaymentSessionRequest,
    ) -> Result<PaymentSession, ServiceError> {
        let url = format!("{}/payments/cashfree/create-order", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ServiceError::PaymentFailed(format!(
                "gateway rejected request ({})",
                status
            )));
        }

        let session: PaymentSession = response.json().await?;
        if session.payment_session_id.is_empty() {
            return Err(ServiceError::PaymentFailed(
                "gateway response missing payment session id".to_string(),
            ));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CreatePaymentSessionRequest {
        let customer = ContactDetails {
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
        };
        CreatePaymentSessionRequest {
            order_reference: "ORD-1700000000000-42".to_string(),
            amount: dec!(780),
            currency: "INR".to_string(),
            customer: customer.clone(),
            return_url: "https://glowcart.in/checkout/return?order=ORD-1700000000000-42"
                .to_string(),
            order: OrderPayload {
                order_reference: "ORD-1700000000000-42".to_string(),
                user_id: 42,
                payment_method: crate::models::PaymentMethod::Cashfree,
                customer,
                items: vec![],
                multi_address: false,
                address_mapping: None,
                cart_subtotal: dec!(1000),
                product_discount: dec!(200),
                affiliate_discount: Decimal::ZERO,
                promo_code: None,
                promo_discount: dec!(80),
                gift_milestone_discount: Decimal::ZERO,
                gift_milestone_cashback: Decimal::ZERO,
                shipping: dec!(60),
                cashback_wallet_amount: Decimal::ZERO,
                affiliate_wallet_amount: Decimal::ZERO,
                total: dec!(780),
                courier: "Delhivery".to_string(),
                delivery_advisory: None,
            },
        }
    }

    #[tokio::test]
    async fn create_payment_session_returns_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/cashfree/create-order"))
            .and(body_partial_json(serde_json::json!({
                "orderReference": "ORD-1700000000000-42",
                "currency": "INR"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "cf_order_123",
                "paymentSessionId": "session_abc",
                "environment": "sandbox"
            })))
            .mount(&server)
            .await;

        let api = HttpCashfreeApi::new(reqwest::Client::new(), server.uri());
        let session = api.create_payment_session(&request()).await.unwrap();

        assert_eq!(session.order_id, "cf_order_123");
        assert_eq!(session.payment_session_id, "session_abc");
        assert_eq!(session.environment, "sandbox");
    }

    #[tokio::test]
    async fn rejected_request_is_payment_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/cashfree/create-order"))
            .respond_with(ResponseTemplate::new(422))
            .mount(&server)
            .await;

        let api = HttpCashfreeApi::new(reqwest::Client::new(), server.uri());
        let err = api.create_payment_session(&request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::PaymentFailed(_)));
    }

    #[tokio::test]
    async fn missing_session_id_is_payment_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payments/cashfree/create-order"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "orderId": "cf_order_123"
            })))
            .mount(&server)
            .await;

        let api = HttpCashfreeApi::new(reqwest::Client::new(), server.uri());
        let err = api.create_payment_session(&request()).await.unwrap_err();
        match err {
            ServiceError::PaymentFailed(msg) => assert!(msg.contains("session id")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
