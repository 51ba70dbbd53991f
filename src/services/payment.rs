//! Payment submission.
//!
//! Assembles the final order payload shared by both terminal paths, then
//! either creates a Cashfree payment session (online) or creates the order
//! directly (COD). Submission-time contact checks are advisory only: they
//! produce warnings, never block the order. Preserve that permissiveness.

use crate::clients::{
    AddressApi, AffiliateTransaction, CreatePaymentSessionRequest, OrderApi, PaymentGatewayApi,
};
use crate::config::CashfreeConfig;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    money, CartItem, CheckoutForm, CheckoutMode, ContactDetails, DeliveryAddress, OrderPayload,
    PaymentMethod, PendingOrder,
};
use crate::services::checkout::{CheckoutService, CheckoutStep};
use crate::services::expansion::{build_single_address_units, expand_multi_address, ExpansionOutcome};
use crate::services::location;
use crate::session::keys;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").expect("phone regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

const MIN_ADDRESS_LEN: usize = 10;
const PLACEHOLDER_NAME: &str = "Guest Customer";
const PLACEHOLDER_EMAIL: &str = "guest@glowcart.in";
const PLACEHOLDER_PHONE: &str = "9999999999";

/// Outcome of a submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// Online path: hand the session id to the gateway SDK.
    GatewayRedirect {
        order_reference: String,
        payment_session_id: String,
        environment: String,
        return_url: String,
        warnings: Vec<String>,
    },
    /// COD path: the order exists server-side.
    OrderConfirmed {
        order_id: i64,
        order_reference: String,
        warnings: Vec<String>,
    },
}

/// Advisory contact checks. Violations warn, never block.
pub fn advisory_warnings(form: &CheckoutForm) -> Vec<String> {
    let mut warnings = Vec::new();
    if !PHONE_RE.is_match(form.phone.trim()) {
        warnings.push("Phone number does not look like a 10-digit mobile number".to_string());
    }
    if !EMAIL_RE.is_match(form.email.trim()) {
        warnings.push("Email address does not look valid".to_string());
    }
    if !location::is_valid_pincode_format(&form.pincode) {
        warnings.push("Pincode does not look like a 6-digit code".to_string());
    }
    if form.address_line1.trim().len() < MIN_ADDRESS_LEN {
        warnings.push("Delivery address looks too short".to_string());
    }
    warnings
}

/// Contact details for the gateway and order backend. Falls back through
/// selected address, then form fields, then placeholders so the gateway
/// always receives syntactically valid values.
fn resolve_contact(selected: Option<&DeliveryAddress>, form: &CheckoutForm) -> ContactDetails {
    let from_address = |value: &str| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    let name = selected
        .and_then(|a| from_address(&a.recipient_name))
        .or_else(|| from_address(&form.full_name()))
        .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());
    let phone = selected
        .and_then(|a| from_address(&a.phone_number))
        .or_else(|| from_address(&form.phone))
        .unwrap_or_else(|| PLACEHOLDER_PHONE.to_string());
    let email =
        from_address(&form.email).unwrap_or_else(|| PLACEHOLDER_EMAIL.to_string());

    ContactDetails { name, email, phone }
}

#[derive(Clone)]
pub struct PaymentSubmission {
    checkout: CheckoutService,
    addresses: Arc<dyn AddressApi>,
    orders: Arc<dyn OrderApi>,
    gateway: Arc<dyn PaymentGatewayApi>,
    events: EventSender,
    cashfree: CashfreeConfig,
}

impl PaymentSubmission {
    pub fn new(
        checkout: CheckoutService,
        addresses: Arc<dyn AddressApi>,
        orders: Arc<dyn OrderApi>,
        gateway: Arc<dyn PaymentGatewayApi>,
        events: EventSender,
        cashfree: CashfreeConfig,
    ) -> Self {
        Self {
            checkout,
            addresses,
            orders,
            gateway,
            events,
            cashfree,
        }
    }

    /// Submits the order. Guarded by an in-flight flag; duplicate calls get
    /// a conflict and there is no automatic retry.
    #[instrument(skip(self))]
    pub async fn submit(
        &self,
        session_id: &str,
        method: PaymentMethod,
    ) -> Result<SubmissionResult, ServiceError> {
        let lock = self.checkout.session_lock(session_id);
        let _guard = lock.lock().await;
        let sessions = self.checkout.sessions();

        let step = self.checkout.current_step(session_id).await?;
        if step != CheckoutStep::Payment {
            return Err(ServiceError::InvalidOperation(
                "checkout has not reached the payment step".to_string(),
            ));
        }

        let pincode_in_flight: Option<bool> = sessions
            .get(session_id, keys::PINCODE_CHECK_IN_FLIGHT)
            .await?;
        if pincode_in_flight == Some(true) {
            return Err(ServiceError::InvalidOperation(
                "a pincode check is still in progress".to_string(),
            ));
        }

        let processing: Option<bool> = sessions.get(session_id, keys::PROCESSING).await?;
        if processing == Some(true) {
            return Err(ServiceError::Conflict(
                "order submission already in progress".to_string(),
            ));
        }
        sessions.set(session_id, keys::PROCESSING, &true).await?;

        let result = self.submit_inner(session_id, method).await;

        // Always release the guard; failed submissions are retried manually
        if let Err(e) = sessions.remove(session_id, keys::PROCESSING).await {
            warn!("Failed to clear processing flag for {}: {}", session_id, e);
        }
        result
    }

    async fn submit_inner(
        &self,
        session_id: &str,
        method: PaymentMethod,
    ) -> Result<SubmissionResult, ServiceError> {
        let sessions = self.checkout.sessions();
        let user_id = self.checkout.user_id(session_id).await?;
        let items: Vec<CartItem> = sessions
            .get(session_id, keys::CART)
            .await?
            .ok_or_else(|| ServiceError::NotFound("checkout session not found".to_string()))?;
        let form: CheckoutForm = sessions
            .get(session_id, keys::FORM)
            .await?
            .unwrap_or_default();
        let mode: CheckoutMode = sessions
            .get(session_id, keys::CHECKOUT_MODE)
            .await?
            .unwrap_or_default();
        let selected: Option<DeliveryAddress> = sessions
            .get(session_id, keys::SELECTED_ADDRESS)
            .await?;

        let quote = self.checkout.quote_for(session_id, Some(method)).await?;

        let (units, multi_address, address_mapping) = match &mode {
            CheckoutMode::SingleAddress => {
                (build_single_address_units(&items, &form), false, None)
            }
            CheckoutMode::MultiAddress { mapping } => {
                let saved = self.addresses.list_addresses(user_id).await?;
                let book: HashMap<i64, DeliveryAddress> =
                    saved.into_iter().map(|a| (a.id, a)).collect();
                match expand_multi_address(&items, mapping, &book) {
                    ExpansionOutcome::Assigned(units) => (units, true, Some(mapping.clone())),
                    ExpansionOutcome::NeedsAssignment { missing } => {
                        return Err(ServiceError::ValidationError(format!(
                            "multi-address assignment incomplete: {} unit(s) have no address",
                            missing.len()
                        )));
                    }
                }
            }
        };

        let warnings = advisory_warnings(&form);
        let customer = resolve_contact(selected.as_ref(), &form);
        let order_reference = format!("ORD-{}-{}", Utc::now().timestamp_millis(), user_id);
        let gateway_amount = money::round_rupees(quote.total);

        let payload = OrderPayload {
            order_reference: order_reference.clone(),
            user_id,
            payment_method: method,
            customer: customer.clone(),
            items: units,
            multi_address,
            address_mapping,
            cart_subtotal: quote.pricing.cart_subtotal,
            product_discount: quote.pricing.product_discount,
            affiliate_discount: quote.pricing.affiliate_discount,
            promo_code: quote.pricing.promo_code.clone(),
            promo_discount: quote.pricing.promo_discount,
            gift_milestone_discount: quote.pricing.gift_milestone_discount,
            gift_milestone_cashback: quote.pricing.gift_milestone_cashback,
            shipping: quote.shipping.amount,
            cashback_wallet_amount: quote.cashback_wallet_applied,
            affiliate_wallet_amount: quote.affiliate_wallet_applied,
            total: quote.total,
            courier: quote.shipping.courier.label(),
            delivery_advisory: quote.shipping.advisory.clone(),
        };

        match method {
            PaymentMethod::Cashfree => {
                self.submit_cashfree(session_id, payload, customer, gateway_amount, warnings)
                    .await
            }
            PaymentMethod::Cod => self.submit_cod(session_id, payload, warnings).await,
        }
    }

    async fn submit_cashfree(
        &self,
        session_id: &str,
        payload: OrderPayload,
        customer: ContactDetails,
        amount: rust_decimal::Decimal,
        warnings: Vec<String>,
    ) -> Result<SubmissionResult, ServiceError> {
        if !self.cashfree.is_configured() {
            return Err(ServiceError::PaymentFailed(
                "payment gateway is not configured".to_string(),
            ));
        }

        let order_reference = payload.order_reference.clone();
        let return_url = format!(
            "{}?order={}",
            self.cashfree.return_url_base, order_reference
        );

        let session = self
            .gateway
            .create_payment_session(&CreatePaymentSessionRequest {
                order_reference: order_reference.clone(),
                amount,
                currency: "INR".to_string(),
                customer,
                return_url: return_url.clone(),
                order: payload,
            })
            .await?;

        let pending = PendingOrder {
            order_reference: order_reference.clone(),
            amount,
            created_at: Utc::now(),
        };
        self.checkout
            .sessions()
            .set(session_id, keys::PENDING_ORDER, &pending)
            .await?;

        info!(
            "Payment session created for order {} (session {})",
            order_reference, session_id
        );
        self.events
            .send_or_log(Event::PaymentSessionCreated {
                session_id: session_id.to_string(),
                order_reference: order_reference.clone(),
            })
            .await;

        let environment = if session.environment.is_empty() {
            self.cashfree.environment.clone()
        } else {
            session.environment
        };

        Ok(SubmissionResult::GatewayRedirect {
            order_reference,
            payment_session_id: session.payment_session_id,
            environment,
            return_url,
            warnings,
        })
    }

    async fn submit_cod(
        &self,
        session_id: &str,
        payload: OrderPayload,
        warnings: Vec<String>,
    ) -> Result<SubmissionResult, ServiceError> {
        let order_id = self.orders.create_order(&payload).await?;
        info!(
            "Order {} created for session {} (reference {})",
            order_id, session_id, payload.order_reference
        );

        if payload.cashback_wallet_amount > rust_decimal::Decimal::ZERO {
            // The order is already placed; a failed consumption record must
            // not unwind it
            if let Err(e) = self.checkout.wallet().consume(session_id).await {
                warn!(
                    "Failed to record wallet consumption for session {}: {}",
                    session_id, e
                );
            }
        }

        self.cleanup_after_order(session_id, &payload).await;

        self.events
            .send_or_log(Event::OrderCreated {
                session_id: session_id.to_string(),
                order_id,
            })
            .await;

        Ok(SubmissionResult::OrderConfirmed {
            order_id,
            order_reference: payload.order_reference,
            warnings,
        })
    }

    /// Clears session-scoped discount/wallet/multi-address state and emits
    /// the UI refresh events. The affiliate transaction log is best-effort;
    /// its failure never rolls back the order.
    async fn cleanup_after_order(&self, session_id: &str, payload: &OrderPayload) {
        let sessions = self.checkout.sessions();
        if let Err(e) = sessions
            .remove_all(session_id, keys::CLEARED_ON_ORDER)
            .await
        {
            warn!("Post-order session cleanup failed for {}: {}", session_id, e);
        }
        self.checkout.wallet().teardown_session(session_id);

        self.events
            .send_or_log(Event::CartCleared {
                session_id: session_id.to_string(),
            })
            .await;
        self.events
            .send_or_log(Event::WalletBalanceChanged {
                user_id: payload.user_id,
            })
            .await;

        if payload.affiliate_wallet_amount > rust_decimal::Decimal::ZERO {
            let transaction = AffiliateTransaction {
                user_id: payload.user_id,
                amount: payload.affiliate_wallet_amount,
                order_reference: payload.order_reference.clone(),
                description: "Affiliate wallet redemption at checkout".to_string(),
            };
            match self
                .checkout
                .wallet()
                .log_transaction(&transaction)
                .await
            {
                Ok(()) => {
                    self.events
                        .send_or_log(Event::AffiliateTransactionLogged {
                            user_id: payload.user_id,
                            amount: payload.affiliate_wallet_amount,
                        })
                        .await;
                }
                Err(e) => {
                    warn!(
                        "Affiliate transaction log failed for order {}: {}",
                        payload.order_reference, e
                    );
                }
            }
        }
    }
}
