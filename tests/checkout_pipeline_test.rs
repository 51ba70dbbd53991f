//! End-to-end checkout pipeline tests with stubbed collaborators.

use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use glowcart_api::clients::{
    AddressApi, AffiliateTransaction, CourierOption, CreatePaymentSessionRequest, MilestoneApi,
    NewDeliveryAddress, OrderApi, PaymentGatewayApi, PaymentSession, ServiceabilityApi, WalletApi,
    WalletBalance,
};
use glowcart_api::config::CashfreeConfig;
use glowcart_api::errors::ServiceError;
use glowcart_api::events::{Event, EventSender};
use glowcart_api::models::{
    CartItem, CheckoutForm, CheckoutMode, DeliveryAddress, GiftMilestone, MilestoneDiscountType,
    OrderPayload, PaymentMethod, PendingOrder, PromoApplication, RedemptionState,
};
use glowcart_api::services::{
    AdvanceOutcome, CheckoutService, DiscountAggregator, PaymentSubmission, ShippingResolver,
    SubmissionResult, WalletManager,
};
use glowcart_api::session::{keys, InMemorySessionStore, SessionStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ==================== Stub collaborators ====================

struct StubServiceability {
    available: bool,
    rate: Decimal,
    cod_rate: Option<Decimal>,
}

#[async_trait]
impl ServiceabilityApi for StubServiceability {
    async fn validate_pincode(&self, _pincode: &str) -> Result<bool, ServiceError> {
        Ok(true)
    }

    async fn check_pincode(&self, _pincode: &str) -> Result<bool, ServiceError> {
        Ok(self.available)
    }

    async fn courier_options(
        &self,
        _pincode: &str,
        _weight: Decimal,
        cod: bool,
    ) -> Result<Vec<CourierOption>, ServiceError> {
        let rate = if cod {
            self.cod_rate.unwrap_or(self.rate)
        } else {
            self.rate
        };
        Ok(vec![CourierOption {
            courier_name: "Delhivery".to_string(),
            rate,
            estimated_delivery_days: Some(3),
        }])
    }
}

struct StubMilestones(Vec<GiftMilestone>);

#[async_trait]
impl MilestoneApi for StubMilestones {
    async fn gift_milestones(&self) -> Result<Vec<GiftMilestone>, ServiceError> {
        Ok(self.0.clone())
    }
}

struct StubWallet {
    balance: f64,
    reserve_ttl_ms: i64,
}

#[async_trait]
impl WalletApi for StubWallet {
    async fn wallet(&self, _user_id: i64) -> Result<WalletBalance, ServiceError> {
        Ok(WalletBalance {
            cashback_balance: self.balance,
            display_cashback_balance: Some(self.balance),
        })
    }

    async fn reserve(
        &self,
        _user_id: i64,
        _amount: Decimal,
        _description: &str,
    ) -> Result<DateTime<Utc>, ServiceError> {
        Ok(Utc::now() + ChronoDuration::milliseconds(self.reserve_ttl_ms))
    }

    async fn affiliate_wallet(&self, _user_id: i64) -> Result<f64, ServiceError> {
        Ok(50.0)
    }

    async fn log_affiliate_transaction(
        &self,
        _transaction: &AffiliateTransaction,
    ) -> Result<(), ServiceError> {
        Ok(())
    }
}

struct StubAddresses(Vec<DeliveryAddress>);

#[async_trait]
impl AddressApi for StubAddresses {
    async fn list_addresses(&self, _user_id: i64) -> Result<Vec<DeliveryAddress>, ServiceError> {
        Ok(self.0.clone())
    }

    async fn create_address(
        &self,
        _user_id: i64,
        _address: &NewDeliveryAddress,
    ) -> Result<DeliveryAddress, ServiceError> {
        Err(ServiceError::InvalidOperation("not used".to_string()))
    }
}

#[derive(Default)]
struct StubOrders {
    next_id: AtomicI64,
    last_payload: Mutex<Option<OrderPayload>>,
}

#[async_trait]
impl OrderApi for StubOrders {
    async fn create_order(&self, payload: &OrderPayload) -> Result<i64, ServiceError> {
        *self.last_payload.lock().unwrap() = Some(payload.clone());
        Ok(9000 + self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

struct StubGateway;

#[async_trait]
impl PaymentGatewayApi for StubGateway {
    async fn create_payment_session(
        &self,
        request: &CreatePaymentSessionRequest,
    ) -> Result<PaymentSession, ServiceError> {
        Ok(PaymentSession {
            order_id: format!("cf_{}", request.order_reference),
            payment_session_id: "session_stub".to_string(),
            environment: "sandbox".to_string(),
        })
    }
}

// ==================== Pipeline wiring ====================

struct Pipeline {
    checkout: CheckoutService,
    payments: PaymentSubmission,
    orders: Arc<StubOrders>,
    events: mpsc::Receiver<Event>,
}

struct PipelineOptions {
    milestones: Vec<GiftMilestone>,
    addresses: Vec<DeliveryAddress>,
    cashfree: CashfreeConfig,
    wallet_balance: f64,
    reserve_ttl_ms: i64,
    courier_rate: Decimal,
    cod_courier_rate: Option<Decimal>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            milestones: vec![],
            addresses: vec![],
            cashfree: CashfreeConfig::default(),
            wallet_balance: 250.0,
            reserve_ttl_ms: 60_000,
            courier_rate: dec!(60),
            cod_courier_rate: None,
        }
    }
}

fn pipeline(options: PipelineOptions) -> Pipeline {
    let (tx, rx) = mpsc::channel(256);
    let events = EventSender::new(tx);
    let sessions = SessionStore::new(Arc::new(InMemorySessionStore::new()), None);

    let wallet = WalletManager::new(
        Arc::new(StubWallet {
            balance: options.wallet_balance,
            reserve_ttl_ms: options.reserve_ttl_ms,
        }),
        sessions.clone(),
        events.clone(),
        1,
    );
    let checkout = CheckoutService::new(
        sessions,
        events.clone(),
        DiscountAggregator::new(Arc::new(StubMilestones(options.milestones))),
        ShippingResolver::new(
            Arc::new(StubServiceability {
                available: true,
                rate: options.courier_rate,
                cod_rate: options.cod_courier_rate,
            }),
            599,
            80,
            0.5,
        ),
        wallet,
    );

    let orders = Arc::new(StubOrders::default());
    let payments = PaymentSubmission::new(
        checkout.clone(),
        Arc::new(StubAddresses(options.addresses)),
        orders.clone(),
        Arc::new(StubGateway),
        events,
        options.cashfree,
    );

    Pipeline {
        checkout,
        payments,
        orders,
        events: rx,
    }
}

fn sale_cart() -> Vec<CartItem> {
    vec![CartItem {
        id: 7,
        name: "Velvet Lip Tint".to_string(),
        price: "₹500".to_string(),
        original_price: Some("₹600".to_string()),
        quantity: 2,
        ..CartItem::default()
    }]
}

fn complete_form() -> CheckoutForm {
    CheckoutForm {
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        address_line1: "14 MG Road, Shanthala Nagar".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        country: "India".to_string(),
        ..CheckoutForm::default()
    }
}

fn saved_address(id: i64) -> DeliveryAddress {
    DeliveryAddress {
        id,
        recipient_name: format!("Recipient {}", id),
        address_line1: format!("{} Residency Road", id),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        pincode: "560001".to_string(),
        country: "India".to_string(),
        phone_number: "9876543210".to_string(),
        ..DeliveryAddress::default()
    }
}

async fn start_and_reach_payment(pipeline: &Pipeline, items: Vec<CartItem>) -> String {
    let session = pipeline.checkout.start(42, items).await.unwrap();
    pipeline
        .checkout
        .set_address(&session.session_id, complete_form(), None)
        .await
        .unwrap();
    pipeline.checkout.advance(&session.session_id).await.unwrap();
    pipeline.checkout.advance(&session.session_id).await.unwrap();
    session.session_id
}

fn drain(events: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut collected = Vec::new();
    while let Ok(event) = events.try_recv() {
        collected.push(event);
    }
    collected
}

// ==================== Scenario 1: free shipping ====================

#[tokio::test]
async fn sale_cart_over_threshold_ships_free() {
    let p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();
    p.checkout
        .set_address(&session.session_id, complete_form(), None)
        .await
        .unwrap();

    let quote = p.checkout.quote(&session.session_id).await.unwrap();
    assert_eq!(quote.pricing.cart_subtotal, dec!(1200));
    assert_eq!(quote.pricing.product_discount, dec!(200));
    assert_eq!(quote.pricing.subtotal_after_product_discount, dec!(1000));
    assert_eq!(quote.shipping.amount, Decimal::ZERO);
    assert_eq!(quote.total, dec!(800));
}

// ==================== Scenario 2: promo forfeits free shipping ====================

#[tokio::test]
async fn promo_discount_reinstates_courier_rate() {
    let p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();
    p.checkout
        .set_address(&session.session_id, complete_form(), None)
        .await
        .unwrap();
    p.checkout
        .apply_promo(
            &session.session_id,
            PromoApplication {
                code: "GLOW10".to_string(),
                discount_amount: dec!(80),
            },
        )
        .await
        .unwrap();

    let quote = p.checkout.quote(&session.session_id).await.unwrap();
    assert_eq!(quote.pricing.promo_discount, dec!(80));
    assert_eq!(quote.shipping.amount, dec!(60));
    // 1000 - 80 + 60
    assert_eq!(quote.total, dec!(780));
}

// ==================== Scenario 3: wallet expiry ====================

#[tokio::test]
async fn expired_reservation_zeroes_out_and_notifies_once() {
    let mut p = pipeline(PipelineOptions {
        reserve_ttl_ms: -1,
        ..PipelineOptions::default()
    });
    let session = p.checkout.start(42, sale_cart()).await.unwrap();

    p.checkout
        .wallet()
        .reserve(&session.session_id, 42, dec!(100))
        .await
        .unwrap();

    // The reservation came back already expired; both checks settle to zero
    assert_eq!(
        p.checkout
            .wallet()
            .redeemable_amount(&session.session_id)
            .await
            .unwrap(),
        Decimal::ZERO
    );
    assert_eq!(
        p.checkout
            .wallet()
            .redeemable_amount(&session.session_id)
            .await
            .unwrap(),
        Decimal::ZERO
    );

    let expiries = drain(&mut p.events)
        .into_iter()
        .filter(|e| matches!(e, Event::WalletReservationExpired { .. }))
        .count();
    assert_eq!(expiries, 1);

    p.checkout.wallet().teardown_session(&session.session_id);
}

#[tokio::test]
async fn live_reservation_reduces_total() {
    let p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();
    p.checkout
        .set_address(&session.session_id, complete_form(), None)
        .await
        .unwrap();

    p.checkout
        .wallet()
        .reserve(&session.session_id, 42, dec!(100))
        .await
        .unwrap();

    let quote = p.checkout.quote(&session.session_id).await.unwrap();
    assert_eq!(quote.cashback_wallet_applied, dec!(100));
    assert_eq!(quote.total, dec!(700));

    p.checkout.wallet().teardown_session(&session.session_id);
}

// ==================== Scenario 4: incomplete multi-address mapping ====================

#[tokio::test]
async fn multi_address_advance_redirects_to_assignment() {
    let mut p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();
    p.checkout
        .set_mode(
            &session.session_id,
            CheckoutMode::MultiAddress {
                mapping: HashMap::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        p.checkout.advance(&session.session_id).await.unwrap(),
        AdvanceOutcome::RedirectToAssignment
    );

    let redirected = drain(&mut p.events)
        .iter()
        .any(|e| matches!(e, Event::CheckoutRedirectedToAssignment { .. }));
    assert!(redirected);
}

#[tokio::test]
async fn submission_blocks_on_unmapped_units() {
    let p = pipeline(PipelineOptions {
        addresses: vec![saved_address(1), saved_address(2)],
        ..PipelineOptions::default()
    });

    // Item 7 has quantity 2 but only unit 0 is mapped
    let items = vec![CartItem {
        id: 7,
        name: "Velvet Lip Tint".to_string(),
        price: "₹500".to_string(),
        quantity: 2,
        ..CartItem::default()
    }];
    let session_id = start_and_reach_payment(&p, items).await;

    let mut mapping = HashMap::new();
    mapping.insert("7-0".to_string(), 1);
    p.checkout
        .set_mode(&session_id, CheckoutMode::MultiAddress { mapping })
        .await
        .unwrap();

    let err = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(p.orders.last_payload.lock().unwrap().is_none());
}

#[tokio::test]
async fn complete_mapping_expands_per_unit() {
    let p = pipeline(PipelineOptions {
        addresses: vec![saved_address(1), saved_address(2)],
        ..PipelineOptions::default()
    });
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    let mut mapping = HashMap::new();
    mapping.insert("7-0".to_string(), 1);
    mapping.insert("7-1".to_string(), 2);
    p.checkout
        .set_mode(&session_id, CheckoutMode::MultiAddress { mapping })
        .await
        .unwrap();

    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    assert_matches!(result, SubmissionResult::OrderConfirmed { .. });

    let payload = p.orders.last_payload.lock().unwrap().clone().unwrap();
    assert!(payload.multi_address);
    assert_eq!(payload.items.len(), 2);
    assert!(payload.items.iter().all(|u| u.quantity == 1));
    assert_eq!(payload.items[0].recipient_name, "Recipient 1");
    assert_eq!(payload.items[1].recipient_name, "Recipient 2");
}

// ==================== Scenario 5: milestone selection ====================

#[tokio::test]
async fn highest_eligible_milestone_applies() {
    let p = pipeline(PipelineOptions {
        milestones: vec![
            GiftMilestone {
                min_amount: dec!(500),
                discount_type: MilestoneDiscountType::Flat,
                discount_value: dec!(50),
                ..GiftMilestone::default()
            },
            GiftMilestone {
                min_amount: dec!(1000),
                discount_type: MilestoneDiscountType::Percentage,
                discount_value: dec!(5),
                ..GiftMilestone::default()
            },
        ],
        ..PipelineOptions::default()
    });

    let items = vec![CartItem {
        id: 9,
        name: "Radiance Serum".to_string(),
        price: "₹600".to_string(),
        quantity: 2,
        ..CartItem::default()
    }];
    let session = p.checkout.start(42, items).await.unwrap();
    p.checkout
        .set_address(&session.session_id, complete_form(), None)
        .await
        .unwrap();

    let quote = p.checkout.quote(&session.session_id).await.unwrap();
    assert_eq!(quote.pricing.gift_milestone_min_amount, Some(dec!(1000)));
    assert_eq!(quote.pricing.gift_milestone_discount, dec!(60));
    // Milestone discount is active, so shipping is charged
    assert_eq!(quote.shipping.amount, dec!(60));
    assert_eq!(quote.total, dec!(1200) - dec!(60) + dec!(60));
}

// ==================== COD path ====================

#[tokio::test]
async fn cod_submission_creates_order_and_clears_session() {
    let mut p = pipeline(PipelineOptions::default());
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    let order_id = match result {
        SubmissionResult::OrderConfirmed {
            order_id, warnings, ..
        } => {
            assert!(warnings.is_empty());
            order_id
        }
        other => panic!("unexpected result: {:?}", other),
    };
    assert_eq!(order_id, 9000);

    let payload = p.orders.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.user_id, 42);
    assert_eq!(payload.payment_method, PaymentMethod::Cod);
    assert_eq!(payload.total, dec!(800));
    assert_eq!(payload.customer.name, "Asha Rao");
    assert!(payload.order_reference.starts_with("ORD-"));
    assert!(payload.order_reference.ends_with("-42"));

    // Session-scoped state is gone
    let cart: Option<Vec<CartItem>> = p
        .checkout
        .sessions()
        .get(&session_id, keys::CART)
        .await
        .unwrap();
    assert!(cart.is_none());

    let events = drain(&mut p.events);
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::OrderCreated { order_id: 9000, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::CartCleared { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, Event::WalletBalanceChanged { user_id: 42 })));
}

#[tokio::test]
async fn cod_submission_is_priced_with_cod_courier_rate() {
    let p = pipeline(PipelineOptions {
        cod_courier_rate: Some(dec!(100)),
        ..PipelineOptions::default()
    });

    // Below the free-shipping threshold, no discounts active
    let items = vec![CartItem {
        id: 11,
        name: "Kohl Kajal".to_string(),
        price: "₹299".to_string(),
        quantity: 1,
        ..CartItem::default()
    }];
    let session_id = start_and_reach_payment(&p, items).await;

    // The form never selected a payment method; the method being submitted
    // must still key the serviceability lookup
    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    assert_matches!(result, SubmissionResult::OrderConfirmed { .. });

    let payload = p.orders.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.shipping, dec!(100));
    assert_eq!(payload.total, dec!(399));
}

#[tokio::test]
async fn cod_submission_consumes_wallet_hold() {
    let mut p = pipeline(PipelineOptions::default());
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    p.checkout
        .wallet()
        .reserve(&session_id, 42, dec!(100))
        .await
        .unwrap();

    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    assert_matches!(result, SubmissionResult::OrderConfirmed { .. });

    let payload = p.orders.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.cashback_wallet_amount, dec!(100));
    assert_eq!(payload.total, dec!(700));

    // The spent hold leaves a consumption record that outlives cleanup
    let recorded: Option<RedemptionState> = p
        .checkout
        .sessions()
        .get(&session_id, keys::WALLET_CONSUMED)
        .await
        .unwrap();
    assert_eq!(
        recorded,
        Some(RedemptionState::Consumed { amount: dec!(100) })
    );

    let consumed = drain(&mut p.events)
        .iter()
        .any(|e| matches!(e, Event::WalletConsumed { .. }));
    assert!(consumed);
}

#[tokio::test]
async fn submission_requires_payment_step() {
    let p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();

    let err = p
        .payments
        .submit(&session.session_id, PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));
}

#[tokio::test]
async fn submission_blocked_while_pincode_check_in_flight() {
    let p = pipeline(PipelineOptions::default());
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    p.checkout
        .set_pincode_check_in_flight(&session_id, true)
        .await
        .unwrap();
    let err = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidOperation(_));

    p.checkout
        .set_pincode_check_in_flight(&session_id, false)
        .await
        .unwrap();
    assert!(p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .is_ok());
}

// ==================== Advisory-only validation ====================

#[tokio::test]
async fn invalid_contact_fields_warn_but_do_not_block() {
    let p = pipeline(PipelineOptions::default());
    let session = p.checkout.start(42, sale_cart()).await.unwrap();

    let mut form = complete_form();
    form.phone = "98765432101234".to_string(); // not 10 digits, but non-empty
    form.email = "not-an-email".to_string();
    p.checkout
        .set_address(&session.session_id, form, None)
        .await
        .unwrap();
    p.checkout.advance(&session.session_id).await.unwrap();
    p.checkout.advance(&session.session_id).await.unwrap();

    let result = p
        .payments
        .submit(&session.session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    match result {
        SubmissionResult::OrderConfirmed { warnings, .. } => {
            assert_eq!(warnings.len(), 2);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(p.orders.last_payload.lock().unwrap().is_some());
}

// ==================== Cashfree path ====================

#[tokio::test]
async fn cashfree_submission_returns_gateway_session() {
    let p = pipeline(PipelineOptions {
        cashfree: CashfreeConfig {
            app_id: Some("cf_app_test".to_string()),
            ..CashfreeConfig::default()
        },
        ..PipelineOptions::default()
    });
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cashfree)
        .await
        .unwrap();

    let order_reference = match result {
        SubmissionResult::GatewayRedirect {
            order_reference,
            payment_session_id,
            environment,
            return_url,
            ..
        } => {
            assert_eq!(payment_session_id, "session_stub");
            assert_eq!(environment, "sandbox");
            assert!(return_url.contains(&order_reference));
            order_reference
        }
        other => panic!("unexpected result: {:?}", other),
    };

    // A pending-order descriptor survives for resumption
    let pending: Option<PendingOrder> = p
        .checkout
        .sessions()
        .get(&session_id, keys::PENDING_ORDER)
        .await
        .unwrap();
    let pending = pending.expect("pending order persisted");
    assert_eq!(pending.order_reference, order_reference);
    assert_eq!(pending.amount, dec!(800));

    // No direct order creation on the gateway path
    assert!(p.orders.last_payload.lock().unwrap().is_none());
}

#[tokio::test]
async fn cashfree_unconfigured_is_a_blocking_error() {
    let p = pipeline(PipelineOptions::default());
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    let err = p
        .payments
        .submit(&session_id, PaymentMethod::Cashfree)
        .await
        .unwrap_err();
    match err {
        ServiceError::PaymentFailed(message) => {
            assert!(message.contains("not configured"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

// ==================== Affiliate wallet ====================

#[tokio::test]
async fn affiliate_wallet_deducts_flat_amount() {
    let p = pipeline(PipelineOptions::default());
    let session_id = start_and_reach_payment(&p, sale_cart()).await;

    let amount = p.checkout.apply_affiliate_wallet(&session_id).await.unwrap();
    assert_eq!(amount, dec!(50));

    let quote = p.checkout.quote(&session_id).await.unwrap();
    assert_eq!(quote.affiliate_wallet_applied, dec!(50));
    assert_eq!(quote.total, dec!(750));

    let result = p
        .payments
        .submit(&session_id, PaymentMethod::Cod)
        .await
        .unwrap();
    assert_matches!(result, SubmissionResult::OrderConfirmed { .. });

    let payload = p.orders.last_payload.lock().unwrap().clone().unwrap();
    assert_eq!(payload.affiliate_wallet_amount, dec!(50));
    assert_eq!(payload.total, dec!(750));
}
