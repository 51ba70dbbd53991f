//! Checkout step orchestration.
//!
//! Three steps, strictly linear forward, free backward. The Address exit is
//! gated on form completeness; multi-address mode detours through the
//! assignment flow. Session mutations are serialized through a per-session
//! async lock since several handlers touch the same keys.

use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    cart, CartItem, CheckoutForm, CheckoutMode, DeliveryAddress, PaymentMethod,
    PromoApplication,
};
use crate::services::discounts::{DiscountAggregator, PricingBreakdown};
use crate::services::location::{self, LocationService, PincodeProbe, PincodeStatus};
use crate::services::shipping::{ShippingQuote, ShippingResolver};
use crate::services::wallet::{payable_total, WalletManager};
use crate::session::{keys, SessionStore};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    Address,
    Review,
    Payment,
}

impl CheckoutStep {
    pub fn number(&self) -> u8 {
        match self {
            CheckoutStep::Address => 1,
            CheckoutStep::Review => 2,
            CheckoutStep::Payment => 3,
        }
    }

    fn previous(&self) -> CheckoutStep {
        match self {
            CheckoutStep::Address | CheckoutStep::Review => CheckoutStep::Address,
            CheckoutStep::Payment => CheckoutStep::Review,
        }
    }
}

/// Result of a forward step.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceOutcome {
    Moved { step: CheckoutStep },
    /// Multi-address mode leaves the linear flow for address assignment.
    RedirectToAssignment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub session_id: String,
    pub user_id: i64,
    pub step: CheckoutStep,
    pub form: Option<CheckoutForm>,
    pub mode: CheckoutMode,
    pub selected_address: Option<DeliveryAddress>,
}

/// Full pricing picture for the Review step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub pricing: PricingBreakdown,
    pub shipping: ShippingQuote,
    pub cashback_wallet_applied: Decimal,
    pub affiliate_wallet_applied: Decimal,
    pub total: Decimal,
}

/// Address completeness gate for leaving the Address step.
pub fn is_address_complete(form: &CheckoutForm) -> bool {
    let has_name = !form.first_name.trim().is_empty() || !form.last_name.trim().is_empty();
    has_name
        && !form.phone.trim().is_empty()
        && !form.address_line1.trim().is_empty()
        && !form.city.trim().is_empty()
        && !form.state.trim().is_empty()
        && location::is_valid_pincode_format(&form.pincode)
}

#[derive(Clone)]
pub struct CheckoutService {
    sessions: SessionStore,
    events: EventSender,
    discounts: DiscountAggregator,
    shipping: ShippingResolver,
    wallet: WalletManager,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    pincode_probes: Arc<DashMap<String, Arc<PincodeProbe>>>,
}

impl CheckoutService {
    pub fn new(
        sessions: SessionStore,
        events: EventSender,
        discounts: DiscountAggregator,
        shipping: ShippingResolver,
        wallet: WalletManager,
    ) -> Self {
        Self {
            sessions,
            events,
            discounts,
            shipping,
            wallet,
            locks: Arc::new(DashMap::new()),
            pincode_probes: Arc::new(DashMap::new()),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn wallet(&self) -> &WalletManager {
        &self.wallet
    }

    /// Per-session mutation lock shared with the submission builder.
    pub fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[instrument(skip(self, items))]
    pub async fn start(
        &self,
        user_id: i64,
        items: Vec<CartItem>,
    ) -> Result<CheckoutSnapshot, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::InvalidInput("cart is empty".to_string()));
        }
        if items.iter().any(|i| i.quantity == 0) {
            return Err(ServiceError::InvalidInput(
                "cart item quantity must be at least 1".to_string(),
            ));
        }

        let session_id = Uuid::new_v4().to_string();
        self.sessions.set(&session_id, keys::USER_ID, &user_id).await?;
        self.sessions.set(&session_id, keys::CART, &items).await?;
        self.sessions
            .set(&session_id, keys::STEP, &CheckoutStep::Address)
            .await?;

        info!("Checkout session {} started for user {}", session_id, user_id);
        self.events
            .send_or_log(Event::CheckoutStarted {
                session_id: session_id.clone(),
                user_id,
            })
            .await;

        self.snapshot(&session_id).await
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<CheckoutSnapshot, ServiceError> {
        let step = self.current_step(session_id).await?;
        let user_id = self.user_id(session_id).await?;
        let form = self.sessions.get(session_id, keys::FORM).await?;
        let mode: Option<CheckoutMode> =
            self.sessions.get(session_id, keys::CHECKOUT_MODE).await?;
        let selected_address = self
            .sessions
            .get(session_id, keys::SELECTED_ADDRESS)
            .await?;

        Ok(CheckoutSnapshot {
            session_id: session_id.to_string(),
            user_id,
            step,
            form,
            mode: mode.unwrap_or_default(),
            selected_address,
        })
    }

    #[instrument(skip(self, form, selected_address))]
    pub async fn set_address(
        &self,
        session_id: &str,
        form: CheckoutForm,
        selected_address: Option<DeliveryAddress>,
    ) -> Result<(), ServiceError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        self.require_session(session_id).await?;

        self.sessions.set(session_id, keys::FORM, &form).await?;
        match &selected_address {
            Some(address) => {
                self.sessions
                    .set(session_id, keys::SELECTED_ADDRESS, address)
                    .await?
            }
            None => {
                self.sessions
                    .remove(session_id, keys::SELECTED_ADDRESS)
                    .await?
            }
        }
        Ok(())
    }

    #[instrument(skip(self, mode))]
    pub async fn set_mode(
        &self,
        session_id: &str,
        mode: CheckoutMode,
    ) -> Result<(), ServiceError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        self.require_session(session_id).await?;
        self.sessions
            .set(session_id, keys::CHECKOUT_MODE, &mode)
            .await
    }

    #[instrument(skip(self, promo))]
    pub async fn apply_promo(
        &self,
        session_id: &str,
        promo: PromoApplication,
    ) -> Result<(), ServiceError> {
        if promo.code.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "promo code must not be empty".to_string(),
            ));
        }
        if promo.discount_amount < Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "promo discount must not be negative".to_string(),
            ));
        }

        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        self.require_session(session_id).await?;
        self.sessions.set(session_id, keys::PROMO, &promo).await?;

        self.events
            .send_or_log(Event::PromoApplied {
                session_id: session_id.to_string(),
                code: promo.code,
                amount: promo.discount_amount,
            })
            .await;
        Ok(())
    }

    /// Opts the session into spending the affiliate commission wallet.
    /// The balance is snapshotted now and deducted flat at submission.
    #[instrument(skip(self))]
    pub async fn apply_affiliate_wallet(
        &self,
        session_id: &str,
    ) -> Result<Decimal, ServiceError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        let user_id = self.user_id(session_id).await?;

        let amount = self.wallet.affiliate_wallet_amount(user_id).await;
        self.sessions
            .set(session_id, keys::AFFILIATE_WALLET_AMOUNT, &amount)
            .await?;
        Ok(amount)
    }

    #[instrument(skip(self))]
    pub async fn advance(&self, session_id: &str) -> Result<AdvanceOutcome, ServiceError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        let step = self.current_step(session_id).await?;

        match step {
            CheckoutStep::Address => {
                let mode: Option<CheckoutMode> =
                    self.sessions.get(session_id, keys::CHECKOUT_MODE).await?;
                if mode.unwrap_or_default().is_multi() {
                    // The assignment flow consumes a minimal cart snapshot
                    let items: Vec<CartItem> = self
                        .sessions
                        .get(session_id, keys::CART)
                        .await?
                        .unwrap_or_default();
                    self.sessions
                        .set(session_id, keys::ASSIGNMENT_CART, &items)
                        .await?;
                    self.events
                        .send_or_log(Event::CheckoutRedirectedToAssignment {
                            session_id: session_id.to_string(),
                        })
                        .await;
                    return Ok(AdvanceOutcome::RedirectToAssignment);
                }

                let form: CheckoutForm = self
                    .sessions
                    .get(session_id, keys::FORM)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::ValidationError(
                            "delivery address details are required".to_string(),
                        )
                    })?;
                if !is_address_complete(&form) {
                    return Err(ServiceError::ValidationError(
                        "delivery address details are incomplete".to_string(),
                    ));
                }
                self.move_to(session_id, CheckoutStep::Review).await
            }
            CheckoutStep::Review => self.move_to(session_id, CheckoutStep::Payment).await,
            CheckoutStep::Payment => Err(ServiceError::InvalidOperation(
                "checkout is already at the payment step".to_string(),
            )),
        }
    }

    #[instrument(skip(self))]
    pub async fn back(&self, session_id: &str) -> Result<CheckoutStep, ServiceError> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;
        let step = self.current_step(session_id).await?;
        let previous = step.previous();
        if previous != step {
            self.sessions.set(session_id, keys::STEP, &previous).await?;
            self.events
                .send_or_log(Event::CheckoutStepChanged {
                    session_id: session_id.to_string(),
                    step: previous.number(),
                })
                .await;
        }
        Ok(previous)
    }

    /// Full pricing picture: discounts, shipping, wallet deductions, total.
    pub async fn quote(&self, session_id: &str) -> Result<CheckoutQuote, ServiceError> {
        self.quote_for(session_id, None).await
    }

    /// Quote priced for a specific payment method. The serviceability lookup
    /// is keyed on the COD flag, so submission must pass the method actually
    /// being submitted rather than whatever the form last stored.
    #[instrument(skip(self))]
    pub async fn quote_for(
        &self,
        session_id: &str,
        method: Option<PaymentMethod>,
    ) -> Result<CheckoutQuote, ServiceError> {
        let items: Vec<CartItem> = self
            .sessions
            .get(session_id, keys::CART)
            .await?
            .ok_or_else(|| ServiceError::NotFound("checkout session not found".to_string()))?;
        let form: CheckoutForm = self
            .sessions
            .get(session_id, keys::FORM)
            .await?
            .unwrap_or_default();

        let stored_affiliate: Option<Decimal> = match self
            .sessions
            .get(session_id, keys::AFFILIATE_DISCOUNT)
            .await?
        {
            Some(value) => Some(value),
            None => form.affiliate_discount,
        };
        let promo: Option<PromoApplication> =
            self.sessions.get(session_id, keys::PROMO).await?;

        let pricing = self
            .discounts
            .price(&items, stored_affiliate, promo.as_ref())
            .await;
        self.track_milestone(session_id, &pricing).await?;

        let cod = method.or(form.payment_method) == Some(PaymentMethod::Cod);
        let shipping = self
            .shipping
            .resolve(&form.pincode, cart::total_quantity(&items), cod, &pricing)
            .await;

        let cashback = self.wallet.redeemable_amount(session_id).await?;
        let affiliate_wallet: Decimal = self
            .sessions
            .get(session_id, keys::AFFILIATE_WALLET_AMOUNT)
            .await?
            .unwrap_or(Decimal::ZERO);

        let total = payable_total(
            pricing.subtotal_after_discount,
            shipping.amount,
            cashback,
            affiliate_wallet,
        );

        Ok(CheckoutQuote {
            pricing,
            shipping,
            cashback_wallet_applied: cashback,
            affiliate_wallet_applied: affiliate_wallet,
            total,
        })
    }

    /// Debounced serviceability check for the delivery pincode. The session
    /// is flagged as having a check in flight while the lookup runs, which
    /// blocks submission; a check superseded by a newer keystroke returns
    /// `None` and leaves the flag to the check that replaced it.
    #[instrument(skip(self, location))]
    pub async fn check_pincode(
        &self,
        location: &LocationService,
        session_id: &str,
        pincode: &str,
    ) -> Result<Option<PincodeStatus>, ServiceError> {
        self.require_session(session_id).await?;

        let probe = self
            .pincode_probes
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(location.probe()))
            .clone();
        let generation = probe.begin();
        self.set_pincode_check_in_flight(session_id, true).await?;

        let status = location
            .validate_pincode_guarded(&probe, generation, pincode)
            .await;
        if probe.is_current(generation) {
            self.set_pincode_check_in_flight(session_id, false).await?;
        }
        Ok(status)
    }

    /// Flags a pincode lookup as in flight for this session; submission is
    /// blocked until it clears.
    pub async fn set_pincode_check_in_flight(
        &self,
        session_id: &str,
        in_flight: bool,
    ) -> Result<(), ServiceError> {
        if in_flight {
            self.sessions
                .set(session_id, keys::PINCODE_CHECK_IN_FLIGHT, &true)
                .await
        } else {
            self.sessions
                .remove(session_id, keys::PINCODE_CHECK_IN_FLIGHT)
                .await
        }
    }

    pub async fn current_step(&self, session_id: &str) -> Result<CheckoutStep, ServiceError> {
        self.sessions
            .get(session_id, keys::STEP)
            .await?
            .ok_or_else(|| ServiceError::NotFound("checkout session not found".to_string()))
    }

    pub async fn user_id(&self, session_id: &str) -> Result<i64, ServiceError> {
        self.sessions
            .get(session_id, keys::USER_ID)
            .await?
            .ok_or_else(|| ServiceError::NotFound("checkout session not found".to_string()))
    }

    async fn require_session(&self, session_id: &str) -> Result<(), ServiceError> {
        self.current_step(session_id).await.map(|_| ())
    }

    async fn move_to(
        &self,
        session_id: &str,
        step: CheckoutStep,
    ) -> Result<AdvanceOutcome, ServiceError> {
        self.sessions.set(session_id, keys::STEP, &step).await?;
        self.events
            .send_or_log(Event::CheckoutStepChanged {
                session_id: session_id.to_string(),
                step: step.number(),
            })
            .await;
        Ok(AdvanceOutcome::Moved { step })
    }

    async fn track_milestone(
        &self,
        session_id: &str,
        pricing: &PricingBreakdown,
    ) -> Result<(), ServiceError> {
        let previous: Option<Decimal> =
            self.sessions.get(session_id, keys::GIFT_MILESTONE).await?;
        match pricing.gift_milestone_min_amount {
            Some(min_amount) => {
                if previous != Some(min_amount) {
                    self.sessions
                        .set(session_id, keys::GIFT_MILESTONE, &min_amount)
                        .await?;
                    self.events
                        .send_or_log(Event::GiftMilestoneApplied {
                            session_id: session_id.to_string(),
                            min_amount,
                        })
                        .await;
                }
            }
            None => {
                if previous.is_some() {
                    self.sessions.remove(session_id, keys::GIFT_MILESTONE).await?;
                }
            }
        }
        Ok(())
    }
}
