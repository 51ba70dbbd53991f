//! Cashback wallet redemption.
//!
//! Redemptions are server-confirmed, time-boxed holds. A background sweeper
//! polls for expiry; an expired hold zeroes out, clears its session state,
//! and notifies the user exactly once. The affiliate wallet is a separate,
//! flat deduction with no reservation semantics.

use crate::clients::{AffiliateTransaction, WalletApi};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{money, RedemptionState, WalletReservation};
use crate::session::{keys, SessionStore};
use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

/// Final payable total. Wallet figures must be NaN-guarded before they get
/// here (see [`money::decimal_from_f64`]); the result never goes negative.
pub fn payable_total(
    subtotal_after_discount: Decimal,
    shipping: Decimal,
    cashback_wallet: Decimal,
    affiliate_wallet: Decimal,
) -> Decimal {
    money::clamp_non_negative(
        subtotal_after_discount + shipping - cashback_wallet - affiliate_wallet,
    )
}

#[derive(Clone)]
pub struct WalletManager {
    api: Arc<dyn WalletApi>,
    sessions: SessionStore,
    events: EventSender,
    sweepers: Arc<DashMap<String, JoinHandle<()>>>,
    poll_interval: Duration,
}

impl WalletManager {
    pub fn new(
        api: Arc<dyn WalletApi>,
        sessions: SessionStore,
        events: EventSender,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            api,
            sessions,
            events,
            sweepers: Arc::new(DashMap::new()),
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    /// Reserves `amount` from the user's cashback wallet and starts the
    /// expiry sweeper for this session.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        session_id: &str,
        user_id: i64,
        amount: Decimal,
    ) -> Result<WalletReservation, ServiceError> {
        if amount <= Decimal::ZERO {
            return Err(ServiceError::InvalidInput(
                "redemption amount must be positive".to_string(),
            ));
        }

        let balance = money::decimal_from_f64(self.api.wallet(user_id).await?.cashback_balance);
        if amount > balance {
            return Err(ServiceError::ValidationError(format!(
                "redemption amount {} exceeds cashback balance {}",
                amount, balance
            )));
        }

        let expires_at = self
            .api
            .reserve(user_id, amount, "Checkout cashback redemption")
            .await?;
        let reservation = WalletReservation { amount, expires_at };

        self.sessions
            .set(session_id, keys::WALLET_RESERVATION, &reservation)
            .await?;
        self.sessions
            .remove(session_id, keys::WALLET_EXPIRED_NOTIFIED)
            .await?;

        self.events
            .send_or_log(Event::WalletReserved {
                session_id: session_id.to_string(),
                amount,
                expires_at,
            })
            .await;

        self.spawn_sweeper(session_id);
        Ok(reservation)
    }

    /// Drops the reservation without consuming it.
    #[instrument(skip(self))]
    pub async fn release(&self, session_id: &str) -> Result<(), ServiceError> {
        self.sessions
            .remove(session_id, keys::WALLET_RESERVATION)
            .await?;
        self.sessions
            .remove(session_id, keys::WALLET_EXPIRED_NOTIFIED)
            .await?;
        self.abort_sweeper(session_id);

        self.events
            .send_or_log(Event::WalletReservationReleased {
                session_id: session_id.to_string(),
            })
            .await;
        Ok(())
    }

    /// Checks the reservation against the clock. Expiry zeroes the hold,
    /// clears session state, and fires the expiry event once; repeated
    /// checks after that are no-ops.
    pub async fn check_expiry(&self, session_id: &str) -> Result<RedemptionState, ServiceError> {
        let reservation: Option<WalletReservation> = self
            .sessions
            .get(session_id, keys::WALLET_RESERVATION)
            .await?;

        let reservation = match reservation {
            Some(r) => r,
            None => return Ok(RedemptionState::Idle),
        };

        if !reservation.is_expired_at(Utc::now()) {
            return Ok(RedemptionState::Reserved(reservation));
        }

        self.sessions
            .remove(session_id, keys::WALLET_RESERVATION)
            .await?;

        let already_notified: Option<bool> = self
            .sessions
            .get(session_id, keys::WALLET_EXPIRED_NOTIFIED)
            .await?;
        if already_notified != Some(true) {
            self.sessions
                .set(session_id, keys::WALLET_EXPIRED_NOTIFIED, &true)
                .await?;
            self.events
                .send_or_log(Event::WalletReservationExpired {
                    session_id: session_id.to_string(),
                })
                .await;
        }

        Ok(RedemptionState::Expired)
    }

    /// Amount currently deductible from the payable total.
    pub async fn redeemable_amount(&self, session_id: &str) -> Result<Decimal, ServiceError> {
        Ok(self.check_expiry(session_id).await?.redeemable_amount())
    }

    /// Marks the hold as spent by a placed order and stops its sweeper. The
    /// consumption record survives post-order session cleanup. A missing or
    /// expired hold consumes nothing.
    #[instrument(skip(self))]
    pub async fn consume(&self, session_id: &str) -> Result<Decimal, ServiceError> {
        let amount = self.check_expiry(session_id).await?.redeemable_amount();
        if amount == Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }

        self.sessions
            .remove(session_id, keys::WALLET_RESERVATION)
            .await?;
        self.sessions
            .set(
                session_id,
                keys::WALLET_CONSUMED,
                &RedemptionState::Consumed { amount },
            )
            .await?;
        self.abort_sweeper(session_id);

        self.events
            .send_or_log(Event::WalletConsumed {
                session_id: session_id.to_string(),
                amount,
            })
            .await;
        Ok(amount)
    }

    /// Affiliate commission balance, degraded to zero when the lookup
    /// fails. NaN-guarded at conversion.
    #[instrument(skip(self))]
    pub async fn affiliate_wallet_amount(&self, user_id: i64) -> Decimal {
        match self.api.affiliate_wallet(user_id).await {
            Ok(balance) => money::decimal_from_f64(balance),
            Err(e) => {
                warn!("Affiliate wallet lookup failed for user {}: {}", user_id, e);
                Decimal::ZERO
            }
        }
    }

    /// Records an affiliate wallet deduction post-order. Callers treat
    /// failures as non-fatal.
    pub async fn log_transaction(
        &self,
        transaction: &AffiliateTransaction,
    ) -> Result<(), ServiceError> {
        self.api.log_affiliate_transaction(transaction).await
    }

    /// Stops the expiry sweeper for a finished session.
    pub fn teardown_session(&self, session_id: &str) {
        self.abort_sweeper(session_id);
    }

    fn abort_sweeper(&self, session_id: &str) {
        if let Some((_, handle)) = self.sweepers.remove(session_id) {
            handle.abort();
        }
    }

    fn spawn_sweeper(&self, session_id: &str) {
        self.abort_sweeper(session_id);

        let manager = self.clone();
        let session = session_id.to_string();
        let poll = self.poll_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                match manager.check_expiry(&session).await {
                    Ok(RedemptionState::Reserved(_)) => continue,
                    Ok(_) => break,
                    Err(e) => {
                        warn!("Wallet expiry sweep failed for session {}: {}", session, e);
                    }
                }
            }
            manager.sweepers.remove(&session);
        });

        self.sweepers.insert(session_id.to_string(), handle);
    }
}
