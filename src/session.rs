//! Session-scoped checkout state.
//!
//! Everything the checkout flow persists between requests (cart snapshot,
//! wallet reservation, promo/milestone selections, multi-address mapping,
//! selected address, pending-order descriptor) lives behind the
//! [`CheckoutSessionStore`] trait: typed get/set/remove per logical key,
//! JSON-serialized values. The core never touches a storage backend
//! directly, which keeps wallet/promo/multi-address state testable.
//!
//! Conflict policy is last-write-wins; the orchestrator serializes mutations
//! per session, so no two logical flows write the same key concurrently.

use crate::errors::ServiceError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Logical keys for session-scoped state.
pub mod keys {
    pub const USER_ID: &str = "user_id";
    pub const CART: &str = "cart";
    pub const FORM: &str = "form";
    pub const STEP: &str = "step";
    pub const SELECTED_ADDRESS: &str = "selected_address";
    pub const CHECKOUT_MODE: &str = "checkout_mode";
    pub const ASSIGNMENT_CART: &str = "assignment_cart";
    pub const PROMO: &str = "promo";
    pub const AFFILIATE_DISCOUNT: &str = "affiliate_discount";
    pub const GIFT_MILESTONE: &str = "gift_milestone";
    pub const WALLET_RESERVATION: &str = "wallet_reservation";
    pub const WALLET_EXPIRED_NOTIFIED: &str = "wallet_expired_notified";
    /// Record of a hold spent by a placed order. Deliberately absent from
    /// [`CLEARED_ON_ORDER`]: the record must outlive post-order cleanup.
    pub const WALLET_CONSUMED: &str = "wallet_consumed";
    pub const AFFILIATE_WALLET_AMOUNT: &str = "affiliate_wallet_amount";
    pub const PENDING_ORDER: &str = "pending_order";
    pub const PROCESSING: &str = "processing";
    pub const PINCODE_CHECK_IN_FLIGHT: &str = "pincode_check_in_flight";

    /// Keys cleared after a successful order submission.
    pub const CLEARED_ON_ORDER: &[&str] = &[
        CART,
        FORM,
        STEP,
        SELECTED_ADDRESS,
        CHECKOUT_MODE,
        ASSIGNMENT_CART,
        PROMO,
        AFFILIATE_DISCOUNT,
        GIFT_MILESTONE,
        WALLET_RESERVATION,
        WALLET_EXPIRED_NOTIFIED,
        AFFILIATE_WALLET_AMOUNT,
        PENDING_ORDER,
    ];
}

/// String-level storage contract. Implementations only need get/set/remove
/// semantics keyed by `(session_id, key)` with optional TTL.
#[async_trait]
pub trait CheckoutSessionStore: Send + Sync {
    async fn get_raw(&self, session_id: &str, key: &str)
        -> Result<Option<String>, ServiceError>;
    async fn set_raw(
        &self,
        session_id: &str,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), ServiceError>;
    async fn remove(&self, session_id: &str, key: &str) -> Result<(), ServiceError>;
}

/// Typed facade over a [`CheckoutSessionStore`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<dyn CheckoutSessionStore>,
    default_ttl: Option<Duration>,
}

impl SessionStore {
    pub fn new(inner: Arc<dyn CheckoutSessionStore>, default_ttl: Option<Duration>) -> Self {
        Self { inner, default_ttl }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<T>, ServiceError> {
        match self.inner.get_raw(session_id, key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize>(
        &self,
        session_id: &str,
        key: &str,
        value: &T,
    ) -> Result<(), ServiceError> {
        let raw = serde_json::to_string(value)?;
        self.inner
            .set_raw(session_id, key, raw, self.default_ttl)
            .await
    }

    pub async fn remove(&self, session_id: &str, key: &str) -> Result<(), ServiceError> {
        self.inner.remove(session_id, key).await
    }

    pub async fn remove_all(
        &self,
        session_id: &str,
        keys: &[&str],
    ) -> Result<(), ServiceError> {
        for key in keys {
            self.inner.remove(session_id, key).await?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct SessionEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl SessionEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() > expires_at,
            None => false,
        }
    }
}

/// In-memory session store. Suitable for a single-process deployment and
/// for tests; a distributed deployment swaps in a shared backend behind the
/// same trait.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    store: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn composite_key(session_id: &str, key: &str) -> String {
        format!("{}:{}", session_id, key)
    }
}

#[async_trait]
impl CheckoutSessionStore for InMemorySessionStore {
    async fn get_raw(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<String>, ServiceError> {
        let composite = Self::composite_key(session_id, key);
        let expired = {
            let store = self
                .store
                .read()
                .map_err(|e| ServiceError::SessionStoreError(e.to_string()))?;
            match store.get(&composite) {
                Some(entry) if entry.is_expired() => true,
                Some(entry) => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            let mut store = self
                .store
                .write()
                .map_err(|e| ServiceError::SessionStoreError(e.to_string()))?;
            store.remove(&composite);
        }
        Ok(None)
    }

    async fn set_raw(
        &self,
        session_id: &str,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), ServiceError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| ServiceError::SessionStoreError(e.to_string()))?;
        store.insert(
            Self::composite_key(session_id, key),
            SessionEntry::new(value, ttl),
        );
        Ok(())
    }

    async fn remove(&self, session_id: &str, key: &str) -> Result<(), ServiceError> {
        let mut store = self
            .store
            .write()
            .map_err(|e| ServiceError::SessionStoreError(e.to_string()))?;
        store.remove(&Self::composite_key(session_id, key));
        Ok(())
    }
}
