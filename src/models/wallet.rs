use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A server-confirmed hold on part of the user's cashback wallet.
/// Reservations are short-lived; once `expires_at` passes, the hold is void
/// and must be zeroed with a user notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WalletReservation {
    pub amount: Decimal,
    pub expires_at: DateTime<Utc>,
}

impl WalletReservation {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Per-session redemption lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedemptionState {
    Idle,
    Reserved(WalletReservation),
    Consumed { amount: Decimal },
    Expired,
}

impl RedemptionState {
    /// The amount currently deductible from the payable total.
    pub fn redeemable_amount(&self) -> Decimal {
        match self {
            RedemptionState::Reserved(reservation) => reservation.amount,
            _ => Decimal::ZERO,
        }
    }
}
