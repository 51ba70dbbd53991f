use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event; a full or closed channel is logged and swallowed.
    /// Events are observability fan-out, never part of the request contract.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Dropping event: {}", e);
        }
    }
}

/// Events emitted by the checkout pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Checkout lifecycle
    CheckoutStarted {
        session_id: String,
        user_id: i64,
    },
    CheckoutStepChanged {
        session_id: String,
        step: u8,
    },
    CheckoutRedirectedToAssignment {
        session_id: String,
    },

    // Discount events
    PromoApplied {
        session_id: String,
        code: String,
        amount: Decimal,
    },
    GiftMilestoneApplied {
        session_id: String,
        min_amount: Decimal,
    },

    // Wallet events
    WalletReserved {
        session_id: String,
        amount: Decimal,
        expires_at: DateTime<Utc>,
    },
    WalletReservationExpired {
        session_id: String,
    },
    WalletReservationReleased {
        session_id: String,
    },
    WalletConsumed {
        session_id: String,
        amount: Decimal,
    },
    WalletBalanceChanged {
        user_id: i64,
    },

    // Order / payment events
    PaymentSessionCreated {
        session_id: String,
        order_reference: String,
    },
    OrderCreated {
        session_id: String,
        order_id: i64,
    },
    AffiliateTransactionLogged {
        user_id: i64,
        amount: Decimal,
    },
    CartCleared {
        session_id: String,
    },

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

/// Drains the event channel for the lifetime of the process. Downstream
/// consumers (cart badge refresh, wallet balance push, analytics) subscribe
/// here; the default loop logs every event.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated {
                session_id,
                order_id,
            } => {
                info!("Order {} created from checkout session {}", order_id, session_id);
            }
            Event::WalletReservationExpired { session_id } => {
                info!("Wallet reservation expired for session {}", session_id);
            }
            other => {
                info!("Received event: {:?}", other);
            }
        }
    }

    info!("Event channel closed; stopping event processing loop");
}
