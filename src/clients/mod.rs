//! Typed clients for the storefront's collaborator endpoints.
//!
//! Each concern (addresses, serviceability, wallets, milestones, payment
//! gateway, orders) gets one small `async_trait` trait plus a reqwest
//! implementation against the commerce backend. Services depend on the
//! traits, so tests inject stubs and never touch the network.

pub mod addresses;
pub mod milestones;
pub mod orders;
pub mod payments;
pub mod serviceability;
pub mod wallet;

pub use addresses::{AddressApi, HttpAddressApi, NewDeliveryAddress};
pub use milestones::{HttpMilestoneApi, MilestoneApi};
pub use orders::{HttpOrderApi, OrderApi};
pub use payments::{
    CreatePaymentSessionRequest, HttpCashfreeApi, PaymentGatewayApi, PaymentSession,
};
pub use serviceability::{CourierOption, HttpServiceabilityApi, ServiceabilityApi};
pub use wallet::{AffiliateTransaction, HttpWalletApi, WalletApi, WalletBalance};
