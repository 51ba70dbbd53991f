//! Checkout pipeline services.
//!
//! Leaf-first: location/serviceability resolution, discount aggregation,
//! shipping resolution, wallet redemption, multi-address expansion, the step
//! orchestrator, and the payment submission builder. Each service is a
//! `Clone` struct over `Arc`ed collaborators so handlers can share them
//! through `AppState`.

pub mod checkout;
pub mod discounts;
pub mod expansion;
pub mod location;
pub mod payment;
pub mod shipping;
pub mod wallet;

pub use checkout::{AdvanceOutcome, CheckoutQuote, CheckoutService, CheckoutSnapshot, CheckoutStep};
pub use discounts::{compute_pricing, DiscountAggregator, PricingBreakdown};
pub use expansion::{build_single_address_units, expand_multi_address, ExpansionOutcome};
pub use location::{LocationService, PincodeProbe, PincodeStatus};
pub use payment::{PaymentSubmission, SubmissionResult};
pub use shipping::{Courier, ShippingQuote, ShippingResolver};
pub use wallet::{payable_total, WalletManager};
