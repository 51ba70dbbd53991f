pub mod address;
pub mod cart;
pub mod checkout;
pub mod money;
pub mod order;
pub mod promo;
pub mod wallet;

pub use address::{
    normalize_address, AddressMapping, CheckoutMode, DeliveryAddress, PROFILE_ADDRESS_ID,
};
pub use cart::CartItem;
pub use checkout::{CheckoutForm, PaymentMethod};
pub use order::{ContactDetails, FulfillmentUnit, OrderPayload, PendingOrder};
pub use promo::{GiftMilestone, MilestoneDiscountType, PromoApplication};
pub use wallet::{RedemptionState, WalletReservation};
