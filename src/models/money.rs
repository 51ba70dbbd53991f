//! Money helpers for currency-formatted storefront values.
//!
//! Cart prices arrive as display strings ("₹1,299", "₹ 499.50"); discounts
//! are additive conveniences, so anything unparseable is treated as zero
//! rather than an error.

use rust_decimal::{Decimal, RoundingStrategy};

/// Parses a currency-formatted string by stripping everything except
/// digits, the decimal point, and a leading sign. Empty or malformed input
/// parses to zero.
pub fn parse_amount(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    cleaned.parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

/// Rounds to the nearest whole rupee, halves away from zero.
pub fn round_rupees(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a collaborator-provided float into a Decimal, treating
/// non-finite values as zero. Wallet balances come over the wire as JSON
/// numbers and must never poison the total.
pub fn decimal_from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
}

/// Clamps a money amount at zero.
pub fn clamp_non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
