//! Money helpers
//!
//! Amounts are kept as fixed-point decimals. Rounding to currency precision
//! happens once per persisted total; conversion to `f64` happens only when
//! formatting for display.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to `scale` decimal places (half away from zero)
#[inline]
pub fn round_currency(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to a float for display only
pub fn to_display(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or(0.0)
}

/// Margin as a percentage of the client rate, rounded to two places.
///
/// A zero (or negative) client rate yields `0` rather than dividing, as does
/// a margin too large to represent.
pub fn margin_percentage(client_rate: Decimal, cost_rate: Decimal) -> Decimal {
    if client_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    client_rate
        .checked_sub(cost_rate)
        .and_then(|margin| margin.checked_div(client_rate))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| round_currency(pct, 2))
        .unwrap_or(Decimal::ZERO)
}
