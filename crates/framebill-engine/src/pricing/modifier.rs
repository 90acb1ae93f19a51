//! Modifier application
//!
//! Each side of a line carries one modifier:
//!
//! ```text
//! percentage:  final = effective * value
//! fixed:       final = fixed_amount ?? effective      (replacement)
//! ```
//!
//! A modifier is active only when it changes the effective rate. Bounds on
//! percentage values are validated here; the reason-code requirement for
//! active modifiers is enforced by the assembler.

use framebill_common::{
    BillingError, LineModifier, ModifierSide, ModifierType, PERCENTAGE_IDENTITY,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ModifierBounds;

/// Whether `modifier` changes `effective_rate`
pub fn is_active(modifier: &LineModifier, effective_rate: Decimal) -> bool {
    match modifier.modifier_type {
        ModifierType::Percentage => modifier.value != PERCENTAGE_IDENTITY,
        ModifierType::Fixed => modifier
            .fixed_amount
            .map(|amount| amount != effective_rate)
            .unwrap_or(false),
    }
}

/// Validate a modifier against the bounds for its side.
///
/// The identity percentage is always accepted.
pub fn validate(
    side: ModifierSide,
    modifier: &LineModifier,
    bounds: &ModifierBounds,
) -> Result<(), BillingError> {
    match modifier.modifier_type {
        ModifierType::Percentage => {
            if modifier.value == PERCENTAGE_IDENTITY {
                return Ok(());
            }
            let (min, max) = bounds.range(side);
            if modifier.value < min || modifier.value > max {
                return Err(BillingError::ModifierOutOfRange {
                    side,
                    value: modifier.value,
                    min,
                    max,
                });
            }
            Ok(())
        }
        ModifierType::Fixed => match modifier.fixed_amount {
            Some(amount) if amount < Decimal::ZERO => {
                Err(BillingError::InvalidFixedAmount { side, amount })
            }
            _ => Ok(()),
        },
    }
}

/// Final rate after applying `modifier` to `effective_rate`.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn apply(modifier: &LineModifier, effective_rate: Decimal) -> Option<Decimal> {
    match modifier.modifier_type {
        ModifierType::Percentage => effective_rate.checked_mul(modifier.value),
        ModifierType::Fixed => Some(modifier.fixed_amount.unwrap_or(effective_rate)),
    }
}

/// Modifier outcome for one side of a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedModifier {
    pub side: ModifierSide,
    pub modifier: LineModifier,
    pub effective_rate: Decimal,
    pub final_rate: Decimal,
    pub is_active: bool,
}

/// Validates and applies modifiers under configured bounds
#[derive(Debug, Clone, Default)]
pub struct ModifierApplicator {
    bounds: ModifierBounds,
}

impl ModifierApplicator {
    pub fn new(bounds: ModifierBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> &ModifierBounds {
        &self.bounds
    }

    /// Validate then apply one side
    pub fn apply_side(
        &self,
        side: ModifierSide,
        modifier: &LineModifier,
        effective_rate: Decimal,
    ) -> Result<AppliedModifier, BillingError> {
        validate(side, modifier, &self.bounds)?;
        let final_rate =
            apply(modifier, effective_rate).ok_or(BillingError::AmountOverflow("final rate"))?;

        Ok(AppliedModifier {
            side,
            modifier: modifier.clone(),
            effective_rate,
            final_rate,
            is_active: is_active(modifier, effective_rate),
        })
    }
}
