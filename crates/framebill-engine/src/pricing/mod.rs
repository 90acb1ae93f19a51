//! Pricing module
//!
//! Pure, synchronous calculation of billing lines:
//! - Rate resolution (rate card base vs. project override)
//! - Quantity rules (frozen minimum-quantity snapshots)
//! - Client and cost modifiers with bounds validation
//! - Tax-aware totals and margin

pub mod assembler;
pub mod modifier;
pub mod quantity;
pub mod resolver;
pub mod tax;

pub use assembler::{
    compute_billing_line, BillingLineAssembler, BillingLineComputation, BillingLineInput,
};
pub use modifier::{AppliedModifier, ModifierApplicator};
pub use resolver::{resolve_rates, RateBasis, ResolvedRates};
pub use tax::{TaxCalculator, TaxSettings};
