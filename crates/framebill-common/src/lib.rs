//! # Framebill Common
//!
//! Shared types, errors, and money helpers for the Framebill billing engine.
//!
//! ## Core Types
//!
//! - [`RateItem`]: catalog-defined billable unit (e.g. "Photographer Hour")
//! - [`RateCard`]/[`RateCardEntry`]: currency-scoped base cost/client rates
//! - [`ProjectPricingOverride`]: per-project replacement of base rates
//! - [`AppliedRuleSnapshot`]: frozen, versioned quantity rule
//! - [`LineModifier`]: ad-hoc, audited rate adjustment for one side of a line
//! - [`BillingLineInstance`]: the materialized, persisted unit of billing
//!
//! ## Money
//!
//! All rates and amounts are [`rust_decimal::Decimal`]. Floating point only
//! appears at the display boundary, see [`money::to_display`].

pub mod error;
pub mod money;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BillingError, CatalogError, FramebillError, LifecycleError, Result};
pub use types::{
    billing_line::{BillingLineInstance, BillingLineStatus, RateSource, TaxBreakdown},
    modifier::{LineModifier, ModifierReasonCode, ModifierSide, ModifierSource, ModifierType},
    project::{ProjectPricingOverride, ProjectPricingSettings, TaxTreatment},
    rate_card::{RateCard, RateCardEntry},
    rate_item::{RateItem, RateItemStatus, UnitType},
    rule::{AppliedRuleSnapshot, RuleType, RULE_SCHEMA_VERSION},
};

/// Framebill version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decimal places kept on persisted currency amounts
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// Identity value for a percentage modifier
pub const PERCENTAGE_IDENTITY: rust_decimal::Decimal = rust_decimal::Decimal::ONE;
