//! Error types for Framebill
//!
//! Provides a unified error type and domain-specific error variants.
//! Expected business conditions (missing rates, bad modifiers, locked lines)
//! are always returned as values, never raised as panics.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::types::billing_line::BillingLineStatus;
use crate::types::modifier::ModifierSide;

/// Result type alias using FramebillError
pub type Result<T> = std::result::Result<T, FramebillError>;

/// Unified error type for Framebill operations
#[derive(Debug, Error)]
pub enum FramebillError {
    // Line calculation errors
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    // Line lifecycle errors
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    // Catalog lookup errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Billing line not found: {0}")]
    LineNotFound(Uuid),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Validation errors raised while computing a billing line
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BillingError {
    #[error("Rate not configured for rate item {rate_item_id}")]
    RateNotConfigured { rate_item_id: Uuid },

    #[error("Project {project_id} has no active rate card")]
    NoActiveRateCard { project_id: Uuid },

    #[error("{side} modifier {value} outside allowed range [{min}, {max}]")]
    ModifierOutOfRange {
        side: ModifierSide,
        value: Decimal,
        min: Decimal,
        max: Decimal,
    },

    #[error("{side} modifier changes the rate but has no reason code")]
    MissingReasonCode { side: ModifierSide },

    #[error("{side} modifier reason code not allowed: {code}")]
    UnknownReasonCode { side: ModifierSide, code: String },

    #[error("{side} modifier fixed amount must not be negative: {amount}")]
    InvalidFixedAmount { side: ModifierSide, amount: Decimal },

    #[error("Quantity must not be negative: {quantity}")]
    InvalidQuantity { quantity: Decimal },

    #[error("Tax rate must not be negative: {tax_rate}")]
    InvalidTaxRate { tax_rate: Decimal },

    #[error("Invalid rule snapshot: {0}")]
    InvalidRuleSnapshot(String),

    #[error("Amount overflowed while computing {0}")]
    AmountOverflow(&'static str),
}

/// Errors from the billing line state machine
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LifecycleError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: BillingLineStatus,
        to: BillingLineStatus,
    },

    #[error("Billing line {line_id} is {status} and can no longer be edited")]
    LineLocked {
        line_id: Uuid,
        status: BillingLineStatus,
    },

    #[error("Voiding a billing line requires a reason")]
    MissingVoidReason,

    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
}

/// Catalog lookup errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Rate card not found: {0}")]
    RateCardNotFound(Uuid),

    #[error("Rate item not found: {0}")]
    RateItemNotFound(Uuid),

    #[error("Rate item {0} is archived")]
    RateItemArchived(Uuid),

    #[error("Project pricing settings not found: {0}")]
    ProjectNotFound(Uuid),
}

impl From<serde_json::Error> for FramebillError {
    fn from(err: serde_json::Error) -> Self {
        FramebillError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for FramebillError {
    fn from(err: anyhow::Error) -> Self {
        FramebillError::Internal(err.to_string())
    }
}
