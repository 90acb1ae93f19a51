//! BillingLineInstance - the materialized, persisted unit of billing
//!
//! A line records where its rates came from, the frozen quantity rule, both
//! modifiers, the full tax breakdown and an audit trail. Lines are created in
//! `Draft`, may be `Confirmed`, and may be `Voided` from either state. Only
//! drafts may be recomputed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::modifier::LineModifier;
use super::project::TaxTreatment;
use super::rule::AppliedRuleSnapshot;

/// Provenance of a line's effective rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Rate card base rates only
    RateCard,
    /// At least one rate replaced by a project override
    ProjectOverride,
    /// Added without any rate card entry
    DirectAddition,
}

impl std::fmt::Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateSource::RateCard => write!(f, "rate_card"),
            RateSource::ProjectOverride => write!(f, "project_override"),
            RateSource::DirectAddition => write!(f, "direct_addition"),
        }
    }
}

/// Billing line lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingLineStatus {
    #[default]
    Draft,
    Confirmed,
    Voided,
}

impl BillingLineStatus {
    /// Whether quantity and modifiers may still change
    pub fn is_editable(&self) -> bool {
        matches!(self, BillingLineStatus::Draft)
    }

    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, BillingLineStatus::Voided)
    }

    /// Allowed transitions: draft -> confirmed, draft -> voided, confirmed -> voided
    pub fn can_transition_to(&self, next: BillingLineStatus) -> bool {
        matches!(
            (self, next),
            (BillingLineStatus::Draft, BillingLineStatus::Confirmed)
                | (BillingLineStatus::Draft, BillingLineStatus::Voided)
                | (BillingLineStatus::Confirmed, BillingLineStatus::Voided)
        )
    }
}

impl std::fmt::Display for BillingLineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingLineStatus::Draft => write!(f, "draft"),
            BillingLineStatus::Confirmed => write!(f, "confirmed"),
            BillingLineStatus::Voided => write!(f, "voided"),
        }
    }
}

/// Tax-aware financial breakdown of a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub tax_treatment: TaxTreatment,
    pub tax_rate: Decimal,
    pub line_cost_total: Decimal,
    pub line_client_total_pre_tax: Decimal,
    pub tax_amount: Decimal,
    pub line_client_total_inc_tax: Decimal,
    /// Pre-tax client total minus cost total, regardless of treatment
    pub line_margin: Decimal,
}

/// Persisted billing line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingLineInstance {
    pub id: Uuid,
    pub project_id: Uuid,
    pub rate_item_id: Uuid,
    /// Card the base rates were read from (absent for direct additions)
    pub rate_card_id: Option<Uuid>,
    pub currency: String,

    // Rate provenance
    pub rate_source: RateSource,
    pub base_cost_rate: Option<Decimal>,
    pub base_client_rate: Option<Decimal>,
    pub override_cost_rate: Option<Decimal>,
    pub override_client_rate: Option<Decimal>,
    pub effective_cost_rate: Decimal,
    pub effective_client_rate: Decimal,
    pub final_cost_rate: Decimal,
    pub final_client_rate: Decimal,

    // Quantity
    pub quantity_input: Decimal,
    pub effective_quantity: Decimal,
    pub applied_rule: AppliedRuleSnapshot,

    // Modifiers
    pub client_modifier: LineModifier,
    pub cost_modifier: LineModifier,

    pub totals: TaxBreakdown,
    pub status: BillingLineStatus,

    /// Digest of the computation that produced the current figures
    pub fingerprint: String,

    /// Version for optimistic concurrency control
    pub version: u64,

    // Audit trail
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub confirmed_by: Option<String>,
    pub voided_at: Option<DateTime<Utc>>,
    pub voided_by: Option<String>,
    pub void_reason: Option<String>,
}

impl std::fmt::Display for BillingLineInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BillingLine({}, qty={}, client={} {}, status={})",
            self.id,
            self.effective_quantity,
            self.totals.line_client_total_inc_tax,
            self.currency,
            self.status
        )
    }
}
