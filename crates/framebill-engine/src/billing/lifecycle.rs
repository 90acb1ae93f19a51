//! Billing line state machine
//!
//! ```text
//! draft ──confirm──> confirmed ──void──> voided
//!   └──────────────────void──────────────────┘
//! ```
//!
//! Quantity and modifiers may change only while a line is `draft`. Voiding
//! requires a reason and leaves every financial field untouched for audit.
//! Timestamps and actors are supplied by the caller.

use chrono::{DateTime, Utc};
use framebill_common::{
    BillingLineInstance, BillingLineStatus, LifecycleError, ProjectPricingOverride,
    RateCardEntry, RateSource,
};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::catalog::RetainedReasonCodes;
use crate::pricing::{BillingLineComputation, RateBasis};

/// Identity and scope of a line about to be materialized
#[derive(Debug, Clone)]
pub struct LineContext {
    pub line_id: Uuid,
    pub project_id: Uuid,
    pub rate_card_id: Option<Uuid>,
    pub currency: String,
}

/// Build a new draft line from a computation
pub fn materialize(
    computation: &BillingLineComputation,
    context: &LineContext,
    actor: &str,
    at: DateTime<Utc>,
) -> BillingLineInstance {
    let rates = &computation.rates;
    BillingLineInstance {
        id: context.line_id,
        project_id: context.project_id,
        rate_item_id: computation.rate_item_id,
        rate_card_id: context.rate_card_id,
        currency: context.currency.clone(),
        rate_source: rates.rate_source,
        base_cost_rate: rates.base_cost_rate,
        base_client_rate: rates.base_client_rate,
        override_cost_rate: rates.override_cost_rate,
        override_client_rate: rates.override_client_rate,
        effective_cost_rate: rates.effective_cost_rate,
        effective_client_rate: rates.effective_client_rate,
        final_cost_rate: computation.final_cost_rate(),
        final_client_rate: computation.final_client_rate(),
        quantity_input: computation.quantity_input,
        effective_quantity: computation.effective_quantity,
        applied_rule: computation.applied_rule.clone(),
        client_modifier: computation.client.modifier.clone(),
        cost_modifier: computation.cost.modifier.clone(),
        totals: computation.totals.clone(),
        status: BillingLineStatus::Draft,
        fingerprint: computation.fingerprint(),
        version: 0,
        created_at: at,
        created_by: actor.to_string(),
        modified_at: None,
        modified_by: None,
        confirmed_at: None,
        confirmed_by: None,
        voided_at: None,
        voided_by: None,
        void_reason: None,
    }
}

/// Fail unless the line is still a draft
pub fn ensure_editable(line: &BillingLineInstance) -> Result<(), LifecycleError> {
    if line.status.is_editable() {
        Ok(())
    } else {
        Err(LifecycleError::LineLocked {
            line_id: line.id,
            status: line.status,
        })
    }
}

/// Replace a draft line's quantity, modifiers and totals with a recomputation
pub fn apply_computation(
    line: &mut BillingLineInstance,
    computation: &BillingLineComputation,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    ensure_editable(line)?;

    line.effective_cost_rate = computation.rates.effective_cost_rate;
    line.effective_client_rate = computation.rates.effective_client_rate;
    line.final_cost_rate = computation.final_cost_rate();
    line.final_client_rate = computation.final_client_rate();
    line.quantity_input = computation.quantity_input;
    line.effective_quantity = computation.effective_quantity;
    line.client_modifier = computation.client.modifier.clone();
    line.cost_modifier = computation.cost.modifier.clone();
    line.totals = computation.totals.clone();
    line.fingerprint = computation.fingerprint();
    line.modified_at = Some(at);
    line.modified_by = Some(actor.to_string());
    Ok(())
}

/// Lock a draft line against further edits
pub fn confirm(
    line: &mut BillingLineInstance,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    transition(line, BillingLineStatus::Confirmed)?;
    line.confirmed_at = Some(at);
    line.confirmed_by = Some(actor.to_string());
    Ok(())
}

/// Void a draft or confirmed line; totals are preserved as they are
pub fn void(
    line: &mut BillingLineInstance,
    reason: &str,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<(), LifecycleError> {
    if !line.status.can_transition_to(BillingLineStatus::Voided) {
        return Err(LifecycleError::InvalidTransition {
            from: line.status,
            to: BillingLineStatus::Voided,
        });
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(LifecycleError::MissingVoidReason);
    }

    transition(line, BillingLineStatus::Voided)?;
    line.voided_at = Some(at);
    line.voided_by = Some(actor.to_string());
    line.void_reason = Some(reason.to_string());
    Ok(())
}

fn transition(
    line: &mut BillingLineInstance,
    next: BillingLineStatus,
) -> Result<(), LifecycleError> {
    if !line.status.can_transition_to(next) {
        return Err(LifecycleError::InvalidTransition {
            from: line.status,
            to: next,
        });
    }

    info!(line_id = %line.id, from = %line.status, to = %next, "Billing line transition");
    line.status = next;
    Ok(())
}

/// Rates frozen on a persisted line, rebuilt as pricing inputs
#[derive(Debug, Clone)]
pub enum FrozenRates {
    Catalog {
        entry: Option<RateCardEntry>,
        override_rates: Option<ProjectPricingOverride>,
    },
    Direct {
        cost_rate: Decimal,
        client_rate: Decimal,
    },
}

impl FrozenRates {
    /// Rebuild the rate inputs a line was priced with.
    ///
    /// Later catalog edits do not affect the result.
    pub fn from_line(line: &BillingLineInstance) -> Self {
        if line.rate_source == RateSource::DirectAddition {
            return FrozenRates::Direct {
                cost_rate: line.base_cost_rate.unwrap_or(line.effective_cost_rate),
                client_rate: line.base_client_rate.unwrap_or(line.effective_client_rate),
            };
        }

        let entry = match (line.base_cost_rate, line.base_client_rate) {
            (Some(cost), Some(client)) => Some(RateCardEntry::new(
                line.rate_card_id.unwrap_or_else(Uuid::nil),
                line.rate_item_id,
                cost,
                client,
            )),
            _ => None,
        };

        let has_override = line.override_cost_rate.is_some() || line.override_client_rate.is_some();
        let override_rates = if has_override {
            Some(ProjectPricingOverride {
                project_id: line.project_id,
                rate_item_id: line.rate_item_id,
                cost_rate: line.override_cost_rate,
                client_rate: line.override_client_rate,
                reason: String::new(),
            })
        } else {
            None
        };

        FrozenRates::Catalog {
            entry,
            override_rates,
        }
    }

    pub fn basis(&self) -> RateBasis<'_> {
        match self {
            FrozenRates::Catalog {
                entry,
                override_rates,
            } => RateBasis::Catalog {
                entry: entry.as_ref(),
                override_rates: override_rates.as_ref(),
            },
            FrozenRates::Direct {
                cost_rate,
                client_rate,
            } => RateBasis::Direct {
                cost_rate: *cost_rate,
                client_rate: *client_rate,
            },
        }
    }
}

/// Reason codes currently recorded on each side of a line
pub fn retained_reason_codes(line: &BillingLineInstance) -> RetainedReasonCodes {
    RetainedReasonCodes::new(&line.client_modifier, &line.cost_modifier)
}
