//! Rate resolution
//!
//! Picks the effective cost and client rate for a rate item. A project
//! override wins over the rate card base, independently per side.

use framebill_common::{BillingError, ProjectPricingOverride, RateCardEntry, RateSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the base rates for a computation come from
#[derive(Debug, Clone, Copy)]
pub enum RateBasis<'a> {
    /// Rate card entry plus optional project override
    Catalog {
        entry: Option<&'a RateCardEntry>,
        override_rates: Option<&'a ProjectPricingOverride>,
    },
    /// Line added without a rate card entry; bypasses resolution
    Direct {
        cost_rate: Decimal,
        client_rate: Decimal,
    },
}

/// Resolved rates with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRates {
    pub base_cost_rate: Option<Decimal>,
    pub base_client_rate: Option<Decimal>,
    pub override_cost_rate: Option<Decimal>,
    pub override_client_rate: Option<Decimal>,
    pub effective_cost_rate: Decimal,
    pub effective_client_rate: Decimal,
    pub rate_source: RateSource,
}

/// Resolve effective rates for `rate_item_id`.
///
/// Fails with `RateNotConfigured` when a side has neither a base rate nor an
/// override rate.
pub fn resolve_rates(
    rate_item_id: Uuid,
    entry: Option<&RateCardEntry>,
    override_rates: Option<&ProjectPricingOverride>,
) -> Result<ResolvedRates, BillingError> {
    let base_cost_rate = entry.map(|e| e.cost_rate);
    let base_client_rate = entry.map(|e| e.client_rate);
    let override_cost_rate = override_rates.and_then(|o| o.cost_rate);
    let override_client_rate = override_rates.and_then(|o| o.client_rate);

    let not_configured = || BillingError::RateNotConfigured { rate_item_id };
    let effective_cost_rate = override_cost_rate
        .or(base_cost_rate)
        .ok_or_else(not_configured)?;
    let effective_client_rate = override_client_rate
        .or(base_client_rate)
        .ok_or_else(not_configured)?;

    let rate_source = if override_cost_rate.is_some() || override_client_rate.is_some() {
        RateSource::ProjectOverride
    } else {
        RateSource::RateCard
    };

    Ok(ResolvedRates {
        base_cost_rate,
        base_client_rate,
        override_cost_rate,
        override_client_rate,
        effective_cost_rate,
        effective_client_rate,
        rate_source,
    })
}

/// Resolve rates for any basis, including direct additions
pub fn resolve_basis(
    rate_item_id: Uuid,
    basis: RateBasis<'_>,
) -> Result<ResolvedRates, BillingError> {
    match basis {
        RateBasis::Catalog {
            entry,
            override_rates,
        } => resolve_rates(rate_item_id, entry, override_rates),
        RateBasis::Direct {
            cost_rate,
            client_rate,
        } => Ok(ResolvedRates {
            base_cost_rate: Some(cost_rate),
            base_client_rate: Some(client_rate),
            override_cost_rate: None,
            override_client_rate: None,
            effective_cost_rate: cost_rate,
            effective_client_rate: client_rate,
            rate_source: RateSource::DirectAddition,
        }),
    }
}
