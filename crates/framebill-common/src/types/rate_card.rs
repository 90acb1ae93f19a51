//! Rate cards - currency-scoped base price tables

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Named, currency-scoped table of base rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCard {
    pub id: Uuid,
    pub name: String,
    /// ISO 4217 currency code
    pub currency: String,
}

impl RateCard {
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currency: currency.into(),
        }
    }
}

/// Base price for one rate item under one rate card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCardEntry {
    pub rate_card_id: Uuid,
    pub rate_item_id: Uuid,
    /// What the contractor is paid per unit
    pub cost_rate: Decimal,
    /// What the client is billed per unit
    pub client_rate: Decimal,
    /// Quantity rule as stored by catalog management (may be malformed)
    pub rule_snapshot_json: Option<String>,
}

impl RateCardEntry {
    pub fn new(
        rate_card_id: Uuid,
        rate_item_id: Uuid,
        cost_rate: Decimal,
        client_rate: Decimal,
    ) -> Self {
        Self {
            rate_card_id,
            rate_item_id,
            cost_rate,
            client_rate,
            rule_snapshot_json: None,
        }
    }

    /// Attach a quantity rule
    pub fn with_rule_json(mut self, json: impl Into<String>) -> Self {
        self.rule_snapshot_json = Some(json.into());
        self
    }
}
