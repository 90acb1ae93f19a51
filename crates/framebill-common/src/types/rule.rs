//! Applied rule snapshots
//!
//! A rule snapshot is a frozen copy of the quantity rule in effect when a
//! line was computed. It is stored on the line so later catalog edits never
//! change historical invoices.
//!
//! Wire shape (as stored by catalog management):
//!
//! ```json
//! {"schemaVersion": 1, "ruleType": "minimum", "minimum": 2, "unit": "hours"}
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

/// Current rule schema version
pub const RULE_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    RULE_SCHEMA_VERSION
}

/// Kind of quantity rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[default]
    None,
    Minimum,
}

/// Versioned, frozen quantity rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedRuleSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub rule_type: RuleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Decimal>,
    /// Display label only; has no effect on arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Default for AppliedRuleSnapshot {
    fn default() -> Self {
        Self::none()
    }
}

impl AppliedRuleSnapshot {
    /// No quantity rule
    pub fn none() -> Self {
        Self {
            schema_version: RULE_SCHEMA_VERSION,
            rule_type: RuleType::None,
            minimum: None,
            unit: None,
        }
    }

    /// Minimum-quantity rule
    pub fn minimum(minimum: Decimal, unit: Option<String>) -> Self {
        Self {
            schema_version: RULE_SCHEMA_VERSION,
            rule_type: RuleType::Minimum,
            minimum: Some(minimum),
            unit,
        }
    }

    /// Parse and validate rule JSON.
    ///
    /// Used by catalog management before saving a rule. Computation paths
    /// never call this directly; they recover malformed rules as `none`.
    pub fn parse_strict(json: &str) -> Result<Self, BillingError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| BillingError::InvalidRuleSnapshot(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Check internal consistency of the snapshot
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.schema_version == 0 || self.schema_version > RULE_SCHEMA_VERSION {
            return Err(BillingError::InvalidRuleSnapshot(format!(
                "unsupported schema version {}",
                self.schema_version
            )));
        }

        if self.rule_type == RuleType::Minimum {
            match self.minimum {
                None => {
                    return Err(BillingError::InvalidRuleSnapshot(
                        "minimum rule without a minimum".to_string(),
                    ))
                }
                Some(min) if min < Decimal::ZERO => {
                    return Err(BillingError::InvalidRuleSnapshot(format!(
                        "negative minimum {}",
                        min
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }

    /// Serialize for storage
    pub fn to_json(&self) -> String {
        // Plain data with string keys; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}
