//! Modifier reason code catalog

use std::collections::BTreeMap;

use framebill_common::{BillingError, LineModifier, ModifierReasonCode, ModifierSide};
use serde::{Deserialize, Serialize};

/// Allowed justifications for ad-hoc adjustments, keyed by code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReasonCodeCatalog {
    codes: BTreeMap<String, ModifierReasonCode>,
}

impl ReasonCodeCatalog {
    pub fn new(codes: impl IntoIterator<Item = ModifierReasonCode>) -> Self {
        Self {
            codes: codes.into_iter().map(|c| (c.code.clone(), c)).collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&ModifierReasonCode> {
        self.codes.get(code)
    }

    /// Codes that may be picked for a new modifier, ordered by code
    pub fn active_codes(&self) -> Vec<&ModifierReasonCode> {
        self.codes.values().filter(|c| c.active).collect()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Check that `code` may justify a modifier on `side`.
    ///
    /// Active codes always pass. An inactive code passes only if it equals
    /// `retained`, the code already recorded on the same side of the line
    /// being edited.
    pub fn check(
        &self,
        side: ModifierSide,
        code: &str,
        retained: Option<&str>,
    ) -> Result<(), BillingError> {
        let code = code.trim();
        match self.codes.get(code) {
            Some(entry) if entry.active => Ok(()),
            Some(_) if retained.map(str::trim) == Some(code) => Ok(()),
            _ => Err(BillingError::UnknownReasonCode {
                side,
                code: code.to_string(),
            }),
        }
    }
}

/// Reason codes recorded on an existing line, kept per side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetainedReasonCodes {
    pub client: Option<String>,
    pub cost: Option<String>,
}

impl RetainedReasonCodes {
    pub fn new(client_modifier: &LineModifier, cost_modifier: &LineModifier) -> Self {
        Self {
            client: client_modifier.normalized().reason_code,
            cost: cost_modifier.normalized().reason_code,
        }
    }

    pub fn for_side(&self, side: ModifierSide) -> Option<&str> {
        match side {
            ModifierSide::Client => self.client.as_deref(),
            ModifierSide::Cost => self.cost.as_deref(),
        }
    }
}
