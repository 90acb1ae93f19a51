//! Line modifiers - ad-hoc, audited rate adjustments
//!
//! Each billing line carries two independent modifiers: one on the client
//! (revenue) side and one on the cost (expense) side. A modifier is either
//! multiplicative (`Percentage`, identity `1.0`) or a replacement rate
//! (`Fixed`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PERCENTAGE_IDENTITY;

/// How a modifier changes the effective rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierType {
    /// `final = effective * value`
    #[default]
    Percentage,
    /// `final = fixed_amount` (replacement, not additive)
    Fixed,
}

/// Which side of the line a modifier applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSide {
    /// Revenue side, billed to the client
    Client,
    /// Expense side, paid to the contractor
    Cost,
}

impl std::fmt::Display for ModifierSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModifierSide::Client => write!(f, "client"),
            ModifierSide::Cost => write!(f, "cost"),
        }
    }
}

/// Where a modifier was entered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierSource {
    /// Untouched identity modifier
    #[default]
    Default,
    /// Set while adding a new manual line
    ManualAdd,
    /// Set while editing an existing line
    LineEdit,
}

/// Modifier record for one side of a line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineModifier {
    pub modifier_type: ModifierType,
    /// Percentage multiplier; `1.0` leaves the rate unchanged
    pub value: Decimal,
    /// Replacement rate for `Fixed` modifiers
    pub fixed_amount: Option<Decimal>,
    pub reason_code: Option<String>,
    pub note: Option<String>,
    pub source: ModifierSource,
}

impl Default for LineModifier {
    fn default() -> Self {
        Self::identity()
    }
}

impl LineModifier {
    /// Modifier that leaves the rate unchanged
    pub fn identity() -> Self {
        Self {
            modifier_type: ModifierType::Percentage,
            value: PERCENTAGE_IDENTITY,
            fixed_amount: None,
            reason_code: None,
            note: None,
            source: ModifierSource::Default,
        }
    }

    /// Multiplicative modifier
    pub fn percentage(value: Decimal) -> Self {
        Self {
            value,
            ..Self::identity()
        }
    }

    /// Replacement-rate modifier
    pub fn fixed(amount: Decimal) -> Self {
        Self {
            modifier_type: ModifierType::Fixed,
            fixed_amount: Some(amount),
            ..Self::identity()
        }
    }

    /// Set the audit reason code
    pub fn with_reason(mut self, code: impl Into<String>) -> Self {
        self.reason_code = Some(code.into());
        self
    }

    /// Set a free-text note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Record where the modifier was entered
    pub fn with_source(mut self, source: ModifierSource) -> Self {
        self.source = source;
        self
    }

    /// Copy with the reason code trimmed; a blank code becomes `None`
    pub fn normalized(&self) -> Self {
        Self {
            reason_code: self
                .reason_code
                .as_deref()
                .map(str::trim)
                .filter(|code| !code.is_empty())
                .map(str::to_string),
            ..self.clone()
        }
    }
}

/// Allowed justification for an ad-hoc adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierReasonCode {
    /// Unique code, e.g. `RUSH`
    pub code: String,
    pub display_name: String,
    /// Inactive codes stay valid on existing lines but cannot be picked anew
    pub active: bool,
}

impl ModifierReasonCode {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}
