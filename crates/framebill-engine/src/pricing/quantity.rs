//! Quantity rule evaluation
//!
//! Applies a frozen rule snapshot to an input quantity. Malformed rule JSON
//! is treated exactly like "no rule": the evaluator never fails.

use framebill_common::{AppliedRuleSnapshot, RuleType};
use rust_decimal::Decimal;
use tracing::warn;

/// Parse rule JSON leniently.
///
/// Absent, unparseable or inconsistent JSON yields [`AppliedRuleSnapshot::none`].
pub fn snapshot_from_json(json: Option<&str>) -> AppliedRuleSnapshot {
    let Some(raw) = json else {
        return AppliedRuleSnapshot::none();
    };

    if raw.trim().is_empty() {
        return AppliedRuleSnapshot::none();
    }

    match AppliedRuleSnapshot::parse_strict(raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(len = raw.len(), error = %e, "Ignoring malformed quantity rule");
            AppliedRuleSnapshot::none()
        }
    }
}

/// Effective quantity under `rule`.
///
/// `minimum` rules raise the quantity to the minimum; anything else passes
/// the input through. A minimum rule with no usable minimum counts as none.
pub fn effective_quantity(quantity_input: Decimal, rule: &AppliedRuleSnapshot) -> Decimal {
    match (rule.rule_type, rule.minimum) {
        (RuleType::Minimum, Some(minimum)) if minimum >= Decimal::ZERO => {
            quantity_input.max(minimum)
        }
        _ => quantity_input,
    }
}
