//! Billing line assembler
//!
//! Runs the full pipeline for one line:
//!
//! ```text
//! resolve rates -> quantity rule -> modifiers (client, cost) -> tax & margin
//! ```
//!
//! The same [`BillingLineAssembler::compute`] serves both the manual-add path
//! and the edit preview path, so identical inputs always produce identical
//! totals. It either returns a complete computation or an error; nothing is
//! mutated along the way.

use framebill_common::money::margin_percentage;
use framebill_common::{AppliedRuleSnapshot, BillingError, LineModifier, ModifierSide, TaxBreakdown};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::modifier::{AppliedModifier, ModifierApplicator};
use super::quantity::effective_quantity;
use super::resolver::{resolve_basis, RateBasis, ResolvedRates};
use super::tax::{TaxCalculator, TaxSettings};
use crate::catalog::{ReasonCodeCatalog, RetainedReasonCodes};
use crate::config::EngineConfig;

/// Everything needed to price one line
#[derive(Debug, Clone)]
pub struct BillingLineInput<'a> {
    pub rate_item_id: Uuid,
    pub basis: RateBasis<'a>,
    pub rule: AppliedRuleSnapshot,
    pub quantity_input: Decimal,
    pub client_modifier: LineModifier,
    pub cost_modifier: LineModifier,
    pub tax: TaxSettings,
    /// Reason codes already on the line being edited; accepted on the same
    /// side even if inactive
    pub retained_reason_codes: RetainedReasonCodes,
}

impl<'a> BillingLineInput<'a> {
    pub fn new(
        rate_item_id: Uuid,
        basis: RateBasis<'a>,
        quantity_input: Decimal,
        tax: TaxSettings,
    ) -> Self {
        Self {
            rate_item_id,
            basis,
            rule: AppliedRuleSnapshot::none(),
            quantity_input,
            client_modifier: LineModifier::identity(),
            cost_modifier: LineModifier::identity(),
            tax,
            retained_reason_codes: RetainedReasonCodes::default(),
        }
    }

    pub fn with_rule(mut self, rule: AppliedRuleSnapshot) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_client_modifier(mut self, modifier: LineModifier) -> Self {
        self.client_modifier = modifier;
        self
    }

    pub fn with_cost_modifier(mut self, modifier: LineModifier) -> Self {
        self.cost_modifier = modifier;
        self
    }

    pub fn with_retained_reason_codes(mut self, codes: RetainedReasonCodes) -> Self {
        self.retained_reason_codes = codes;
        self
    }
}

/// Immutable result of pricing one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingLineComputation {
    pub rate_item_id: Uuid,
    pub rates: ResolvedRates,
    pub quantity_input: Decimal,
    pub effective_quantity: Decimal,
    pub applied_rule: AppliedRuleSnapshot,
    pub client: AppliedModifier,
    pub cost: AppliedModifier,
    pub totals: TaxBreakdown,
}

impl BillingLineComputation {
    pub fn final_client_rate(&self) -> Decimal {
        self.client.final_rate
    }

    pub fn final_cost_rate(&self) -> Decimal {
        self.cost.final_rate
    }

    /// Display-only margin on the final rates
    pub fn margin_percentage(&self) -> Decimal {
        margin_percentage(self.client.final_rate, self.cost.final_rate)
    }

    /// Hex digest of the canonical JSON of this computation
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&bytes).to_hex().to_string()
    }
}

/// Orchestrates rate resolution, quantity rules, modifiers and tax
#[derive(Debug, Clone, Default)]
pub struct BillingLineAssembler {
    applicator: ModifierApplicator,
    tax: TaxCalculator,
}

impl BillingLineAssembler {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            applicator: ModifierApplicator::new(config.modifier_bounds),
            tax: TaxCalculator::new(config.currency_scale),
        }
    }

    /// Price one line
    #[instrument(skip(self, input, reason_codes), fields(rate_item_id = %input.rate_item_id))]
    pub fn compute(
        &self,
        input: &BillingLineInput<'_>,
        reason_codes: &ReasonCodeCatalog,
    ) -> Result<BillingLineComputation, BillingError> {
        if input.quantity_input < Decimal::ZERO {
            return Err(BillingError::InvalidQuantity {
                quantity: input.quantity_input,
            });
        }
        if input.tax.rate < Decimal::ZERO {
            return Err(BillingError::InvalidTaxRate {
                tax_rate: input.tax.rate,
            });
        }

        let rates = resolve_basis(input.rate_item_id, input.basis)?;
        let effective_quantity = effective_quantity(input.quantity_input, &input.rule);

        let client = self.applicator.apply_side(
            ModifierSide::Client,
            &input.client_modifier.normalized(),
            rates.effective_client_rate,
        )?;
        let cost = self.applicator.apply_side(
            ModifierSide::Cost,
            &input.cost_modifier.normalized(),
            rates.effective_cost_rate,
        )?;

        check_reason_code(&client, reason_codes, &input.retained_reason_codes)?;
        check_reason_code(&cost, reason_codes, &input.retained_reason_codes)?;

        let totals = self.tax.compute(
            effective_quantity,
            client.final_rate,
            cost.final_rate,
            &input.tax,
        )?;

        debug!(
            rate_source = %rates.rate_source,
            effective_quantity = %effective_quantity,
            client_total = %totals.line_client_total_inc_tax,
            margin = %totals.line_margin,
            "Computed billing line"
        );

        Ok(BillingLineComputation {
            rate_item_id: input.rate_item_id,
            rates,
            quantity_input: input.quantity_input,
            effective_quantity,
            applied_rule: input.rule.clone(),
            client,
            cost,
            totals,
        })
    }
}

/// Price one line under the default configuration
pub fn compute_billing_line(
    input: &BillingLineInput<'_>,
    reason_codes: &ReasonCodeCatalog,
) -> Result<BillingLineComputation, BillingError> {
    BillingLineAssembler::default().compute(input, reason_codes)
}

/// Active modifiers need a reason code the catalog accepts
fn check_reason_code(
    applied: &AppliedModifier,
    reason_codes: &ReasonCodeCatalog,
    retained: &RetainedReasonCodes,
) -> Result<(), BillingError> {
    if !applied.is_active {
        return Ok(());
    }

    let code = applied
        .modifier
        .reason_code
        .as_deref()
        .ok_or(BillingError::MissingReasonCode { side: applied.side })?;

    reason_codes.check(applied.side, code, retained.for_side(applied.side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebill_common::{
        ModifierReasonCode, ProjectPricingOverride, RateCardEntry, RateSource,
    };
    use rust_decimal_macros::dec;

    fn reason_codes() -> ReasonCodeCatalog {
        ReasonCodeCatalog::new([
            ModifierReasonCode::new("RUSH", "Rush delivery"),
            ModifierReasonCode::new("DISCOUNT", "Goodwill discount"),
        ])
    }

    fn entry(item: Uuid) -> RateCardEntry {
        RateCardEntry::new(Uuid::new_v4(), item, dec!(50), dec!(100))
    }

    #[test]
    fn test_minimum_rule_scenario() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(1),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_rule(AppliedRuleSnapshot::minimum(dec!(2), None));

        let result = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(result.effective_quantity, dec!(2));
        assert_eq!(result.totals.line_cost_total, dec!(100));
        assert_eq!(result.totals.line_client_total_pre_tax, dec!(200));
        assert_eq!(result.totals.tax_amount, dec!(40));
        assert_eq!(result.totals.line_client_total_inc_tax, dec!(240));
        assert_eq!(result.totals.line_margin, dec!(100));
        assert_eq!(result.rates.rate_source, RateSource::RateCard);
    }

    #[test]
    fn test_active_modifier_requires_reason() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(2),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_client_modifier(LineModifier::percentage(dec!(1.2)));

        assert_eq!(
            compute_billing_line(&input, &reason_codes()),
            Err(BillingError::MissingReasonCode {
                side: ModifierSide::Client
            })
        );

        let blank = input
            .clone()
            .with_client_modifier(LineModifier::percentage(dec!(1.2)).with_reason("  "));
        assert!(matches!(
            compute_billing_line(&blank, &reason_codes()),
            Err(BillingError::MissingReasonCode { .. })
        ));
    }

    #[test]
    fn test_inactive_modifier_needs_no_reason() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(2),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_cost_modifier(LineModifier::fixed(dec!(50)));

        let result = compute_billing_line(&input, &ReasonCodeCatalog::default()).unwrap();
        assert!(!result.cost.is_active);
        assert_eq!(result.final_cost_rate(), dec!(50));
    }

    #[test]
    fn test_fixed_cost_modifier_replaces_rate() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(2),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_cost_modifier(LineModifier::fixed(dec!(35)).with_reason("DISCOUNT"));

        let result = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(result.final_cost_rate(), dec!(35));
        assert_eq!(result.totals.line_cost_total, dec!(70));
        assert_eq!(result.totals.line_margin, dec!(130));
    }

    #[test]
    fn test_modifier_applies_to_override_not_base() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let ov = ProjectPricingOverride::new(Uuid::new_v4(), item, "negotiated")
            .with_client_rate(dec!(120));
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: Some(&ov),
            },
            dec!(1),
            TaxSettings::exclusive(Decimal::ZERO),
        )
        .with_client_modifier(LineModifier::percentage(dec!(1.5)).with_reason("RUSH"));

        let result = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(result.final_client_rate(), dec!(180));
        assert_eq!(result.rates.rate_source, RateSource::ProjectOverride);
    }

    #[test]
    fn test_out_of_range_rejected_before_totals() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(1),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_cost_modifier(LineModifier::percentage(dec!(1.6)).with_reason("RUSH"));

        assert!(matches!(
            compute_billing_line(&input, &reason_codes()),
            Err(BillingError::ModifierOutOfRange {
                side: ModifierSide::Cost,
                ..
            })
        ));
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(-1),
            TaxSettings::exclusive(dec!(0.20)),
        );
        assert!(matches!(
            compute_billing_line(&input, &reason_codes()),
            Err(BillingError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(3),
            TaxSettings::inclusive(dec!(0.07)),
        );
        let a = compute_billing_line(&input, &reason_codes()).unwrap();
        let b = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let other = BillingLineInput {
            quantity_input: dec!(4),
            ..input
        };
        let c = compute_billing_line(&other, &reason_codes()).unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_zero_client_rate_margin() {
        let input = BillingLineInput::new(
            Uuid::new_v4(),
            RateBasis::Direct {
                cost_rate: dec!(10),
                client_rate: Decimal::ZERO,
            },
            dec!(1),
            TaxSettings::exclusive(dec!(0.20)),
        );
        let result = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(result.margin_percentage(), Decimal::ZERO);
        assert_eq!(result.totals.line_margin, dec!(-10));
    }

    #[test]
    fn test_huge_rate_times_quantity_is_an_error() {
        let item = Uuid::new_v4();
        let huge = Decimal::from_i128_with_scale(10i128.pow(15), 0);
        let entry = RateCardEntry::new(Uuid::new_v4(), item, huge, huge);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            huge,
            TaxSettings::exclusive(dec!(0.2)),
        );

        assert!(matches!(
            compute_billing_line(&input, &reason_codes()),
            Err(BillingError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_modifier_on_max_rate_is_an_error() {
        let input = BillingLineInput::new(
            Uuid::new_v4(),
            RateBasis::Direct {
                cost_rate: dec!(10),
                client_rate: Decimal::MAX,
            },
            dec!(1),
            TaxSettings::exclusive(dec!(0.2)),
        )
        .with_client_modifier(LineModifier::percentage(dec!(1.5)).with_reason("RUSH"));

        assert_eq!(
            compute_billing_line(&input, &reason_codes()),
            Err(BillingError::AmountOverflow("final rate"))
        );
    }

    #[test]
    fn test_reason_code_stored_trimmed() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(2),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_client_modifier(LineModifier::percentage(dec!(1.2)).with_reason(" RUSH "));

        let result = compute_billing_line(&input, &reason_codes()).unwrap();
        assert_eq!(result.client.modifier.reason_code.as_deref(), Some("RUSH"));
    }

    #[test]
    fn test_retained_code_only_covers_its_own_side() {
        let item = Uuid::new_v4();
        let entry = entry(item);
        let catalog =
            ReasonCodeCatalog::new([ModifierReasonCode::new("RUSH", "Rush delivery").inactive()]);
        let retained = RetainedReasonCodes::new(
            &LineModifier::percentage(dec!(1.2)).with_reason("RUSH"),
            &LineModifier::identity(),
        );
        let input = BillingLineInput::new(
            item,
            RateBasis::Catalog {
                entry: Some(&entry),
                override_rates: None,
            },
            dec!(2),
            TaxSettings::exclusive(dec!(0.20)),
        )
        .with_client_modifier(LineModifier::percentage(dec!(1.2)).with_reason("RUSH"))
        .with_retained_reason_codes(retained);
        assert!(compute_billing_line(&input, &catalog).is_ok());

        let moved = input
            .clone()
            .with_cost_modifier(LineModifier::percentage(dec!(1.3)).with_reason("RUSH"));
        assert_eq!(
            compute_billing_line(&moved, &catalog),
            Err(BillingError::UnknownReasonCode {
                side: ModifierSide::Cost,
                code: "RUSH".to_string()
            })
        );
    }
}
