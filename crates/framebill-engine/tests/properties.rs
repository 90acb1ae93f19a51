//! Property tests for the pricing pipeline

use framebill_common::{AppliedRuleSnapshot, LineModifier, ModifierReasonCode, RateCardEntry};
use framebill_engine::{
    compute_billing_line, BillingLineComputation, BillingLineInput, RateBasis, ReasonCodeCatalog,
    TaxSettings,
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity() -> impl Strategy<Value = Decimal> {
    (0i64..10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn tax_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=50).prop_map(|pct| Decimal::new(pct, 2))
}

fn client_factor() -> impl Strategy<Value = Decimal> {
    (50i64..=200).prop_map(|f| Decimal::new(f, 2))
}

fn reason_codes() -> ReasonCodeCatalog {
    ReasonCodeCatalog::new([ModifierReasonCode::new("RUSH", "Rush delivery")])
}

fn price(
    cost: Decimal,
    client: Decimal,
    qty: Decimal,
    minimum: Option<Decimal>,
    factor: Decimal,
    tax: TaxSettings,
) -> BillingLineComputation {
    let item = Uuid::nil();
    let entry = RateCardEntry::new(Uuid::nil(), item, cost, client);
    let rule = match minimum {
        Some(min) => AppliedRuleSnapshot::minimum(min, None),
        None => AppliedRuleSnapshot::none(),
    };
    let input = BillingLineInput::new(
        item,
        RateBasis::Catalog {
            entry: Some(&entry),
            override_rates: None,
        },
        qty,
        tax,
    )
    .with_rule(rule)
    .with_client_modifier(LineModifier::percentage(factor).with_reason("RUSH"));

    compute_billing_line(&input, &reason_codes()).unwrap()
}

proptest! {
    #[test]
    fn prop_totals_monotonic_in_quantity(
        cost in money(),
        client in money(),
        a in quantity(),
        b in quantity(),
        rate in tax_rate(),
    ) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let tax = TaxSettings::exclusive(rate);
        let small = price(cost, client, low, None, Decimal::ONE, tax);
        let large = price(cost, client, high, None, Decimal::ONE, tax);

        prop_assert!(
            small.totals.line_client_total_pre_tax <= large.totals.line_client_total_pre_tax
        );
        prop_assert!(small.totals.line_cost_total <= large.totals.line_cost_total);
    }

    #[test]
    fn prop_minimum_rule_never_lowers_quantity(
        qty in quantity(),
        minimum in quantity(),
    ) {
        let tax = TaxSettings::exclusive(dec!(0.20));
        let line = price(dec!(50), dec!(100), qty, Some(minimum), Decimal::ONE, tax);
        prop_assert!(line.effective_quantity >= qty);
        prop_assert!(line.effective_quantity >= minimum);
        prop_assert!(line.effective_quantity == qty || line.effective_quantity == minimum);
    }

    #[test]
    fn prop_identity_modifier_keeps_effective_rate(
        cost in money(),
        client in money(),
        qty in quantity(),
    ) {
        let line = price(cost, client, qty, None, Decimal::ONE, TaxSettings::exclusive(dec!(0.20)));
        prop_assert_eq!(line.final_client_rate(), client);
        prop_assert_eq!(line.final_cost_rate(), cost);
        prop_assert!(!line.client.is_active);
    }

    #[test]
    fn prop_margin_is_pre_tax_minus_cost(
        cost in money(),
        client in money(),
        qty in quantity(),
        factor in client_factor(),
        rate in tax_rate(),
        inclusive in any::<bool>(),
    ) {
        let tax = if inclusive {
            TaxSettings::inclusive(rate)
        } else {
            TaxSettings::exclusive(rate)
        };
        let line = price(cost, client, qty, None, factor, tax);
        let totals = &line.totals;

        prop_assert_eq!(
            totals.line_margin,
            totals.line_client_total_pre_tax - totals.line_cost_total
        );
        prop_assert_eq!(
            totals.line_client_total_pre_tax + totals.tax_amount,
            totals.line_client_total_inc_tax
        );
    }

    #[test]
    fn prop_inclusive_tax_inverts_within_a_cent(
        client in money(),
        qty in quantity(),
        rate in tax_rate(),
    ) {
        let line = price(dec!(1), client, qty, None, Decimal::ONE, TaxSettings::inclusive(rate));
        let totals = &line.totals;
        let rebuilt = totals.line_client_total_pre_tax * (Decimal::ONE + rate);

        prop_assert!((rebuilt - totals.line_client_total_inc_tax).abs() <= dec!(0.01));
    }

    #[test]
    fn prop_exclusive_then_inclusive_round_trips(
        client in money(),
        qty in quantity(),
        rate in tax_rate(),
    ) {
        let exclusive = price(
            dec!(1),
            client,
            qty,
            None,
            Decimal::ONE,
            TaxSettings::exclusive(rate),
        );
        let gross = exclusive.totals.line_client_total_inc_tax;

        // Bill the tax-inclusive amount as a single unit under inclusive treatment
        let inclusive = price(
            dec!(1),
            gross,
            Decimal::ONE,
            None,
            Decimal::ONE,
            TaxSettings::inclusive(rate),
        );

        let pre_tax_drift = (inclusive.totals.line_client_total_pre_tax
            - exclusive.totals.line_client_total_pre_tax)
            .abs();
        let tax_drift = (inclusive.totals.tax_amount - exclusive.totals.tax_amount).abs();
        prop_assert!(pre_tax_drift <= dec!(0.01));
        prop_assert!(tax_drift <= dec!(0.01));
        prop_assert_eq!(inclusive.totals.line_client_total_inc_tax, gross);
    }

    #[test]
    fn prop_computation_is_deterministic(
        cost in money(),
        client in money(),
        qty in quantity(),
        factor in client_factor(),
        rate in tax_rate(),
    ) {
        let tax = TaxSettings::exclusive(rate);
        let first = price(cost, client, qty, Some(dec!(2)), factor, tax);
        let second = price(cost, client, qty, Some(dec!(2)), factor, tax);

        prop_assert_eq!(first.fingerprint(), second.fingerprint());
        prop_assert_eq!(first, second);
    }
}
