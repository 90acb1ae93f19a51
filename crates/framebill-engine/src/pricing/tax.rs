//! Tax and margin calculation
//!
//! ```text
//! cost     = round(final_cost_rate * q)
//! exclusive: pre_tax = round(final_client_rate * q)
//!            tax     = round(pre_tax * t)
//!            inc_tax = pre_tax + tax
//! inclusive: inc_tax = round(final_client_rate * q)
//!            pre_tax = round(inc_tax / (1 + t))
//!            tax     = inc_tax - pre_tax
//! margin   = pre_tax - cost
//! ```
//!
//! Each total is rounded once, so the components always reconcile exactly.

use framebill_common::money::round_currency;
use framebill_common::{
    BillingError, ProjectPricingSettings, TaxBreakdown, TaxTreatment, DEFAULT_CURRENCY_SCALE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tax treatment and rate applied to a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    pub treatment: TaxTreatment,
    pub rate: Decimal,
}

impl TaxSettings {
    pub fn new(treatment: TaxTreatment, rate: Decimal) -> Self {
        Self { treatment, rate }
    }

    pub fn exclusive(rate: Decimal) -> Self {
        Self::new(TaxTreatment::Exclusive, rate)
    }

    pub fn inclusive(rate: Decimal) -> Self {
        Self::new(TaxTreatment::Inclusive, rate)
    }

    /// Tax settings frozen on an existing breakdown
    pub fn from_breakdown(totals: &TaxBreakdown) -> Self {
        Self::new(totals.tax_treatment, totals.tax_rate)
    }
}

impl From<&ProjectPricingSettings> for TaxSettings {
    fn from(settings: &ProjectPricingSettings) -> Self {
        Self::new(settings.tax_treatment, settings.tax_rate)
    }
}

/// Computes line totals at a fixed currency scale
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator {
    scale: u32,
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SCALE)
    }
}

impl TaxCalculator {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Compute the full breakdown for one line
    pub fn compute(
        &self,
        quantity: Decimal,
        final_client_rate: Decimal,
        final_cost_rate: Decimal,
        tax: &TaxSettings,
    ) -> Result<TaxBreakdown, BillingError> {
        if tax.rate < Decimal::ZERO {
            return Err(BillingError::InvalidTaxRate { tax_rate: tax.rate });
        }

        let line_cost_total = self.line_total(final_cost_rate, quantity, "cost total")?;
        let client_gross = self.line_total(final_client_rate, quantity, "client total")?;

        let (pre_tax, tax_amount, inc_tax) = match tax.treatment {
            TaxTreatment::Exclusive => {
                let tax_amount = client_gross
                    .checked_mul(tax.rate)
                    .map(|t| round_currency(t, self.scale))
                    .ok_or(BillingError::AmountOverflow("tax amount"))?;
                let inc_tax = client_gross
                    .checked_add(tax_amount)
                    .ok_or(BillingError::AmountOverflow("client total including tax"))?;
                (client_gross, tax_amount, inc_tax)
            }
            TaxTreatment::Inclusive => {
                let pre_tax = Decimal::ONE
                    .checked_add(tax.rate)
                    .and_then(|divisor| client_gross.checked_div(divisor))
                    .map(|p| round_currency(p, self.scale))
                    .ok_or(BillingError::AmountOverflow("pre-tax client total"))?;
                (pre_tax, client_gross - pre_tax, client_gross)
            }
        };
        let line_margin = pre_tax
            .checked_sub(line_cost_total)
            .ok_or(BillingError::AmountOverflow("margin"))?;

        Ok(TaxBreakdown {
            tax_treatment: tax.treatment,
            tax_rate: tax.rate,
            line_cost_total,
            line_client_total_pre_tax: pre_tax,
            tax_amount,
            line_client_total_inc_tax: inc_tax,
            line_margin,
        })
    }

    /// `round(rate * quantity)` at the currency scale
    fn line_total(
        &self,
        rate: Decimal,
        quantity: Decimal,
        what: &'static str,
    ) -> Result<Decimal, BillingError> {
        let total = rate
            .checked_mul(quantity)
            .ok_or(BillingError::AmountOverflow(what))?;
        Ok(round_currency(total, self.scale))
    }
}
