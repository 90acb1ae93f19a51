//! Project pricing settings and overrides

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether quoted client rates already include tax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxTreatment {
    /// Client rate excludes tax; tax is added on top
    #[default]
    Exclusive,
    /// Client rate includes tax; tax is carved out
    Inclusive,
}

impl std::fmt::Display for TaxTreatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxTreatment::Exclusive => write!(f, "exclusive"),
            TaxTreatment::Inclusive => write!(f, "inclusive"),
        }
    }
}

/// Pricing configuration for a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPricingSettings {
    pub project_id: Uuid,
    pub currency: String,
    pub tax_treatment: TaxTreatment,
    /// Decimal rate, e.g. `0.20` for 20%
    pub tax_rate: Decimal,
    /// Assigned rate card; `None` means the project cannot bill catalog items
    pub rate_card_id: Option<Uuid>,
}

impl ProjectPricingSettings {
    pub fn new(project_id: Uuid, currency: impl Into<String>, tax_rate: Decimal) -> Self {
        Self {
            project_id,
            currency: currency.into(),
            tax_treatment: TaxTreatment::default(),
            tax_rate,
            rate_card_id: None,
        }
    }

    pub fn with_rate_card(mut self, rate_card_id: Uuid) -> Self {
        self.rate_card_id = Some(rate_card_id);
        self
    }

    pub fn with_tax_treatment(mut self, treatment: TaxTreatment) -> Self {
        self.tax_treatment = treatment;
        self
    }
}

/// Per-project replacement of one or both base rates.
///
/// An absent rate inherits the rate card base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPricingOverride {
    pub project_id: Uuid,
    pub rate_item_id: Uuid,
    pub cost_rate: Option<Decimal>,
    pub client_rate: Option<Decimal>,
    pub reason: String,
}

impl ProjectPricingOverride {
    pub fn new(project_id: Uuid, rate_item_id: Uuid, reason: impl Into<String>) -> Self {
        Self {
            project_id,
            rate_item_id,
            cost_rate: None,
            client_rate: None,
            reason: reason.into(),
        }
    }

    pub fn with_cost_rate(mut self, rate: Decimal) -> Self {
        self.cost_rate = Some(rate);
        self
    }

    pub fn with_client_rate(mut self, rate: Decimal) -> Self {
        self.client_rate = Some(rate);
        self
    }

    /// Whether at least one rate is replaced
    pub fn overrides_any(&self) -> bool {
        self.cost_rate.is_some() || self.client_rate.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_override_presence() {
        let empty = ProjectPricingOverride::new(Uuid::new_v4(), Uuid::new_v4(), "none");
        assert!(!empty.overrides_any());

        let client = empty.clone().with_client_rate(dec!(120));
        assert!(client.overrides_any());
        assert_eq!(client.cost_rate, None);
    }

    #[test]
    fn test_settings_defaults_to_exclusive() {
        let settings = ProjectPricingSettings::new(Uuid::new_v4(), "GBP", dec!(0.20));
        assert_eq!(settings.tax_treatment, TaxTreatment::Exclusive);
        assert!(settings.rate_card_id.is_none());
    }
}
