//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use framebill_common::{
    AppliedRuleSnapshot, ModifierReasonCode, ProjectPricingSettings, RateCard, RateCardEntry,
    RateItem, TaxTreatment, UnitType,
};
use framebill_engine::{BillingService, EngineConfig, InMemoryLineStore, InMemoryRateCatalog};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

static TRACING: Once = Once::new();

/// Route engine logs to the test writer; set `RUST_LOG` to see them
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A studio catalog with one project on a GBP rate card
pub struct StudioFixture {
    pub catalog: Arc<InMemoryRateCatalog>,
    pub store: Arc<InMemoryLineStore>,
    pub project_id: Uuid,
    pub card: RateCard,
    /// Photographer hour: cost 50, client 100, 2 hour minimum
    pub photographer_hour: RateItem,
    /// Retouched image: cost 8, client 15, no rule
    pub retouched_image: RateItem,
}

impl StudioFixture {
    pub fn new() -> Self {
        Self::with_tax(TaxTreatment::Exclusive, dec!(0.20))
    }

    pub fn with_tax(treatment: TaxTreatment, tax_rate: Decimal) -> Self {
        init_test_tracing();

        let catalog = Arc::new(InMemoryRateCatalog::new());
        let project_id = Uuid::new_v4();
        let card = RateCard::new("Standard 2024", "GBP");
        let photographer_hour = RateItem::new("Photographer Hour", UnitType::Hour);
        let retouched_image = RateItem::new("Retouched Image", UnitType::Image);

        catalog.insert_card(card.clone());
        catalog.insert_item(photographer_hour.clone());
        catalog.insert_item(retouched_image.clone());
        let two_hour_minimum = AppliedRuleSnapshot::minimum(dec!(2), Some("hour".into()));
        catalog.insert_entry(
            RateCardEntry::new(card.id, photographer_hour.id, dec!(50), dec!(100))
                .with_rule_json(two_hour_minimum.to_json()),
        );
        catalog.insert_entry(RateCardEntry::new(
            card.id,
            retouched_image.id,
            dec!(8),
            dec!(15),
        ));
        catalog.insert_project(
            ProjectPricingSettings::new(project_id, "GBP", tax_rate)
                .with_rate_card(card.id)
                .with_tax_treatment(treatment),
        );
        catalog.set_reason_codes([
            ModifierReasonCode::new("RUSH", "Rush delivery"),
            ModifierReasonCode::new("LOCATION", "Location surcharge"),
            ModifierReasonCode::new("GOODWILL", "Goodwill discount"),
            ModifierReasonCode::new("LEGACY", "Legacy adjustment").inactive(),
        ]);

        Self {
            catalog,
            store: Arc::new(InMemoryLineStore::new()),
            project_id,
            card,
            photographer_hour,
            retouched_image,
        }
    }

    pub fn service(&self) -> BillingService<InMemoryRateCatalog, InMemoryLineStore> {
        BillingService::new(
            Arc::clone(&self.catalog),
            Arc::clone(&self.store),
            &EngineConfig::default(),
        )
    }
}
