//! In-memory rate catalog
//!
//! Backs [`RateCatalogReader`] with concurrent maps. Used by tests and by
//! callers that load the catalog up front.

use dashmap::DashMap;
use framebill_common::{
    CatalogError, ModifierReasonCode, ProjectPricingOverride, ProjectPricingSettings, RateCard,
    RateCardEntry, RateItem,
};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{RateCatalogReader, ReasonCodeCatalog};

/// In-memory catalog keyed the way the engine looks things up
#[derive(Default)]
pub struct InMemoryRateCatalog {
    items: DashMap<Uuid, RateItem>,
    cards: DashMap<Uuid, RateCard>,
    /// At most one entry per (card, item)
    entries: DashMap<(Uuid, Uuid), RateCardEntry>,
    /// At most one override per (project, item)
    overrides: DashMap<(Uuid, Uuid), ProjectPricingOverride>,
    projects: DashMap<Uuid, ProjectPricingSettings>,
    reason_codes: RwLock<ReasonCodeCatalog>,
}

impl InMemoryRateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_item(&self, item: RateItem) {
        self.items.insert(item.id, item);
    }

    pub fn insert_card(&self, card: RateCard) {
        self.cards.insert(card.id, card);
    }

    /// Insert an entry, replacing any existing entry for the same item on the card
    pub fn insert_entry(&self, entry: RateCardEntry) {
        let key = (entry.rate_card_id, entry.rate_item_id);
        if self.entries.insert(key, entry).is_some() {
            debug!(rate_card_id = %key.0, rate_item_id = %key.1, "Replaced rate card entry");
        }
    }

    /// Insert an override, replacing any existing override for the same item
    pub fn insert_override(&self, override_rates: ProjectPricingOverride) {
        let key = (override_rates.project_id, override_rates.rate_item_id);
        if self.overrides.insert(key, override_rates).is_some() {
            debug!(project_id = %key.0, rate_item_id = %key.1, "Replaced project override");
        }
    }

    pub fn remove_override(
        &self,
        project_id: Uuid,
        rate_item_id: Uuid,
    ) -> Option<ProjectPricingOverride> {
        self.overrides
            .remove(&(project_id, rate_item_id))
            .map(|(_, v)| v)
    }

    pub fn insert_project(&self, settings: ProjectPricingSettings) {
        self.projects.insert(settings.project_id, settings);
    }

    pub fn set_reason_codes(&self, codes: impl IntoIterator<Item = ModifierReasonCode>) {
        *self.reason_codes.write() = ReasonCodeCatalog::new(codes);
    }
}

impl RateCatalogReader for InMemoryRateCatalog {
    fn project_settings(&self, project_id: Uuid) -> Result<ProjectPricingSettings, CatalogError> {
        self.projects
            .get(&project_id)
            .map(|s| s.clone())
            .ok_or(CatalogError::ProjectNotFound(project_id))
    }

    fn rate_card(&self, rate_card_id: Uuid) -> Result<RateCard, CatalogError> {
        self.cards
            .get(&rate_card_id)
            .map(|c| c.clone())
            .ok_or(CatalogError::RateCardNotFound(rate_card_id))
    }

    fn entry(&self, rate_card_id: Uuid, rate_item_id: Uuid) -> Option<RateCardEntry> {
        self.entries
            .get(&(rate_card_id, rate_item_id))
            .map(|e| e.clone())
    }

    fn override_for(&self, project_id: Uuid, rate_item_id: Uuid) -> Option<ProjectPricingOverride> {
        self.overrides
            .get(&(project_id, rate_item_id))
            .map(|o| o.clone())
    }

    fn rate_item(&self, rate_item_id: Uuid) -> Result<RateItem, CatalogError> {
        self.items
            .get(&rate_item_id)
            .map(|i| i.clone())
            .ok_or(CatalogError::RateItemNotFound(rate_item_id))
    }

    fn reason_codes(&self) -> ReasonCodeCatalog {
        self.reason_codes.read().clone()
    }
}
