//! Rate catalog access
//!
//! The engine reads catalog data (rate cards, entries, overrides, reason
//! codes) through [`RateCatalogReader`]. Catalog management owns the data;
//! from the engine's side it is read-only.

pub mod memory;
pub mod reason_codes;

pub use memory::InMemoryRateCatalog;
pub use reason_codes::{ReasonCodeCatalog, RetainedReasonCodes};

use framebill_common::{
    CatalogError, ProjectPricingOverride, ProjectPricingSettings, RateCard, RateCardEntry,
    RateItem,
};
use uuid::Uuid;

/// Read-only view of the rate catalog
pub trait RateCatalogReader: Send + Sync {
    /// Pricing settings for a project
    fn project_settings(&self, project_id: Uuid) -> Result<ProjectPricingSettings, CatalogError>;

    /// Rate card by id
    fn rate_card(&self, rate_card_id: Uuid) -> Result<RateCard, CatalogError>;

    /// Entry for one item on one card
    fn entry(&self, rate_card_id: Uuid, rate_item_id: Uuid) -> Option<RateCardEntry>;

    /// Project override for one item
    fn override_for(&self, project_id: Uuid, rate_item_id: Uuid) -> Option<ProjectPricingOverride>;

    /// Rate item by id, including archived items
    fn rate_item(&self, rate_item_id: Uuid) -> Result<RateItem, CatalogError>;

    /// All known reason codes, active or not
    fn reason_codes(&self) -> ReasonCodeCatalog;
}
