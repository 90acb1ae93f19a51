//! Rate items - catalog-defined billable units
//!
//! A rate item is never deleted once a billing line references it. Retiring
//! an item moves it to `Deprecated` and then `Archived`; historical lines
//! keep resolving it by id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unit a rate item is billed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Hour,
    Image,
    Video,
    Day,
    Package,
    Minute,
}

impl UnitType {
    /// Short display label
    pub fn label(&self) -> &'static str {
        match self {
            UnitType::Hour => "hour",
            UnitType::Image => "image",
            UnitType::Video => "video",
            UnitType::Day => "day",
            UnitType::Package => "package",
            UnitType::Minute => "minute",
        }
    }
}

impl std::fmt::Display for UnitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a rate item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateItemStatus {
    #[default]
    Active,
    Deprecated,
    Archived,
}

/// Billable unit definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateItem {
    pub id: Uuid,
    pub name: String,
    pub unit_type: UnitType,
    pub status: RateItemStatus,
}

impl RateItem {
    /// Create a new active rate item
    pub fn new(name: impl Into<String>, unit_type: UnitType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            unit_type,
            status: RateItemStatus::Active,
        }
    }

    /// Set the lifecycle status
    pub fn with_status(mut self, status: RateItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether new billing lines may still be created against this item
    pub fn accepts_new_lines(&self) -> bool {
        self.status != RateItemStatus::Archived
    }
}
