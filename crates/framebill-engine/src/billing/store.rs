//! Billing line storage
//!
//! Concurrent edits to one line are serialized with optimistic concurrency:
//! every update names the version it was based on and fails with
//! `VersionConflict` if someone else saved first.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use framebill_common::{BillingLineInstance, FramebillError, LifecycleError, Result};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Trait for billing line storage backends
#[async_trait]
pub trait LineStore: Send + Sync {
    /// Store a new line
    async fn insert(&self, line: BillingLineInstance) -> Result<BillingLineInstance>;

    /// Get a line by ID
    async fn get(&self, id: Uuid) -> Result<BillingLineInstance>;

    /// Replace a line if the stored version still equals `expected_version`.
    ///
    /// Returns the saved line with its version bumped.
    async fn update(
        &self,
        line: BillingLineInstance,
        expected_version: u64,
    ) -> Result<BillingLineInstance>;

    /// All lines for a project, oldest first
    async fn list_for_project(&self, project_id: Uuid) -> Vec<BillingLineInstance>;
}

/// In-memory storage implementation
#[derive(Default)]
pub struct InMemoryLineStore {
    lines: DashMap<Uuid, BillingLineInstance>,
}

impl InMemoryLineStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[async_trait]
impl LineStore for InMemoryLineStore {
    #[instrument(skip(self, line), fields(line_id = %line.id))]
    async fn insert(&self, line: BillingLineInstance) -> Result<BillingLineInstance> {
        match self.lines.entry(line.id) {
            Entry::Occupied(_) => Err(FramebillError::Storage(format!(
                "billing line {} already exists",
                line.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(line.clone());
                debug!("Stored billing line");
                Ok(line)
            }
        }
    }

    async fn get(&self, id: Uuid) -> Result<BillingLineInstance> {
        self.lines
            .get(&id)
            .map(|l| l.clone())
            .ok_or(FramebillError::LineNotFound(id))
    }

    #[instrument(skip(self, line), fields(line_id = %line.id))]
    async fn update(
        &self,
        mut line: BillingLineInstance,
        expected_version: u64,
    ) -> Result<BillingLineInstance> {
        let mut stored = self
            .lines
            .get_mut(&line.id)
            .ok_or(FramebillError::LineNotFound(line.id))?;

        if stored.version != expected_version {
            warn!(expected_version, found = stored.version, "Stale billing line update");
            return Err(LifecycleError::VersionConflict {
                expected: expected_version,
                found: stored.version,
            }
            .into());
        }

        line.version = expected_version + 1;
        *stored = line.clone();
        debug!(version = line.version, "Updated billing line");
        Ok(line)
    }

    async fn list_for_project(&self, project_id: Uuid) -> Vec<BillingLineInstance> {
        let mut lines: Vec<BillingLineInstance> = self
            .lines
            .iter()
            .filter(|l| l.project_id == project_id)
            .map(|l| l.clone())
            .collect();
        lines.sort_by_key(|l| l.created_at);
        lines
    }
}
