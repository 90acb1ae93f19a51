//! Billing service
//!
//! Thin adapters around [`BillingLineAssembler`] for the two places lines
//! are priced:
//!
//! - the manual-add form, which prices a brand-new line from the catalog
//! - the line editor, which re-prices an existing draft from the inputs
//!   frozen on the line
//!
//! Preview and commit share one code path per call site, so a preview never
//! disagrees with what gets saved.

use std::sync::Arc;

use chrono::Utc;
use framebill_common::{
    BillingError, BillingLineInstance, CatalogError, LineModifier, ModifierSource,
    ProjectPricingSettings, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::lifecycle::{self, FrozenRates, LineContext};
use super::store::LineStore;
use crate::catalog::RateCatalogReader;
use crate::config::EngineConfig;
use crate::pricing::quantity::snapshot_from_json;
use crate::pricing::{
    BillingLineAssembler, BillingLineComputation, BillingLineInput, RateBasis, TaxSettings,
};

/// New line priced from the project's rate card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualLineRequest {
    pub project_id: Uuid,
    pub rate_item_id: Uuid,
    pub quantity_input: Decimal,
    #[serde(default)]
    pub client_modifier: LineModifier,
    #[serde(default)]
    pub cost_modifier: LineModifier,
}

impl ManualLineRequest {
    pub fn new(project_id: Uuid, rate_item_id: Uuid, quantity_input: Decimal) -> Self {
        Self {
            project_id,
            rate_item_id,
            quantity_input,
            client_modifier: LineModifier::identity(),
            cost_modifier: LineModifier::identity(),
        }
    }

    pub fn with_client_modifier(mut self, modifier: LineModifier) -> Self {
        self.client_modifier = modifier;
        self
    }

    pub fn with_cost_modifier(mut self, modifier: LineModifier) -> Self {
        self.cost_modifier = modifier;
        self
    }
}

/// New line with hand-entered rates and no rate card entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectLineRequest {
    pub project_id: Uuid,
    pub rate_item_id: Uuid,
    pub cost_rate: Decimal,
    pub client_rate: Decimal,
    pub quantity_input: Decimal,
}

/// Edited quantity and modifiers for an existing line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineEdit {
    pub quantity_input: Decimal,
    pub client_modifier: LineModifier,
    pub cost_modifier: LineModifier,
}

impl LineEdit {
    /// Edit that starts from the line's current values
    pub fn from_line(line: &BillingLineInstance) -> Self {
        Self {
            quantity_input: line.quantity_input,
            client_modifier: line.client_modifier.clone(),
            cost_modifier: line.cost_modifier.clone(),
        }
    }
}

/// Billing line operations over an injected catalog and store
pub struct BillingService<C, S> {
    catalog: Arc<C>,
    store: Arc<S>,
    assembler: BillingLineAssembler,
}

impl<C, S> BillingService<C, S>
where
    C: RateCatalogReader,
    S: LineStore,
{
    pub fn new(catalog: Arc<C>, store: Arc<S>, config: &EngineConfig) -> Self {
        Self {
            catalog,
            store,
            assembler: BillingLineAssembler::new(config),
        }
    }

    /// Live preview for the manual-add form
    pub fn preview_manual_line(
        &self,
        request: &ManualLineRequest,
    ) -> Result<BillingLineComputation> {
        self.price_manual_line(request).map(|(computation, _)| computation)
    }

    /// Price a new line from the catalog and save it as a draft
    #[instrument(
        skip(self, request),
        fields(project_id = %request.project_id, rate_item_id = %request.rate_item_id)
    )]
    pub async fn create_manual_line(
        &self,
        request: &ManualLineRequest,
        actor: &str,
    ) -> Result<BillingLineInstance> {
        let (computation, settings) = self.price_manual_line(request)?;

        let context = LineContext {
            line_id: Uuid::new_v4(),
            project_id: request.project_id,
            rate_card_id: settings.rate_card_id,
            currency: settings.currency,
        };
        let line = lifecycle::materialize(&computation, &context, actor, Utc::now());
        let line = self.store.insert(line).await?;

        info!(line_id = %line.id, rate_source = %line.rate_source, "Created billing line");
        Ok(line)
    }

    /// Add a line with hand-entered rates, bypassing the rate card
    #[instrument(
        skip(self, request),
        fields(project_id = %request.project_id, rate_item_id = %request.rate_item_id)
    )]
    pub async fn add_direct_line(
        &self,
        request: &DirectLineRequest,
        actor: &str,
    ) -> Result<BillingLineInstance> {
        let settings = self.catalog.project_settings(request.project_id)?;
        let item = self.catalog.rate_item(request.rate_item_id)?;
        if !item.accepts_new_lines() {
            return Err(CatalogError::RateItemArchived(item.id).into());
        }

        let input = BillingLineInput::new(
            item.id,
            RateBasis::Direct {
                cost_rate: request.cost_rate,
                client_rate: request.client_rate,
            },
            request.quantity_input,
            TaxSettings::from(&settings),
        );
        let computation = self.assembler.compute(&input, &self.catalog.reason_codes())?;

        let context = LineContext {
            line_id: Uuid::new_v4(),
            project_id: request.project_id,
            rate_card_id: None,
            currency: settings.currency,
        };
        let line = lifecycle::materialize(&computation, &context, actor, Utc::now());
        let line = self.store.insert(line).await?;

        info!(line_id = %line.id, "Added direct billing line");
        Ok(line)
    }

    /// Re-price a draft line with edited inputs without saving
    pub async fn preview_edit(
        &self,
        line_id: Uuid,
        edit: &LineEdit,
    ) -> Result<BillingLineComputation> {
        let line = self.store.get(line_id).await?;
        lifecycle::ensure_editable(&line)?;
        self.price_edit(&line, edit)
    }

    /// Re-price a draft line with edited inputs and save it
    #[instrument(skip(self, edit))]
    pub async fn commit_edit(
        &self,
        line_id: Uuid,
        edit: &LineEdit,
        expected_version: u64,
        actor: &str,
    ) -> Result<BillingLineInstance> {
        let mut line = self.store.get(line_id).await?;
        lifecycle::ensure_editable(&line)?;

        let computation = self.price_edit(&line, edit)?;
        lifecycle::apply_computation(&mut line, &computation, actor, Utc::now())?;
        self.store.update(line, expected_version).await
    }

    /// Confirm a draft line
    #[instrument(skip(self))]
    pub async fn confirm(
        &self,
        line_id: Uuid,
        expected_version: u64,
        actor: &str,
    ) -> Result<BillingLineInstance> {
        let mut line = self.store.get(line_id).await?;
        lifecycle::confirm(&mut line, actor, Utc::now())?;
        self.store.update(line, expected_version).await
    }

    /// Void a draft or confirmed line
    #[instrument(skip(self))]
    pub async fn void(
        &self,
        line_id: Uuid,
        reason: &str,
        expected_version: u64,
        actor: &str,
    ) -> Result<BillingLineInstance> {
        let mut line = self.store.get(line_id).await?;
        lifecycle::void(&mut line, reason, actor, Utc::now())?;
        self.store.update(line, expected_version).await
    }

    /// Recompute a draft line from its own stored inputs.
    ///
    /// The result matches the stored totals and fingerprint unless the line
    /// was tampered with.
    pub async fn recompute(&self, line_id: Uuid) -> Result<BillingLineComputation> {
        let line = self.store.get(line_id).await?;
        lifecycle::ensure_editable(&line)?;

        let frozen = FrozenRates::from_line(&line);
        let input = BillingLineInput::new(
            line.rate_item_id,
            frozen.basis(),
            line.quantity_input,
            TaxSettings::from_breakdown(&line.totals),
        )
        .with_rule(line.applied_rule.clone())
        .with_client_modifier(line.client_modifier.clone())
        .with_cost_modifier(line.cost_modifier.clone())
        .with_retained_reason_codes(lifecycle::retained_reason_codes(&line));

        let computation = self.assembler.compute(&input, &self.catalog.reason_codes())?;
        if computation.fingerprint() != line.fingerprint {
            warn!(line_id = %line.id, "Recomputed billing line differs from stored figures");
        }
        Ok(computation)
    }

    /// All lines for a project
    pub async fn lines_for_project(&self, project_id: Uuid) -> Vec<BillingLineInstance> {
        self.store.list_for_project(project_id).await
    }

    fn price_manual_line(
        &self,
        request: &ManualLineRequest,
    ) -> Result<(BillingLineComputation, ProjectPricingSettings)> {
        let settings = self.catalog.project_settings(request.project_id)?;
        let rate_card_id = settings
            .rate_card_id
            .ok_or(BillingError::NoActiveRateCard {
                project_id: request.project_id,
            })?;
        let card = self.catalog.rate_card(rate_card_id)?;
        if card.currency != settings.currency {
            warn!(
                card_currency = %card.currency,
                project_currency = %settings.currency,
                "Rate card currency differs from project currency"
            );
        }

        let item = self.catalog.rate_item(request.rate_item_id)?;
        if !item.accepts_new_lines() {
            return Err(CatalogError::RateItemArchived(item.id).into());
        }

        let entry = self.catalog.entry(card.id, item.id);
        let override_rates = self.catalog.override_for(request.project_id, item.id);
        let rule = snapshot_from_json(entry.as_ref().and_then(|e| e.rule_snapshot_json.as_deref()));

        let input = BillingLineInput::new(
            item.id,
            RateBasis::Catalog {
                entry: entry.as_ref(),
                override_rates: override_rates.as_ref(),
            },
            request.quantity_input,
            TaxSettings::from(&settings),
        )
        .with_rule(rule)
        .with_client_modifier(tag_source(&request.client_modifier, None, ModifierSource::ManualAdd))
        .with_cost_modifier(tag_source(&request.cost_modifier, None, ModifierSource::ManualAdd));

        let computation = self.assembler.compute(&input, &self.catalog.reason_codes())?;
        Ok((computation, settings))
    }

    fn price_edit(
        &self,
        line: &BillingLineInstance,
        edit: &LineEdit,
    ) -> Result<BillingLineComputation> {
        let frozen = FrozenRates::from_line(line);
        let input = BillingLineInput::new(
            line.rate_item_id,
            frozen.basis(),
            edit.quantity_input,
            TaxSettings::from_breakdown(&line.totals),
        )
        .with_rule(line.applied_rule.clone())
        .with_client_modifier(tag_source(
            &edit.client_modifier,
            Some(&line.client_modifier),
            ModifierSource::LineEdit,
        ))
        .with_cost_modifier(tag_source(
            &edit.cost_modifier,
            Some(&line.cost_modifier),
            ModifierSource::LineEdit,
        ))
        .with_retained_reason_codes(lifecycle::retained_reason_codes(line));

        Ok(self.assembler.compute(&input, &self.catalog.reason_codes())?)
    }
}

/// Record where a modifier was entered.
///
/// Identity modifiers stay `Default`; a modifier equal to `previous` keeps
/// its original source.
fn tag_source(
    modifier: &LineModifier,
    previous: Option<&LineModifier>,
    source: ModifierSource,
) -> LineModifier {
    let untagged = |m: &LineModifier| LineModifier {
        source: ModifierSource::Default,
        ..m.normalized()
    };

    if let Some(prev) = previous {
        if untagged(prev) == untagged(modifier) {
            return prev.clone();
        }
    }

    if untagged(modifier) == LineModifier::identity() {
        return LineModifier::identity();
    }

    LineModifier {
        source,
        ..modifier.normalized()
    }
}
