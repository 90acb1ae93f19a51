//! Engine configuration

use anyhow::{bail, Result};
use framebill_common::{ModifierSide, DEFAULT_CURRENCY_SCALE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Largest currency scale the engine accepts
const MAX_CURRENCY_SCALE: u32 = 10;

/// Inclusive bounds for percentage modifiers, per side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModifierBounds {
    pub client_min: Decimal,
    pub client_max: Decimal,
    pub cost_min: Decimal,
    pub cost_max: Decimal,
}

impl Default for ModifierBounds {
    fn default() -> Self {
        Self {
            client_min: dec!(0.5),
            client_max: dec!(2.0),
            cost_min: dec!(0.8),
            cost_max: dec!(1.5),
        }
    }
}

impl ModifierBounds {
    /// `(min, max)` for one side
    pub fn range(&self, side: ModifierSide) -> (Decimal, Decimal) {
        match side {
            ModifierSide::Client => (self.client_min, self.client_max),
            ModifierSide::Cost => (self.cost_min, self.cost_max),
        }
    }
}

/// Billing engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Percentage modifier bounds
    pub modifier_bounds: ModifierBounds,
    /// Decimal places kept on persisted totals
    pub currency_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            modifier_bounds: ModifierBounds::default(),
            currency_scale: DEFAULT_CURRENCY_SCALE,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `.env` and `FRAMEBILL_` environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();
        cfg.apply_overrides(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from a key lookup; unparseable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let decimal = |key: &str| lookup(key).and_then(|v| v.trim().parse::<Decimal>().ok());

        if let Some(v) = decimal("FRAMEBILL_CLIENT_MODIFIER_MIN") {
            self.modifier_bounds.client_min = v;
        }
        if let Some(v) = decimal("FRAMEBILL_CLIENT_MODIFIER_MAX") {
            self.modifier_bounds.client_max = v;
        }
        if let Some(v) = decimal("FRAMEBILL_COST_MODIFIER_MIN") {
            self.modifier_bounds.cost_min = v;
        }
        if let Some(v) = decimal("FRAMEBILL_COST_MODIFIER_MAX") {
            self.modifier_bounds.cost_max = v;
        }

        if let Some(scale) = lookup("FRAMEBILL_CURRENCY_SCALE") {
            if let Ok(s) = scale.trim().parse::<u32>() {
                self.currency_scale = s;
            }
        }
    }

    /// Reject inverted or negative bounds and oversized scales
    pub fn validate(&self) -> Result<()> {
        for side in [ModifierSide::Client, ModifierSide::Cost] {
            let (min, max) = self.modifier_bounds.range(side);
            if min < Decimal::ZERO {
                bail!("{} modifier minimum must not be negative: {}", side, min);
            }
            if min > max {
                bail!("{} modifier bounds inverted: {} > {}", side, min, max);
            }
        }

        if self.currency_scale > MAX_CURRENCY_SCALE {
            bail!(
                "currency scale {} exceeds maximum {}",
                self.currency_scale,
                MAX_CURRENCY_SCALE
            );
        }

        Ok(())
    }
}
