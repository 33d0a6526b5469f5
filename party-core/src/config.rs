//! Per-session rule configuration.

use crate::class_data::{SpellSlotTable, STANDARD_SPELL_SLOTS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of items a character can carry.
pub const DEFAULT_INVENTORY_CAPACITY: usize = 10;

/// Errors from loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Inventory capacity must be at least 1")]
    ZeroCapacity,
}

/// Toggles for the limits applied when a character learns a spell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellRules {
    /// Cannot know more spells at a level than the slot table allows.
    pub enforce_known_limit: bool,
    /// Cannot learn spells above the highest castable level.
    pub enforce_level_limit: bool,
}

impl Default for SpellRules {
    fn default() -> Self {
        Self {
            enforce_known_limit: true,
            enforce_level_limit: true,
        }
    }
}

/// Configuration for a party session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyConfig {
    /// Maximum items per character inventory.
    pub inventory_capacity: usize,

    /// Limits applied when learning spells.
    pub spell_rules: SpellRules,

    /// Class/level/spell-level slot allowances.
    pub slot_table: SpellSlotTable,
}

impl PartyConfig {
    /// Create a config with the standard rules.
    pub fn new() -> Self {
        Self {
            inventory_capacity: DEFAULT_INVENTORY_CAPACITY,
            spell_rules: SpellRules::default(),
            slot_table: STANDARD_SPELL_SLOTS.clone(),
        }
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: PartyConfig = serde_json::from_str(json)?;
        if config.inventory_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(config)
    }

    /// Set the inventory capacity.
    pub fn with_inventory_capacity(mut self, capacity: usize) -> Self {
        self.inventory_capacity = capacity;
        self
    }

    /// Set the spell learning rules.
    pub fn with_spell_rules(mut self, rules: SpellRules) -> Self {
        self.spell_rules = rules;
        self
    }

    /// Replace the spell slot table.
    pub fn with_slot_table(mut self, table: SpellSlotTable) -> Self {
        self.slot_table = table;
        self
    }
}

impl Default for PartyConfig {
    fn default() -> Self {
        Self::new()
    }
}
