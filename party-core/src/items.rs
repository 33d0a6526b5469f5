//! Item records.
//!
//! Every item shares one id space. Category-specific data lives in the
//! [`ItemKind`] variant carried by each [`Item`], so a single id-keyed store
//! holds weapons, armor, shields, jewelry, charge items, and generic gear.

use crate::world::{CharacterId, ItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest magical bonus on weapons, armor, shields, and jewelry.
pub const MAX_ITEM_BONUS: u8 = 3;

/// Legal weapon damage range.
pub const MIN_WEAPON_DAMAGE: u8 = 1;
pub const MAX_WEAPON_DAMAGE: u8 = 10;

// ============================================================================
// Location
// ============================================================================

/// Where an item currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemLocation {
    /// Not placed anywhere yet.
    None,
    /// Carried by a specific character.
    Character(CharacterId),
    /// Carried by the party as a whole; an intra-party sorting space.
    PartyPool,
    /// Stored safely somewhere in the world.
    Storage,
    /// Lying around in the world, available to be picked up.
    Limbo,
}

impl ItemLocation {
    /// The holding character, if any.
    pub fn holder(&self) -> Option<CharacterId> {
        match self {
            ItemLocation::Character(id) => Some(*id),
            _ => None,
        }
    }

    /// True for party pool, storage, and limbo.
    pub fn is_bucket(&self) -> bool {
        matches!(
            self,
            ItemLocation::PartyPool | ItemLocation::Storage | ItemLocation::Limbo
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItemLocation::None => "none",
            ItemLocation::Character(_) => "character",
            ItemLocation::PartyPool => "party",
            ItemLocation::Storage => "storage",
            ItemLocation::Limbo => "limbo",
        }
    }
}

impl fmt::Display for ItemLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemLocation::Character(id) => write!(f, "character {}", id),
            other => write!(f, "{}", other.name()),
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Item category, without the category-specific data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemCategory {
    Generic,
    Weapon,
    Armor,
    Shield,
    Jewelry,
    ChargeItem,
}

impl ItemCategory {
    pub fn name(&self) -> &'static str {
        match self {
            ItemCategory::Generic => "generic",
            ItemCategory::Weapon => "weapon",
            ItemCategory::Armor => "armor",
            ItemCategory::Shield => "shield",
            ItemCategory::Jewelry => "jewelry",
            ItemCategory::ChargeItem => "charge-item",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Body armor types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorType {
    Robes,
    Leather,
    Chain,
    Plate,
}

impl ArmorType {
    pub fn name(&self) -> &'static str {
        match self {
            ArmorType::Robes => "robes",
            ArmorType::Leather => "leather",
            ArmorType::Chain => "chain",
            ArmorType::Plate => "plate",
        }
    }

    pub fn all() -> [ArmorType; 4] {
        [
            ArmorType::Robes,
            ArmorType::Leather,
            ArmorType::Chain,
            ArmorType::Plate,
        ]
    }
}

impl fmt::Display for ArmorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Category data
// ============================================================================

/// Weapon properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub damage: u8,
    /// 0 for mundane weapons, 1 to 3 for magical ones.
    pub bonus: u8,
    pub is_melee: bool,
    pub is_ranged: bool,
    pub is_two_handed: bool,
    pub is_blunt: bool,
}

impl WeaponStats {
    pub fn new(damage: u8) -> Self {
        Self {
            damage,
            bonus: 0,
            is_melee: false,
            is_ranged: false,
            is_two_handed: false,
            is_blunt: false,
        }
    }

    pub fn with_bonus(mut self, bonus: u8) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn melee(mut self) -> Self {
        self.is_melee = true;
        self
    }

    pub fn ranged(mut self) -> Self {
        self.is_ranged = true;
        self
    }

    pub fn two_handed(mut self) -> Self {
        self.is_two_handed = true;
        self
    }

    pub fn blunt(mut self) -> Self {
        self.is_blunt = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub armor_type: ArmorType,
    pub bonus: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldStats {
    pub bonus: u8,
}

/// Protective jewelry such as a ring of protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JewelryStats {
    pub armor_bonus: u8,
    pub save_bonus: u8,
}

/// Rods, wands, staves, and other items that spend charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeStats {
    pub charges: u32,
    pub arcane_allowed: bool,
    pub divine_allowed: bool,
    pub non_magic_allowed: bool,
}

impl ChargeStats {
    pub fn new(charges: u32) -> Self {
        Self {
            charges,
            arcane_allowed: false,
            divine_allowed: false,
            non_magic_allowed: false,
        }
    }

    pub fn arcane(mut self) -> Self {
        self.arcane_allowed = true;
        self
    }

    pub fn divine(mut self) -> Self {
        self.divine_allowed = true;
        self
    }

    pub fn non_magic(mut self) -> Self {
        self.non_magic_allowed = true;
        self
    }
}

/// Category-specific data for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum ItemKind {
    Generic,
    Weapon(WeaponStats),
    Armor(ArmorStats),
    Shield(ShieldStats),
    Jewelry(JewelryStats),
    ChargeItem(ChargeStats),
}

impl ItemKind {
    pub fn category(&self) -> ItemCategory {
        match self {
            ItemKind::Generic => ItemCategory::Generic,
            ItemKind::Weapon(_) => ItemCategory::Weapon,
            ItemKind::Armor(_) => ItemCategory::Armor,
            ItemKind::Shield(_) => ItemCategory::Shield,
            ItemKind::Jewelry(_) => ItemCategory::Jewelry,
            ItemKind::ChargeItem(_) => ItemCategory::ChargeItem,
        }
    }
}

// ============================================================================
// Item
// ============================================================================

/// An item in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Optional reference link, shown by the rendering layer.
    pub url: Option<String>,
    pub location: ItemLocation,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id,
            name: name.into(),
            url: None,
            location: ItemLocation::None,
            kind,
        }
    }

    pub fn category(&self) -> ItemCategory {
        self.kind.category()
    }

    /// The character holding this item, if any.
    pub fn holder(&self) -> Option<CharacterId> {
        self.location.holder()
    }

    pub fn as_armor(&self) -> Option<&ArmorStats> {
        match &self.kind {
            ItemKind::Armor(stats) => Some(stats),
            _ => None,
        }
    }

    pub fn as_weapon(&self) -> Option<&WeaponStats> {
        match &self.kind {
            ItemKind::Weapon(stats) => Some(stats),
            _ => None,
        }
    }
}
