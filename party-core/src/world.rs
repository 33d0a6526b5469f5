//! Party world types.
//!
//! Contains the types for representing party state: ids, classes,
//! alignment, ability scores, spells, and the characters themselves.

use crate::error::PartyError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ID Types
// ============================================================================

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Sequential identifier for characters in a party roster.
    CharacterId
);
record_id!(
    /// Sequential identifier for items. One id space covers every category.
    ItemId
);
record_id!(
    /// Sequential identifier for spells.
    SpellId
);

// ============================================================================
// Ability Scores
// ============================================================================

/// Lowest legal ability score.
pub const MIN_ABILITY_SCORE: u8 = 3;

/// Highest legal ability score.
pub const MAX_ABILITY_SCORE: u8 = 18;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Intelligence,
    Wisdom,
    Dexterity,
    Constitution,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "strength",
            Ability::Intelligence => "intelligence",
            Ability::Wisdom => "wisdom",
            Ability::Dexterity => "dexterity",
            Ability::Constitution => "constitution",
            Ability::Charisma => "charisma",
        }
    }

    /// All abilities in character-sheet order.
    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: u8,
    pub intelligence: u8,
    pub wisdom: u8,
    pub dexterity: u8,
    pub constitution: u8,
    pub charisma: u8,
}

impl AbilityScores {
    pub fn new(str: u8, int: u8, wis: u8, dex: u8, con: u8, cha: u8) -> Self {
        Self {
            strength: str,
            intelligence: int,
            wisdom: wis,
            dexterity: dex,
            constitution: con,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> u8 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: u8) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Charisma => self.charisma = value,
        }
    }
}

impl Default for AbilityScores {
    /// Fresh characters start at the minimum in every ability.
    fn default() -> Self {
        Self::new(
            MIN_ABILITY_SCORE,
            MIN_ABILITY_SCORE,
            MIN_ABILITY_SCORE,
            MIN_ABILITY_SCORE,
            MIN_ABILITY_SCORE,
            MIN_ABILITY_SCORE,
        )
    }
}

// ============================================================================
// Classes and Alignment
// ============================================================================

/// Character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Cleric,
    Fighter,
    MagicUser,
    Thief,
    Dwarf,
    Elf,
    Halfling,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::MagicUser => "Magic-User",
            CharacterClass::Thief => "Thief",
            CharacterClass::Dwarf => "Dwarf",
            CharacterClass::Elf => "Elf",
            CharacterClass::Halfling => "Halfling",
        }
    }

    /// Lowercase key used on the wire and in rule messages.
    pub fn key(&self) -> &'static str {
        match self {
            CharacterClass::Cleric => "cleric",
            CharacterClass::Fighter => "fighter",
            CharacterClass::MagicUser => "magicuser",
            CharacterClass::Thief => "thief",
            CharacterClass::Dwarf => "dwarf",
            CharacterClass::Elf => "elf",
            CharacterClass::Halfling => "halfling",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for CharacterClass {
    type Err = PartyError;

    /// Accepts the key or display name, ignoring case, spaces, and hyphens.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | ' ' | '_'))
            .collect::<String>()
            .to_lowercase();
        CharacterClass::all()
            .iter()
            .copied()
            .find(|class| class.key() == normalized)
            .ok_or_else(|| PartyError::validation(format!("invalid class: {s:?}")))
    }
}

/// Character alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Lawful,
    Neutral,
    Chaotic,
}

impl Alignment {
    pub fn name(&self) -> &'static str {
        match self {
            Alignment::Lawful => "lawful",
            Alignment::Neutral => "neutral",
            Alignment::Chaotic => "chaotic",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Alignment {
    type Err = PartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lawful" => Ok(Alignment::Lawful),
            "neutral" => Ok(Alignment::Neutral),
            "chaotic" => Ok(Alignment::Chaotic),
            _ => Err(PartyError::validation(format!("invalid alignment: {s:?}"))),
        }
    }
}

// ============================================================================
// Spells
// ============================================================================

/// Source of a character's spell power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastingSchool {
    Arcane,
    Divine,
}

impl CastingSchool {
    pub fn name(&self) -> &'static str {
        match self {
            CastingSchool::Arcane => "arcane",
            CastingSchool::Divine => "divine",
        }
    }
}

impl fmt::Display for CastingSchool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A spell definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: SpellId,
    pub name: String,
    pub level: u8,
    pub school: CastingSchool,
}

impl Spell {
    pub fn new(id: SpellId, name: impl Into<String>, level: u8, school: CastingSchool) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            school,
        }
    }
}

/// A prepared copy of a known spell. Casting consumes it until a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorizedSpell {
    pub spell_id: SpellId,
    pub cast: bool,
}

impl MemorizedSpell {
    pub fn new(spell_id: SpellId) -> Self {
        Self {
            spell_id,
            cast: false,
        }
    }
}

// ============================================================================
// Character
// ============================================================================

/// A member of the party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub class: Option<CharacterClass>,
    pub level: u8,
    pub alignment: Option<Alignment>,
    pub armor_bonus: i32,

    // Health
    pub rolled_hit_points: i32,
    pub current_hit_points: i32,

    pub ability_scores: AbilityScores,

    // Equipment
    pub inventory: Vec<ItemId>,
    pub armor: Option<ItemId>,
    pub shield: Option<ItemId>,

    // Spellcasting
    pub casting_schools: BTreeSet<CastingSchool>,
    pub known_spells: Vec<SpellId>,
    pub memorized_spells: Vec<MemorizedSpell>,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            class: None,
            level: 1,
            alignment: None,
            armor_bonus: 0,
            rolled_hit_points: 0,
            current_hit_points: 0,
            ability_scores: AbilityScores::default(),
            inventory: Vec::new(),
            armor: None,
            shield: None,
            casting_schools: BTreeSet::new(),
            known_spells: Vec::new(),
            memorized_spells: Vec::new(),
        }
    }

    /// Returns true if the item id is in this character's inventory list.
    pub fn holds(&self, item_id: ItemId) -> bool {
        self.inventory.contains(&item_id)
    }

    pub fn knows(&self, spell_id: SpellId) -> bool {
        self.known_spells.contains(&spell_id)
    }

    pub fn can_cast(&self, school: CastingSchool) -> bool {
        self.casting_schools.contains(&school)
    }

    /// Remove an item from the inventory list and clear any equip slot that
    /// references it. Returns true if the item was in the list.
    pub(crate) fn detach(&mut self, item_id: ItemId) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|id| *id != item_id);
        if self.armor == Some(item_id) {
            self.armor = None;
        }
        if self.shield == Some(item_id) {
            self.shield = None;
        }
        self.inventory.len() != before
    }
}
