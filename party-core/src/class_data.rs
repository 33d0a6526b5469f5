//! Class rule data.
//!
//! Contains level caps, armor and shield restrictions, and the spell slot
//! table for all seven classes.

use crate::items::ArmorType;
use crate::world::CharacterClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

impl CharacterClass {
    /// Highest level a character of this class can reach.
    pub fn max_level(&self) -> u8 {
        match self {
            CharacterClass::Cleric
            | CharacterClass::Fighter
            | CharacterClass::MagicUser
            | CharacterClass::Thief => 14,
            CharacterClass::Dwarf => 12,
            CharacterClass::Elf => 10,
            CharacterClass::Halfling => 8,
        }
    }

    /// Armor types this class may wear, or `None` if it is unrestricted.
    pub fn allowed_armor(&self) -> Option<&'static [ArmorType]> {
        match self {
            CharacterClass::MagicUser => Some(&[ArmorType::Robes]),
            CharacterClass::Thief => Some(&[ArmorType::Robes, ArmorType::Leather]),
            _ => None,
        }
    }

    pub fn may_wear(&self, armor_type: ArmorType) -> bool {
        self.allowed_armor()
            .map_or(true, |allowed| allowed.contains(&armor_type))
    }

    /// Classes on the shield deny-list return false.
    pub fn may_use_shield(&self) -> bool {
        !matches!(self, CharacterClass::MagicUser | CharacterClass::Thief)
    }

    /// Get all classes.
    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Cleric,
            CharacterClass::Fighter,
            CharacterClass::MagicUser,
            CharacterClass::Thief,
            CharacterClass::Dwarf,
            CharacterClass::Elf,
            CharacterClass::Halfling,
        ]
    }
}

// ============================================================================
// Spell slots
// ============================================================================

/// Cleric slots by character level (row) and spell level (column, 1-based).
const CLERIC_SLOTS: [[u8; 5]; 14] = [
    [0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0],
    [2, 0, 0, 0, 0],
    [2, 1, 0, 0, 0],
    [2, 2, 0, 0, 0],
    [2, 2, 1, 1, 0],
    [2, 2, 2, 1, 1],
    [3, 3, 2, 2, 1],
    [3, 3, 3, 2, 2],
    [4, 4, 3, 3, 2],
    [4, 4, 4, 3, 3],
    [5, 5, 4, 4, 3],
    [5, 5, 5, 4, 4],
    [6, 5, 5, 5, 4],
];

/// Magic-user slots by character level (row) and spell level (column, 1-based).
const MAGIC_USER_SLOTS: [[u8; 6]; 14] = [
    [1, 0, 0, 0, 0, 0],
    [2, 0, 0, 0, 0, 0],
    [2, 1, 0, 0, 0, 0],
    [2, 2, 0, 0, 0, 0],
    [2, 2, 1, 0, 0, 0],
    [2, 2, 2, 0, 0, 0],
    [3, 2, 2, 1, 0, 0],
    [3, 3, 2, 2, 0, 0],
    [3, 3, 3, 2, 1, 0],
    [3, 3, 3, 3, 2, 0],
    [4, 3, 3, 3, 2, 1],
    [4, 4, 3, 3, 3, 2],
    [4, 4, 4, 3, 3, 3],
    [4, 4, 4, 4, 3, 3],
];

lazy_static::lazy_static! {
    /// The standard slot table shared by every default configuration.
    pub static ref STANDARD_SPELL_SLOTS: SpellSlotTable = SpellSlotTable::standard();
}

/// Spell slots keyed by class, then character level, then spell level.
///
/// The same allowance bounds both the known and the memorized pools. Any
/// missing entry means zero slots, so classes without rows can never learn
/// or memorize spells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpellSlotTable {
    rows: BTreeMap<CharacterClass, BTreeMap<u8, BTreeMap<u8, u8>>>,
}

impl SpellSlotTable {
    /// A table with no rows; every lookup yields zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Cleric and magic-user progressions for character levels 1 to 14.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for (index, row) in CLERIC_SLOTS.iter().enumerate() {
            table.set_row(CharacterClass::Cleric, index as u8 + 1, row);
        }
        for (index, row) in MAGIC_USER_SLOTS.iter().enumerate() {
            table.set_row(CharacterClass::MagicUser, index as u8 + 1, row);
        }
        table
    }

    /// Builder form of [`SpellSlotTable::set_row`].
    pub fn with_row(mut self, class: CharacterClass, level: u8, slots: &[u8]) -> Self {
        self.set_row(class, level, slots);
        self
    }

    /// Replace the row for a class at a character level. `slots[0]` is the
    /// count for spell level 1; zero counts are not stored.
    pub fn set_row(&mut self, class: CharacterClass, level: u8, slots: &[u8]) {
        let row: BTreeMap<u8, u8> = slots
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(index, count)| (index as u8 + 1, *count))
            .collect();
        self.rows.entry(class).or_default().insert(level, row);
    }

    /// Slot count for a spell level.
    pub fn slots(&self, class: CharacterClass, level: u8, spell_level: u8) -> u8 {
        self.row(class, level)
            .and_then(|row| row.get(&spell_level))
            .copied()
            .unwrap_or(0)
    }

    /// Highest spell level with a positive slot count, or 0 if none.
    pub fn max_spell_level(&self, class: CharacterClass, level: u8) -> u8 {
        self.row(class, level)
            .and_then(|row| {
                row.iter()
                    .filter(|(_, count)| **count > 0)
                    .map(|(spell_level, _)| *spell_level)
                    .max()
            })
            .unwrap_or(0)
    }

    /// The full spell-level -> count row, if one exists.
    pub fn row(&self, class: CharacterClass, level: u8) -> Option<&BTreeMap<u8, u8>> {
        self.rows.get(&class).and_then(|levels| levels.get(&level))
    }

    /// Returns true if the class has any row at all.
    pub fn has_class(&self, class: CharacterClass) -> bool {
        self.rows.contains_key(&class)
    }
}
