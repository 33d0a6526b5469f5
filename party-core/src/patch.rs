//! Sparse character updates.
//!
//! A [`CharacterPatch`] names only the fields to change. Inventory, equip
//! slots, and spellbooks are owned by their engines and cannot be patched.

use crate::error::{PartyError, PartyResult};
use crate::world::{
    Ability, Alignment, CastingSchool, Character, CharacterClass, MAX_ABILITY_SCORE,
    MIN_ABILITY_SCORE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest allowed character name, in bytes of UTF-8.
pub const MAX_NAME_LENGTH: usize = 50;

/// A partial update to a character. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterPatch {
    pub name: Option<String>,
    pub class: Option<CharacterClass>,
    pub level: Option<u8>,
    pub alignment: Option<Alignment>,
    pub armor_bonus: Option<i32>,
    pub rolled_hit_points: Option<i32>,
    pub current_hit_points: Option<i32>,
    pub strength: Option<u8>,
    pub intelligence: Option<u8>,
    pub wisdom: Option<u8>,
    pub dexterity: Option<u8>,
    pub constitution: Option<u8>,
    pub charisma: Option<u8>,
    pub casting_schools: Option<BTreeSet<CastingSchool>>,
}

impl CharacterPatch {
    /// An empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn class(mut self, class: CharacterClass) -> Self {
        self.class = Some(class);
        self
    }

    pub fn level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn armor_bonus(mut self, bonus: i32) -> Self {
        self.armor_bonus = Some(bonus);
        self
    }

    pub fn rolled_hit_points(mut self, hp: i32) -> Self {
        self.rolled_hit_points = Some(hp);
        self
    }

    pub fn current_hit_points(mut self, hp: i32) -> Self {
        self.current_hit_points = Some(hp);
        self
    }

    /// Set one ability score.
    pub fn ability(mut self, ability: Ability, score: u8) -> Self {
        *self.ability_slot(ability) = Some(score);
        self
    }

    pub fn casting_schools(mut self, schools: BTreeSet<CastingSchool>) -> Self {
        self.casting_schools = Some(schools);
        self
    }

    fn ability_slot(&mut self, ability: Ability) -> &mut Option<u8> {
        match ability {
            Ability::Strength => &mut self.strength,
            Ability::Intelligence => &mut self.intelligence,
            Ability::Wisdom => &mut self.wisdom,
            Ability::Dexterity => &mut self.dexterity,
            Ability::Constitution => &mut self.constitution,
            Ability::Charisma => &mut self.charisma,
        }
    }

    /// The ability scores present in this patch, in canonical order.
    pub fn abilities(&self) -> impl Iterator<Item = (Ability, u8)> + '_ {
        Ability::all().into_iter().filter_map(move |ability| {
            let score = match ability {
                Ability::Strength => self.strength,
                Ability::Intelligence => self.intelligence,
                Ability::Wisdom => self.wisdom,
                Ability::Dexterity => self.dexterity,
                Ability::Constitution => self.constitution,
                Ability::Charisma => self.charisma,
            };
            score.map(|s| (ability, s))
        })
    }

    /// Check the patch on its own, without looking at any character.
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> PartyResult<ValidatedPatch> {
        if let Some(name) = &self.name {
            if name.len() > MAX_NAME_LENGTH {
                return Err(PartyError::validation(format!(
                    "name is {} bytes long (max {MAX_NAME_LENGTH})",
                    name.len()
                )));
            }
        }

        if let (Some(class), Some(level)) = (self.class, self.level) {
            let max = class.max_level();
            if level < 1 || level > max {
                return Err(PartyError::validation(format!(
                    "level must be between 1 and {max} for {}",
                    class.name()
                )));
            }
        }

        for (ability, score) in self.abilities() {
            if !(MIN_ABILITY_SCORE..=MAX_ABILITY_SCORE).contains(&score) {
                return Err(PartyError::validation(format!(
                    "{} must be between {MIN_ABILITY_SCORE} and {MAX_ABILITY_SCORE}",
                    ability.name()
                )));
            }
        }

        if let Some(rolled) = self.rolled_hit_points {
            if rolled <= 0 {
                return Err(PartyError::validation("rolled hit points must be positive"));
            }
        }

        if let Some(current) = self.current_hit_points {
            if current < 0 {
                return Err(PartyError::validation(
                    "current hit points cannot be negative",
                ));
            }
            if let Some(rolled) = self.rolled_hit_points {
                if current > rolled {
                    return Err(PartyError::validation(format!(
                        "current hit points ({current}) exceed rolled hit points ({rolled})"
                    )));
                }
            }
        }

        Ok(ValidatedPatch(self.clone()))
    }
}

/// A patch that passed [`CharacterPatch::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPatch(CharacterPatch);

impl ValidatedPatch {
    pub fn apply(&self, character: &mut Character) {
        apply_character_patch(character, &self.0);
    }
}

/// Free-function form of [`CharacterPatch::validate`].
pub fn validate_character_patch(patch: &CharacterPatch) -> PartyResult<ValidatedPatch> {
    patch.validate()
}

/// Write every present field onto the character. Performs no validation.
pub fn apply_character_patch(character: &mut Character, patch: &CharacterPatch) {
    if let Some(name) = &patch.name {
        character.name = name.clone();
    }
    if let Some(class) = patch.class {
        character.class = Some(class);
    }
    if let Some(level) = patch.level {
        character.level = level;
    }
    if let Some(alignment) = patch.alignment {
        character.alignment = Some(alignment);
    }
    if let Some(bonus) = patch.armor_bonus {
        character.armor_bonus = bonus;
    }
    if let Some(hp) = patch.rolled_hit_points {
        character.rolled_hit_points = hp;
    }
    if let Some(hp) = patch.current_hit_points {
        character.current_hit_points = hp;
    }
    for (ability, score) in patch.abilities() {
        character.ability_scores.set(ability, score);
    }
    if let Some(schools) = &patch.casting_schools {
        character.casting_schools = schools.clone();
    }
}
