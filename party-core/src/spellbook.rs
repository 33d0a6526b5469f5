//! Spellbook engine.
//!
//! Each character has two pools bounded by the same slot-table allowance:
//! known spells (learned, at most one copy each) and memorized spells
//! (prepared copies of known spells, which casting consumes until a rest).
//! The two pools are counted independently.

use crate::error::{PartyError, PartyResult, RecordKind};
use crate::party::Party;
use crate::world::{CastingSchool, Character, CharacterId, MemorizedSpell, SpellId};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::debug;

/// One problem found by a spellbook audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpellViolation {
    #[error("spell {0} does not exist")]
    UnknownSpell(SpellId),

    #[error("duplicate spell: {name}")]
    DuplicateKnown { spell_id: SpellId, name: String },

    #[error("spell {name}: cannot learn {school} spells")]
    SchoolNotAllowed {
        spell_id: SpellId,
        name: String,
        school: CastingSchool,
    },

    #[error("spell {name}: cannot learn spells at level {level} (limit {limit})")]
    AboveMaxLevel {
        spell_id: SpellId,
        name: String,
        level: u8,
        limit: u8,
    },

    #[error("too many known spells at level {level}: {count} (limit: {limit})")]
    TooManyKnown { level: u8, count: usize, limit: u8 },

    #[error("memorized spell {0} does not exist")]
    UnknownMemorized(SpellId),

    #[error("memorized spell {name} is not known")]
    MemorizedNotKnown { spell_id: SpellId, name: String },

    #[error("memorized spell {name} is too high level (level {level})")]
    MemorizedAboveMaxLevel {
        spell_id: SpellId,
        name: String,
        level: u8,
    },

    #[error("too many memorized spells at level {level}: {count} (limit: {limit})")]
    TooManyMemorized { level: u8, count: usize, limit: u8 },
}

impl Party {
    // =========================================================================
    // Slot lookups
    // =========================================================================

    /// Slots a character has at a spell level. Characters without a class
    /// have none.
    fn allowance(&self, character: &Character, spell_level: u8) -> u8 {
        character.class.map_or(0, |class| {
            self.config()
                .slot_table
                .slots(class, character.level, spell_level)
        })
    }

    fn max_castable_level(&self, character: &Character) -> u8 {
        character.class.map_or(0, |class| {
            self.config()
                .slot_table
                .max_spell_level(class, character.level)
        })
    }

    /// Slots available to a character at a spell level.
    pub fn spell_slots(&self, character_id: CharacterId, spell_level: u8) -> PartyResult<u8> {
        let character = self.find_character(character_id)?;
        Ok(self.allowance(character, spell_level))
    }

    /// Highest spell level a character can cast, or 0.
    pub fn max_spell_level(&self, character_id: CharacterId) -> PartyResult<u8> {
        let character = self.find_character(character_id)?;
        Ok(self.max_castable_level(character))
    }

    /// Count spells in `ids` whose level is `spell_level`. Unknown ids are
    /// skipped.
    fn count_at_level(&self, ids: impl Iterator<Item = SpellId>, spell_level: u8) -> usize {
        ids.filter_map(|id| self.spells.find(id).ok())
            .filter(|spell| spell.level == spell_level)
            .count()
    }

    // =========================================================================
    // Known spells
    // =========================================================================

    /// Check whether a character could learn a spell right now.
    pub fn can_learn_spell(&self, character_id: CharacterId, spell_id: SpellId) -> PartyResult<()> {
        let character = self.find_character(character_id)?;
        let spell = self.spells.find(spell_id)?;
        let rules = self.config().spell_rules;

        if !character.can_cast(spell.school) {
            return Err(PartyError::rule(format!(
                "{} cannot learn {} spells",
                character.name, spell.school
            )));
        }

        if character.knows(spell_id) {
            return Err(PartyError::rule(format!("spell {} already known", spell.name)));
        }

        if rules.enforce_level_limit {
            let limit = self.max_castable_level(character);
            if spell.level > limit {
                return Err(PartyError::rule(format!(
                    "cannot learn spells at level {} (limit {limit})",
                    spell.level
                )));
            }
        }

        if rules.enforce_known_limit {
            let known = self.count_at_level(character.known_spells.iter().copied(), spell.level);
            let allowed = self.allowance(character, spell.level);
            if known >= usize::from(allowed) {
                return Err(PartyError::rule(format!(
                    "too many known spells at level {} (limit {allowed})",
                    spell.level
                )));
            }
        }

        Ok(())
    }

    /// Learn a spell after checking [`Party::can_learn_spell`].
    pub fn add_known_spell(&mut self, character_id: CharacterId, spell_id: SpellId) -> PartyResult<()> {
        self.can_learn_spell(character_id, spell_id)?;
        self.character_mut(character_id)?.known_spells.push(spell_id);
        debug!(character_id = %character_id, spell_id = %spell_id, "Spell learned");
        Ok(())
    }

    /// Forget a known spell. Memorized copies of it are dropped too.
    pub fn remove_known_spell(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
    ) -> PartyResult<()> {
        let character = self.character_mut(character_id)?;
        let Some(index) = character.known_spells.iter().position(|id| *id == spell_id) else {
            return Err(PartyError::not_found(RecordKind::Spell, spell_id));
        };
        character.known_spells.remove(index);
        if !character.knows(spell_id) {
            character.memorized_spells.retain(|m| m.spell_id != spell_id);
        }
        debug!(character_id = %character_id, spell_id = %spell_id, "Spell forgotten");
        Ok(())
    }

    // =========================================================================
    // Memorized spells
    // =========================================================================

    /// Prepare an uncast copy of a known spell.
    pub fn add_memorized_spell(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
    ) -> PartyResult<()> {
        let character = self.find_character(character_id)?;
        let spell = self.spells.find(spell_id)?;

        if !character.knows(spell_id) {
            return Err(PartyError::rule(format!("spell {} is not known", spell.name)));
        }

        let memorized = self.count_at_level(
            character.memorized_spells.iter().map(|m| m.spell_id),
            spell.level,
        );
        let allowed = self.allowance(character, spell.level);
        if memorized >= usize::from(allowed) {
            return Err(PartyError::rule(format!(
                "cannot memorize more level {} spells (limit: {allowed})",
                spell.level
            )));
        }

        self.character_mut(character_id)?
            .memorized_spells
            .push(MemorizedSpell::new(spell_id));
        debug!(character_id = %character_id, spell_id = %spell_id, "Spell memorized");
        Ok(())
    }

    /// Remove the first memorized copy of a spell, cast or not.
    pub fn remove_memorized_spell(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
    ) -> PartyResult<()> {
        let character = self.character_mut(character_id)?;
        let Some(index) = character
            .memorized_spells
            .iter()
            .position(|m| m.spell_id == spell_id)
        else {
            return Err(PartyError::not_found(RecordKind::Spell, spell_id));
        };
        character.memorized_spells.remove(index);
        Ok(())
    }

    /// Mark the first uncast copy of a spell as cast.
    pub fn cast_memorized_spell(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
    ) -> PartyResult<()> {
        self.set_cast_flag(character_id, spell_id, true)
    }

    /// Mark the first cast copy of a spell as uncast again.
    pub fn uncast_memorized_spell(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
    ) -> PartyResult<()> {
        self.set_cast_flag(character_id, spell_id, false)
    }

    fn set_cast_flag(
        &mut self,
        character_id: CharacterId,
        spell_id: SpellId,
        cast: bool,
    ) -> PartyResult<()> {
        let character = self.character_mut(character_id)?;
        let Some(instance) = character
            .memorized_spells
            .iter_mut()
            .find(|m| m.spell_id == spell_id && m.cast != cast)
        else {
            let wanted = if cast { "uncast" } else { "cast" };
            return Err(PartyError::invalid_state(format!(
                "no {wanted} memorized copy of spell {spell_id} found"
            )));
        };
        instance.cast = cast;
        debug!(character_id = %character_id, spell_id = %spell_id, cast, "Cast flag changed");
        Ok(())
    }

    /// Rest: every memorized copy becomes available again.
    pub fn reset_all_memorized_spells(&mut self, character_id: CharacterId) -> PartyResult<()> {
        let character = self.character_mut(character_id)?;
        for instance in &mut character.memorized_spells {
            instance.cast = false;
        }
        debug!(character_id = %character_id, "Memorized spells reset");
        Ok(())
    }

    // =========================================================================
    // Audits
    // =========================================================================

    /// Audit the known-spell pool, collecting every violation.
    pub fn validate_spells(&self, character_id: CharacterId) -> PartyResult<Vec<SpellViolation>> {
        let character = self.find_character(character_id)?;
        let rules = self.config().spell_rules;
        let limit = self.max_castable_level(character);

        let mut violations = Vec::new();
        let mut seen = HashSet::new();
        let mut per_level: BTreeMap<u8, usize> = BTreeMap::new();

        for id in &character.known_spells {
            let Ok(spell) = self.spells.find(*id) else {
                violations.push(SpellViolation::UnknownSpell(*id));
                continue;
            };

            if !seen.insert(*id) {
                violations.push(SpellViolation::DuplicateKnown {
                    spell_id: *id,
                    name: spell.name.clone(),
                });
            }
            if !character.can_cast(spell.school) {
                violations.push(SpellViolation::SchoolNotAllowed {
                    spell_id: *id,
                    name: spell.name.clone(),
                    school: spell.school,
                });
            }
            if rules.enforce_level_limit && spell.level > limit {
                violations.push(SpellViolation::AboveMaxLevel {
                    spell_id: *id,
                    name: spell.name.clone(),
                    level: spell.level,
                    limit,
                });
            }
            *per_level.entry(spell.level).or_default() += 1;
        }

        if rules.enforce_known_limit {
            for (level, count) in per_level {
                let allowed = self.allowance(character, level);
                if count > usize::from(allowed) {
                    violations.push(SpellViolation::TooManyKnown {
                        level,
                        count,
                        limit: allowed,
                    });
                }
            }
        }

        Ok(violations)
    }

    /// Audit the memorized pool, collecting every violation.
    pub fn validate_memorized_spells(
        &self,
        character_id: CharacterId,
    ) -> PartyResult<Vec<SpellViolation>> {
        let character = self.find_character(character_id)?;
        let limit = self.max_castable_level(character);

        let mut violations = Vec::new();
        let mut per_level: BTreeMap<u8, usize> = BTreeMap::new();

        for instance in &character.memorized_spells {
            let Ok(spell) = self.spells.find(instance.spell_id) else {
                violations.push(SpellViolation::UnknownMemorized(instance.spell_id));
                continue;
            };

            if !character.knows(spell.id) {
                violations.push(SpellViolation::MemorizedNotKnown {
                    spell_id: spell.id,
                    name: spell.name.clone(),
                });
            }
            if spell.level > limit {
                violations.push(SpellViolation::MemorizedAboveMaxLevel {
                    spell_id: spell.id,
                    name: spell.name.clone(),
                    level: spell.level,
                });
            }
            *per_level.entry(spell.level).or_default() += 1;
        }

        for (level, count) in per_level {
            let allowed = self.allowance(character, level);
            if count > usize::from(allowed) {
                violations.push(SpellViolation::TooManyMemorized {
                    level,
                    count,
                    limit: allowed,
                });
            }
        }

        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PartyConfig, SpellRules};
    use crate::patch::CharacterPatch;
    use crate::world::CharacterClass;
    use std::collections::BTreeSet;

    fn caster(party: &mut Party, class: CharacterClass, level: u8, school: CastingSchool) -> CharacterId {
        let id = party.add_character("Caster").id;
        let patch = CharacterPatch::new()
            .class(class)
            .level(level)
            .casting_schools(BTreeSet::from([school]));
        party.patch_character(id, &patch).unwrap();
        id
    }

    #[test]
    fn test_learn_and_forget() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 1, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;

        party.add_known_spell(wizard, sleep).unwrap();
        assert!(party.find_character(wizard).unwrap().knows(sleep));

        let err = party.add_known_spell(wizard, sleep).unwrap_err();
        assert!(err.is_rule_violation());
        assert!(err.to_string().contains("already known"));

        party.remove_known_spell(wizard, sleep).unwrap();
        assert!(party.remove_known_spell(wizard, sleep).unwrap_err().is_not_found());
    }

    #[test]
    fn test_learn_requires_school() {
        let mut party = Party::new();
        let cleric = caster(&mut party, CharacterClass::Cleric, 4, CastingSchool::Divine);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        let err = party.add_known_spell(cleric, sleep).unwrap_err();
        assert!(err.is_rule_violation());
        assert!(err.to_string().contains("arcane"));
    }

    #[test]
    fn test_learn_missing_spell() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 1, CastingSchool::Arcane);
        assert!(party
            .add_known_spell(wizard, SpellId(99))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_zero_allowance_blocks_learning() {
        let mut party = Party::new();
        let cleric = caster(&mut party, CharacterClass::Cleric, 1, CastingSchool::Divine);
        let bless = party.new_spell("Bless", 1, CastingSchool::Divine).unwrap().id;
        assert!(party.add_known_spell(cleric, bless).unwrap_err().is_rule_violation());

        let elf = caster(&mut party, CharacterClass::Elf, 10, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        assert!(party.add_known_spell(elf, sleep).unwrap_err().is_rule_violation());
    }

    #[test]
    fn test_relaxed_rules() {
        let rules = SpellRules {
            enforce_known_limit: false,
            enforce_level_limit: false,
        };
        let mut party = Party::with_config(PartyConfig::new().with_spell_rules(rules));
        let wizard = caster(&mut party, CharacterClass::MagicUser, 1, CastingSchool::Arcane);
        let fireball = party.new_spell("Fireball", 3, CastingSchool::Arcane).unwrap().id;
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        let shield = party.new_spell("Shield", 1, CastingSchool::Arcane).unwrap().id;

        party.add_known_spell(wizard, fireball).unwrap();
        party.add_known_spell(wizard, sleep).unwrap();
        party.add_known_spell(wizard, shield).unwrap();
        assert!(party.validate_spells(wizard).unwrap().is_empty());

        // Memorizing is always bounded by the table.
        assert!(party
            .add_memorized_spell(wizard, fireball)
            .unwrap_err()
            .is_rule_violation());
    }

    #[test]
    fn test_memorize_cast_and_rest() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 2, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        party.add_known_spell(wizard, sleep).unwrap();

        party.add_memorized_spell(wizard, sleep).unwrap();
        party.add_memorized_spell(wizard, sleep).unwrap();
        assert!(party
            .add_memorized_spell(wizard, sleep)
            .unwrap_err()
            .is_rule_violation());

        party.cast_memorized_spell(wizard, sleep).unwrap();
        party.cast_memorized_spell(wizard, sleep).unwrap();
        assert!(matches!(
            party.cast_memorized_spell(wizard, sleep),
            Err(PartyError::InvalidState(_))
        ));

        party.uncast_memorized_spell(wizard, sleep).unwrap();
        let flags: Vec<bool> = party
            .find_character(wizard)
            .unwrap()
            .memorized_spells
            .iter()
            .map(|m| m.cast)
            .collect();
        assert_eq!(flags, vec![false, true]);

        party.reset_all_memorized_spells(wizard).unwrap();
        assert!(party
            .find_character(wizard)
            .unwrap()
            .memorized_spells
            .iter()
            .all(|m| !m.cast));
        assert!(matches!(
            party.uncast_memorized_spell(wizard, sleep),
            Err(PartyError::InvalidState(_))
        ));
    }

    #[test]
    fn test_memorize_requires_known() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 3, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        assert!(party
            .add_memorized_spell(wizard, sleep)
            .unwrap_err()
            .is_rule_violation());
        assert!(party
            .add_memorized_spell(wizard, SpellId(50))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_remove_memorized_ignores_cast_flag() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 2, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        party.add_known_spell(wizard, sleep).unwrap();
        party.add_memorized_spell(wizard, sleep).unwrap();
        party.cast_memorized_spell(wizard, sleep).unwrap();

        party.remove_memorized_spell(wizard, sleep).unwrap();
        assert!(party.find_character(wizard).unwrap().memorized_spells.is_empty());
        assert!(party
            .remove_memorized_spell(wizard, sleep)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_forgetting_drops_memorized_copies() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 2, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        party.add_known_spell(wizard, sleep).unwrap();
        party.add_memorized_spell(wizard, sleep).unwrap();

        party.remove_known_spell(wizard, sleep).unwrap();
        assert!(party.find_character(wizard).unwrap().memorized_spells.is_empty());
        assert!(party.validate_memorized_spells(wizard).unwrap().is_empty());
    }

    #[test]
    fn test_audits_collect_every_violation() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 1, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        let bless = party.new_spell("Bless", 1, CastingSchool::Divine).unwrap().id;
        let fireball = party.new_spell("Fireball", 3, CastingSchool::Arcane).unwrap().id;

        {
            let character = party.character_mut(wizard).unwrap();
            character.known_spells = vec![sleep, sleep, bless, fireball, SpellId(77)];
            character.memorized_spells = vec![
                MemorizedSpell::new(sleep),
                MemorizedSpell::new(sleep),
                MemorizedSpell::new(fireball),
                MemorizedSpell::new(SpellId(88)),
            ];
        }

        let known = party.validate_spells(wizard).unwrap();
        assert!(known.contains(&SpellViolation::DuplicateKnown {
            spell_id: sleep,
            name: "Sleep".into()
        }));
        assert!(known.iter().any(|v| matches!(v, SpellViolation::SchoolNotAllowed { spell_id, .. } if *spell_id == bless)));
        assert!(known.iter().any(|v| matches!(v, SpellViolation::AboveMaxLevel { level: 3, limit: 1, .. })));
        assert!(known.contains(&SpellViolation::TooManyKnown {
            level: 1,
            count: 3,
            limit: 1
        }));
        assert!(known.contains(&SpellViolation::UnknownSpell(SpellId(77))));

        let memorized = party.validate_memorized_spells(wizard).unwrap();
        assert!(memorized.contains(&SpellViolation::TooManyMemorized {
            level: 1,
            count: 2,
            limit: 1
        }));
        assert!(memorized.iter().any(|v| matches!(v, SpellViolation::MemorizedAboveMaxLevel { level: 3, .. })));
        assert!(memorized.contains(&SpellViolation::UnknownMemorized(SpellId(88))));
        assert!(memorized.contains(&SpellViolation::TooManyMemorized {
            level: 3,
            count: 1,
            limit: 0
        }));
    }

    #[test]
    fn test_audit_flags_memorized_not_known() {
        let mut party = Party::new();
        let wizard = caster(&mut party, CharacterClass::MagicUser, 1, CastingSchool::Arcane);
        let sleep = party.new_spell("Sleep", 1, CastingSchool::Arcane).unwrap().id;
        party
            .character_mut(wizard)
            .unwrap()
            .memorized_spells
            .push(MemorizedSpell::new(sleep));

        assert_eq!(
            party.validate_memorized_spells(wizard).unwrap(),
            vec![SpellViolation::MemorizedNotKnown {
                spell_id: sleep,
                name: "Sleep".into()
            }]
        );
    }

    #[test]
    fn test_slot_queries() {
        let mut party = Party::new();
        let cleric = caster(&mut party, CharacterClass::Cleric, 6, CastingSchool::Divine);
        assert_eq!(party.max_spell_level(cleric).unwrap(), 4);
        assert_eq!(party.spell_slots(cleric, 3).unwrap(), 1);

        let nobody = party.add_character("Unclassed").id;
        assert_eq!(party.max_spell_level(nobody).unwrap(), 0);
        assert_eq!(party.spell_slots(nobody, 1).unwrap(), 0);
    }
}
