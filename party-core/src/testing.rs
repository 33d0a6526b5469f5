//! Testing utilities for party state.
//!
//! This module provides tools for integration testing:
//! - Fixture constructors for common characters
//! - A whole-party invariant audit
//! - Assertion helpers for verifying item placement

use crate::items::ItemLocation;
use crate::party::Party;
use crate::patch::CharacterPatch;
use crate::world::{Ability, CastingSchool, CharacterClass, CharacterId, ItemId};
use std::collections::{BTreeSet, HashSet};

// ============================================================================
// Fixtures
// ============================================================================

fn add_classed(party: &mut Party, name: &str, patch: CharacterPatch) -> CharacterId {
    let id = party.add_character(name).id;
    let character = party
        .character_mut(id)
        .unwrap_or_else(|e| panic!("fixture character vanished: {e}"));
    crate::patch::apply_character_patch(character, &patch);
    id
}

/// Add a level 1 fighter with solid physical stats.
pub fn sample_fighter(party: &mut Party, name: &str) -> CharacterId {
    let patch = CharacterPatch::new()
        .class(CharacterClass::Fighter)
        .level(1)
        .rolled_hit_points(8)
        .current_hit_points(8)
        .ability(Ability::Strength, 16)
        .ability(Ability::Constitution, 14);
    add_classed(party, name, patch)
}

/// Add a divine caster at the given level.
pub fn sample_cleric(party: &mut Party, name: &str, level: u8) -> CharacterId {
    let patch = CharacterPatch::new()
        .class(CharacterClass::Cleric)
        .level(level)
        .rolled_hit_points(6)
        .current_hit_points(6)
        .ability(Ability::Wisdom, 15)
        .casting_schools(BTreeSet::from([CastingSchool::Divine]));
    add_classed(party, name, patch)
}

/// Add an arcane caster at the given level.
pub fn sample_magic_user(party: &mut Party, name: &str, level: u8) -> CharacterId {
    let patch = CharacterPatch::new()
        .class(CharacterClass::MagicUser)
        .level(level)
        .rolled_hit_points(4)
        .current_hit_points(4)
        .ability(Ability::Intelligence, 17)
        .casting_schools(BTreeSet::from([CastingSchool::Arcane]));
    add_classed(party, name, patch)
}

// ============================================================================
// Invariant Audit
// ============================================================================

/// Collect every broken party invariant as a human-readable line.
///
/// Covers item placement, inventory bounds, equip slots, and both
/// spellbook pools for every character.
pub fn party_invariant_violations(party: &Party) -> Vec<String> {
    let mut problems = Vec::new();

    for item in party.items() {
        let Some(holder) = item.holder() else {
            continue;
        };
        match party.find_character(holder) {
            Ok(character) if character.holds(item.id) => {}
            Ok(character) => problems.push(format!(
                "item {} claims holder {} but is not in their inventory",
                item.id, character.id
            )),
            Err(_) => problems.push(format!(
                "item {} claims missing holder {holder}",
                item.id
            )),
        }
    }

    for character in party.characters() {
        if let Err(e) = party.validate_character_inventory(character.id) {
            problems.push(format!("character {}: {e}", character.id));
        }

        let mut seen: HashSet<ItemId> = HashSet::new();
        for id in &character.inventory {
            if !seen.insert(*id) {
                continue;
            }
            if let Ok(item) = party.find_item(*id) {
                if item.location != ItemLocation::Character(character.id) {
                    problems.push(format!(
                        "character {} lists item {} located at {}",
                        character.id, id, item.location
                    ));
                }
            }
        }

        for result in [
            party.validate_spells(character.id),
            party.validate_memorized_spells(character.id),
        ] {
            match result {
                Ok(violations) => problems.extend(
                    violations
                        .into_iter()
                        .map(|v| format!("character {}: {v}", character.id)),
                ),
                Err(e) => problems.push(format!("character {}: {e}", character.id)),
            }
        }
    }

    problems
}

// ============================================================================
// Assertion Helpers
// ============================================================================

/// Assert that every party invariant holds.
#[track_caller]
pub fn assert_party_invariants(party: &Party) {
    let problems = party_invariant_violations(party);
    assert!(
        problems.is_empty(),
        "Expected a consistent party, found:\n{}",
        problems.join("\n")
    );
}

/// Assert that an item sits at the expected location.
#[track_caller]
pub fn assert_location(party: &Party, item: ItemId, expected: ItemLocation) {
    let actual = party
        .find_item(item)
        .unwrap_or_else(|e| panic!("Expected item {item} to exist: {e}"))
        .location;
    assert_eq!(actual, expected, "Expected item {item} at {expected}, got {actual}");
}

/// Assert that a character carries an item.
#[track_caller]
pub fn assert_holds(party: &Party, character: CharacterId, item: ItemId) {
    let holder = party
        .find_character(character)
        .unwrap_or_else(|e| panic!("Expected character {character} to exist: {e}"));
    assert!(
        holder.holds(item),
        "Expected character {character} to hold item {item}"
    );
}

/// Assert that a character does NOT carry an item.
#[track_caller]
pub fn assert_not_holds(party: &Party, character: CharacterId, item: ItemId) {
    let holder = party
        .find_character(character)
        .unwrap_or_else(|e| panic!("Expected character {character} to exist: {e}"));
    assert!(
        !holder.holds(item),
        "Expected character {character} to NOT hold item {item}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ArmorType;

    #[test]
    fn test_fixtures_are_consistent() {
        let mut party = Party::new();
        let fighter = sample_fighter(&mut party, "Aldric");
        let cleric = sample_cleric(&mut party, "Brenna", 4);
        let wizard = sample_magic_user(&mut party, "Mordecai", 2);

        assert_eq!(
            party.find_character(fighter).unwrap().class,
            Some(CharacterClass::Fighter)
        );
        assert!(party
            .find_character(cleric)
            .unwrap()
            .can_cast(CastingSchool::Divine));
        assert_eq!(party.find_character(wizard).unwrap().level, 2);
        assert_party_invariants(&party);
    }

    #[test]
    fn test_audit_reports_broken_placement() {
        let mut party = Party::new();
        let fighter = sample_fighter(&mut party, "Aldric");
        let plate = party
            .new_armor("Plate", ArmorType::Plate, 0, ItemLocation::Character(fighter))
            .unwrap()
            .id;
        assert_holds(&party, fighter, plate);

        party.character_mut(fighter).unwrap().inventory.clear();
        let problems = party_invariant_violations(&party);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("not in their inventory"));
    }

    #[test]
    fn test_audit_reports_spellbook_overflow() {
        let mut party = Party::new();
        let cleric = sample_cleric(&mut party, "Brenna", 2);
        let bless = party.new_spell("Bless", 1, CastingSchool::Divine).unwrap().id;
        let light = party.new_spell("Light", 1, CastingSchool::Divine).unwrap().id;
        party.add_known_spell(cleric, bless).unwrap();
        party.character_mut(cleric).unwrap().known_spells.push(light);

        let problems = party_invariant_violations(&party);
        assert!(problems.iter().any(|p| p.contains("too many known spells")));
    }

    #[test]
    #[should_panic(expected = "Expected character 1 to NOT hold item 1")]
    fn test_assert_not_holds_panics() {
        let mut party = Party::new();
        let fighter = sample_fighter(&mut party, "Aldric");
        let rope = party
            .new_generic_item("Rope", ItemLocation::Character(fighter))
            .unwrap()
            .id;
        assert_not_holds(&party, fighter, rope);
    }
}
