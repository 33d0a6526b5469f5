//! The party: every piece of mutable state for one session.
//!
//! A [`Party`] owns the roster, the item registry, the spell registry, and
//! the rule configuration. All operations are methods on it. Inventory and
//! spellbook operations live in [`crate::inventory`] and
//! [`crate::spellbook`]; this module covers the roster, item creation and
//! editing, and spell registration.
//!
//! The party does no internal locking. Callers sharing one across tasks
//! must serialize access themselves.

use crate::config::PartyConfig;
use crate::error::{PartyError, PartyResult, RecordKind};
use crate::items::{
    ArmorStats, ArmorType, ChargeStats, Item, ItemKind, ItemLocation, JewelryStats, ShieldStats,
    WeaponStats, MAX_ITEM_BONUS, MAX_WEAPON_DAMAGE, MIN_WEAPON_DAMAGE,
};
use crate::patch::CharacterPatch;
use crate::registry::Registry;
use crate::world::{CastingSchool, Character, CharacterId, ItemId, Spell, SpellId};
use tracing::{debug, info};
use uuid::Uuid;

/// The party roster and everything it can hold.
#[derive(Debug, Clone)]
pub struct Party {
    session_id: Uuid,
    config: PartyConfig,
    characters: Vec<Character>,
    next_character_id: u32,
    pub(crate) items: Registry<Item>,
    pub(crate) spells: Registry<Spell>,
}

impl Party {
    /// Create an empty party with the standard rules.
    pub fn new() -> Self {
        Self::with_config(PartyConfig::default())
    }

    pub fn with_config(config: PartyConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            config,
            characters: Vec::new(),
            next_character_id: 1,
            items: Registry::new(),
            spells: Registry::new(),
        }
    }

    /// Random id for this session, for the caller's bookkeeping.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &PartyConfig {
        &self.config
    }

    // =========================================================================
    // Roster
    // =========================================================================

    /// Add a fresh character with the next sequential id.
    pub fn add_character(&mut self, name: impl Into<String>) -> &Character {
        let id = CharacterId(self.next_character_id);
        self.next_character_id += 1;

        let character = Character::new(id, name);
        info!(character_id = %id, name = %character.name, "Character added");
        self.characters.push(character);
        &self.characters[self.characters.len() - 1]
    }

    /// All characters in roster order.
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn find_character(&self, id: CharacterId) -> PartyResult<&Character> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PartyError::not_found(RecordKind::Character, id))
    }

    pub(crate) fn character_mut(&mut self, id: CharacterId) -> PartyResult<&mut Character> {
        self.characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| PartyError::not_found(RecordKind::Character, id))
    }

    /// Remove a character after moving everything they carry to limbo.
    pub fn delete_character(&mut self, id: CharacterId) -> PartyResult<()> {
        self.find_character(id)?;
        self.move_all_from_character(id, ItemLocation::Limbo)?;
        self.characters.retain(|c| c.id != id);
        info!(character_id = %id, "Character deleted");
        Ok(())
    }

    /// Validate a patch, then apply it to a character.
    ///
    /// Returns the first validation failure, leaving the character untouched.
    pub fn patch_character(&mut self, id: CharacterId, patch: &CharacterPatch) -> PartyResult<()> {
        let validated = patch.validate()?;
        let character = self.character_mut(id)?;
        validated.apply(character);
        debug!(character_id = %id, "Character patched");
        Ok(())
    }

    // =========================================================================
    // Items
    // =========================================================================

    pub fn find_item(&self, id: ItemId) -> PartyResult<&Item> {
        self.items.find(id)
    }

    /// All items in id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Items at a location, in id order.
    pub fn items_at(&self, location: ItemLocation) -> Vec<&Item> {
        self.items
            .iter()
            .filter(|item| item.location == location)
            .collect()
    }

    pub fn new_generic_item(
        &mut self,
        name: impl Into<String>,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        self.create_item(name.into(), ItemKind::Generic, location)
    }

    pub fn new_weapon(
        &mut self,
        name: impl Into<String>,
        stats: WeaponStats,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        self.create_item(name.into(), ItemKind::Weapon(stats), location)
    }

    pub fn new_armor(
        &mut self,
        name: impl Into<String>,
        armor_type: ArmorType,
        bonus: u8,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        let kind = ItemKind::Armor(ArmorStats { armor_type, bonus });
        self.create_item(name.into(), kind, location)
    }

    pub fn new_shield(
        &mut self,
        name: impl Into<String>,
        bonus: u8,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        self.create_item(name.into(), ItemKind::Shield(ShieldStats { bonus }), location)
    }

    pub fn new_jewelry(
        &mut self,
        name: impl Into<String>,
        armor_bonus: u8,
        save_bonus: u8,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        let kind = ItemKind::Jewelry(JewelryStats {
            armor_bonus,
            save_bonus,
        });
        self.create_item(name.into(), kind, location)
    }

    pub fn new_charge_item(
        &mut self,
        name: impl Into<String>,
        stats: ChargeStats,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        self.create_item(name.into(), ItemKind::ChargeItem(stats), location)
    }

    /// Register a new item and place it. A character location goes through
    /// the normal move, so capacity is enforced; on failure the item is
    /// unregistered again.
    fn create_item(
        &mut self,
        name: String,
        kind: ItemKind,
        location: ItemLocation,
    ) -> PartyResult<&Item> {
        let id = self.items.allocate_id()?;
        self.items.register(Item::new(id, name, kind))?;

        let placed = match location {
            ItemLocation::None => Ok(()),
            ItemLocation::Character(holder) => self.move_item_to_character(id, holder),
            bucket => self.move_item_to_bucket(id, bucket),
        };
        if let Err(e) = placed {
            self.items.unregister(id);
            return Err(e);
        }

        debug!(item_id = %id, location = %location, "Item created");
        self.items.find(id)
    }

    /// Rename any item regardless of category.
    pub fn rename_item(&mut self, id: ItemId, name: impl Into<String>) -> PartyResult<()> {
        let name = name.into();
        let item = self.items.find_mut(id)?;
        check_name(&name)?;
        item.name = name;
        Ok(())
    }

    pub fn edit_generic_item(
        &mut self,
        id: ItemId,
        name: impl Into<String>,
        url: Option<String>,
    ) -> PartyResult<()> {
        let name = name.into();
        let item = self.items.find_mut(id)?;
        if item.kind != ItemKind::Generic {
            return Err(PartyError::not_found(RecordKind::Item, id));
        }
        check_name(&name)?;
        item.name = name;
        item.url = url;
        Ok(())
    }

    pub fn edit_weapon(&mut self, id: ItemId, stats: WeaponStats) -> PartyResult<()> {
        let item = self.items.find_mut(id)?;
        let ItemKind::Weapon(weapon) = &mut item.kind else {
            return Err(PartyError::not_found(RecordKind::Item, id));
        };
        if !(MIN_WEAPON_DAMAGE..=MAX_WEAPON_DAMAGE).contains(&stats.damage) {
            return Err(PartyError::validation(format!(
                "damage must be between {MIN_WEAPON_DAMAGE} and {MAX_WEAPON_DAMAGE}"
            )));
        }
        check_bonus("bonus", stats.bonus)?;
        *weapon = stats;
        Ok(())
    }

    /// Change an armor's type and bonus. If a character carries the armor,
    /// their class must be allowed the new type, equipped or not.
    pub fn edit_armor(&mut self, id: ItemId, armor_type: ArmorType, bonus: u8) -> PartyResult<()> {
        let item = self.items.find(id)?;
        if item.as_armor().is_none() {
            return Err(PartyError::not_found(RecordKind::Item, id));
        }
        check_bonus("bonus", bonus)?;

        if let Some(holder) = item.holder() {
            let carrier = self.find_character(holder)?;
            if let Some(class) = carrier.class {
                if !class.may_wear(armor_type) {
                    return Err(PartyError::rule(format!(
                        "cannot change armor: {class} is carrying this item and cannot wear {armor_type}"
                    )));
                }
            }
        }

        let item = self.items.find_mut(id)?;
        item.kind = ItemKind::Armor(ArmorStats { armor_type, bonus });
        Ok(())
    }

    pub fn edit_shield(&mut self, id: ItemId, bonus: u8) -> PartyResult<()> {
        let item = self.items.find_mut(id)?;
        let ItemKind::Shield(shield) = &mut item.kind else {
            return Err(PartyError::not_found(RecordKind::Item, id));
        };
        check_bonus("bonus", bonus)?;
        shield.bonus = bonus;
        Ok(())
    }

    pub fn edit_jewelry(&mut self, id: ItemId, armor_bonus: u8, save_bonus: u8) -> PartyResult<()> {
        let item = self.items.find_mut(id)?;
        let ItemKind::Jewelry(jewelry) = &mut item.kind else {
            return Err(PartyError::not_found(RecordKind::Item, id));
        };
        check_bonus("armor bonus", armor_bonus)?;
        check_bonus("save bonus", save_bonus)?;
        jewelry.armor_bonus = armor_bonus;
        jewelry.save_bonus = save_bonus;
        Ok(())
    }

    pub fn edit_charge_item(&mut self, id: ItemId, stats: ChargeStats) -> PartyResult<()> {
        let item = self.items.find_mut(id)?;
        let ItemKind::ChargeItem(charge) = &mut item.kind else {
            return Err(PartyError::not_found(RecordKind::Item, id));
        };
        *charge = stats;
        Ok(())
    }

    // =========================================================================
    // Spells
    // =========================================================================

    /// Define a new spell with the next sequential id.
    pub fn new_spell(
        &mut self,
        name: impl Into<String>,
        level: u8,
        school: CastingSchool,
    ) -> PartyResult<&Spell> {
        let id = self.spells.allocate_id()?;
        self.spells.register(Spell::new(id, name, level, school))?;
        self.spells.find(id)
    }

    /// Register a spell that already carries an id.
    pub fn register_spell(&mut self, spell: Spell) -> PartyResult<SpellId> {
        self.spells.register(spell)
    }

    pub fn find_spell(&self, id: SpellId) -> PartyResult<&Spell> {
        self.spells.find(id)
    }

    /// All spells in id order.
    pub fn spells(&self) -> impl Iterator<Item = &Spell> {
        self.spells.iter()
    }
}

impl Default for Party {
    fn default() -> Self {
        Self::new()
    }
}

fn check_name(name: &str) -> PartyResult<()> {
    if name.trim().is_empty() {
        return Err(PartyError::validation("name cannot be empty"));
    }
    Ok(())
}

fn check_bonus(label: &str, bonus: u8) -> PartyResult<()> {
    if bonus > MAX_ITEM_BONUS {
        return Err(PartyError::validation(format!(
            "{label} must be between 0 and {MAX_ITEM_BONUS}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::CharacterClass;

    #[test]
    fn test_character_ids_are_sequential() {
        let mut party = Party::new();
        let a = party.add_character("Aldric").id;
        let b = party.add_character("Brenna").id;
        assert_eq!(a, CharacterId(1));
        assert_eq!(b, CharacterId(2));
        assert_eq!(party.characters().len(), 2);
    }

    #[test]
    fn test_find_missing_character() {
        let party = Party::new();
        assert_eq!(
            party.find_character(CharacterId(9)).unwrap_err(),
            PartyError::NotFound {
                kind: RecordKind::Character,
                id: 9
            }
        );
    }

    #[test]
    fn test_item_ids_share_one_space() {
        let mut party = Party::new();
        let rope = party.new_generic_item("Rope", ItemLocation::Storage).unwrap().id;
        let sword = party
            .new_weapon("Sword", WeaponStats::new(8).melee(), ItemLocation::Limbo)
            .unwrap()
            .id;
        let plate = party
            .new_armor("Plate", ArmorType::Plate, 0, ItemLocation::None)
            .unwrap()
            .id;
        assert_eq!((rope, sword, plate), (ItemId(1), ItemId(2), ItemId(3)));
        assert_eq!(party.find_item(sword).unwrap().name, "Sword");
        assert_eq!(party.find_item(rope).unwrap().location, ItemLocation::Storage);
    }

    #[test]
    fn test_create_item_on_character() {
        let mut party = Party::new();
        let hero = party.add_character("Aldric").id;
        let id = party
            .new_shield("Kite Shield", 1, ItemLocation::Character(hero))
            .unwrap()
            .id;
        assert_eq!(party.find_item(id).unwrap().holder(), Some(hero));
        assert!(party.find_character(hero).unwrap().holds(id));
    }

    #[test]
    fn test_create_item_on_missing_character_is_rolled_back() {
        let mut party = Party::new();
        let result = party.new_generic_item("Lantern", ItemLocation::Character(CharacterId(5)));
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(party.items().count(), 0);
    }

    #[test]
    fn test_edit_weapon_ranges() {
        let mut party = Party::new();
        let id = party
            .new_weapon("Mace", WeaponStats::new(6).melee().blunt(), ItemLocation::None)
            .unwrap()
            .id;

        assert!(matches!(
            party.edit_weapon(id, WeaponStats::new(11)),
            Err(PartyError::Validation(_))
        ));
        assert!(matches!(
            party.edit_weapon(id, WeaponStats::new(6).with_bonus(4)),
            Err(PartyError::Validation(_))
        ));
        party
            .edit_weapon(id, WeaponStats::new(7).with_bonus(2).melee())
            .unwrap();
        let stats = party.find_item(id).unwrap().as_weapon().copied().unwrap();
        assert_eq!(stats.damage, 7);
        assert_eq!(stats.bonus, 2);
        assert!(!stats.is_blunt);
    }

    #[test]
    fn test_edit_wrong_category_is_not_found() {
        let mut party = Party::new();
        let ring = party.new_jewelry("Ring", 1, 1, ItemLocation::None).unwrap().id;
        assert!(party.edit_shield(ring, 1).unwrap_err().is_not_found());
        assert!(party
            .edit_generic_item(ring, "Band", None)
            .unwrap_err()
            .is_not_found());
        assert!(party.edit_jewelry(ring, 2, 3).is_ok());
        assert!(matches!(
            party.edit_jewelry(ring, 4, 0),
            Err(PartyError::Validation(_))
        ));
    }

    #[test]
    fn test_edit_generic_item() {
        let mut party = Party::new();
        let id = party.new_generic_item("Rope", ItemLocation::None).unwrap().id;
        assert!(matches!(
            party.edit_generic_item(id, "  ", None),
            Err(PartyError::Validation(_))
        ));
        party
            .edit_generic_item(id, "Silk Rope", Some("https://example.com/rope".into()))
            .unwrap();
        let item = party.find_item(id).unwrap();
        assert_eq!(item.name, "Silk Rope");
        assert_eq!(item.url.as_deref(), Some("https://example.com/rope"));
    }

    #[test]
    fn test_edit_carried_armor_respects_carrier_class() {
        let mut party = Party::new();
        let wizard = party.add_character("Mordecai").id;
        party
            .patch_character(
                wizard,
                &CharacterPatch::new().class(CharacterClass::MagicUser).level(3),
            )
            .unwrap();
        let robes = party
            .new_armor("Robes", ArmorType::Robes, 0, ItemLocation::Character(wizard))
            .unwrap()
            .id;
        party.equip_armor(wizard, robes).unwrap();

        assert!(party
            .edit_armor(robes, ArmorType::Chain, 0)
            .unwrap_err()
            .is_rule_violation());
        assert!(party.edit_armor(robes, ArmorType::Robes, 2).is_ok());

        party.unequip_armor(wizard).unwrap();
        assert!(party
            .edit_armor(robes, ArmorType::Chain, 0)
            .unwrap_err()
            .is_rule_violation());

        party.move_item_to_storage(robes).unwrap();
        assert!(party.edit_armor(robes, ArmorType::Chain, 0).is_ok());
    }

    #[test]
    fn test_edit_charge_item() {
        let mut party = Party::new();
        let wand = party
            .new_charge_item("Wand", ChargeStats::new(10).arcane(), ItemLocation::None)
            .unwrap()
            .id;
        party
            .edit_charge_item(wand, ChargeStats::new(3).arcane().divine())
            .unwrap();
        let item = party.find_item(wand).unwrap();
        assert_eq!(
            item.kind,
            ItemKind::ChargeItem(ChargeStats::new(3).arcane().divine())
        );
    }

    #[test]
    fn test_items_at_bucket() {
        let mut party = Party::new();
        party.new_generic_item("Rope", ItemLocation::Storage).unwrap();
        party.new_generic_item("Torch", ItemLocation::Limbo).unwrap();
        party.new_generic_item("Spade", ItemLocation::Storage).unwrap();

        let stored: Vec<&str> = party
            .items_at(ItemLocation::Storage)
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(stored, vec!["Rope", "Spade"]);
    }

    #[test]
    fn test_spell_registration() {
        let mut party = Party::new();
        let bless = party.new_spell("Bless", 1, CastingSchool::Divine).unwrap().id;
        assert_eq!(bless, SpellId(1));
        assert!(matches!(
            party.register_spell(Spell::new(bless, "Bless Again", 1, CastingSchool::Divine)),
            Err(PartyError::DuplicateId { .. })
        ));
        assert_eq!(
            party.register_spell(Spell::new(SpellId(10), "Sleep", 1, CastingSchool::Arcane)),
            Ok(SpellId(10))
        );
        assert_eq!(
            party.new_spell("Light", 1, CastingSchool::Arcane).unwrap().id,
            SpellId(11)
        );
    }

    #[test]
    fn test_new_spell_after_max_id_is_an_error() {
        let mut party = Party::new();
        party
            .register_spell(Spell::new(SpellId(u32::MAX), "Wish", 9, CastingSchool::Arcane))
            .unwrap();
        assert!(matches!(
            party.new_spell("Light", 1, CastingSchool::Arcane),
            Err(PartyError::InvalidState(_))
        ));
        assert_eq!(party.spells().count(), 1);
    }
}
