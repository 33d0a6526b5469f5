//! Inventory and equipment engine.
//!
//! Items move between characters and the bucket locations (party pool,
//! storage, limbo). Whenever an item leaves a character it is detached
//! there: removed from the inventory list and cleared from any equip slot
//! that referenced it.

use crate::error::{PartyError, PartyResult};
use crate::items::{ItemCategory, ItemLocation};
use crate::party::Party;
use crate::world::{CharacterId, ItemId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl Party {
    // =========================================================================
    // Movement
    // =========================================================================

    /// Give an item to a character.
    ///
    /// Does nothing if the character already holds it. If another character
    /// holds it, it is detached from them first.
    pub fn move_item_to_character(
        &mut self,
        item_id: ItemId,
        character_id: CharacterId,
    ) -> PartyResult<()> {
        let location = self.items.find(item_id)?.location;
        let capacity = self.config().inventory_capacity;
        let target = self.find_character(character_id)?;
        if target.holds(item_id) {
            return Ok(());
        }
        if target.inventory.len() >= capacity {
            return Err(PartyError::CapacityExceeded {
                character: character_id,
                capacity,
            });
        }

        if let ItemLocation::Character(previous) = location {
            if previous != character_id {
                self.detach_from_holder(item_id, previous);
            }
        }

        self.items.find_mut(item_id)?.location = ItemLocation::Character(character_id);
        self.character_mut(character_id)?.inventory.push(item_id);
        debug!(item_id = %item_id, character_id = %character_id, "Item moved to character");

        self.validate_character_inventory(character_id)
    }

    /// Move an item to the party pool, storage, or limbo.
    pub fn move_item_to_bucket(&mut self, item_id: ItemId, bucket: ItemLocation) -> PartyResult<()> {
        check_bucket(bucket)?;
        let location = self.items.find(item_id)?.location;
        if let ItemLocation::Character(holder) = location {
            self.detach_from_holder(item_id, holder);
        }
        self.items.find_mut(item_id)?.location = bucket;
        debug!(item_id = %item_id, location = %bucket, "Item moved to bucket");
        Ok(())
    }

    pub fn move_item_to_party(&mut self, item_id: ItemId) -> PartyResult<()> {
        self.move_item_to_bucket(item_id, ItemLocation::PartyPool)
    }

    pub fn move_item_to_storage(&mut self, item_id: ItemId) -> PartyResult<()> {
        self.move_item_to_bucket(item_id, ItemLocation::Storage)
    }

    pub fn move_item_to_limbo(&mut self, item_id: ItemId) -> PartyResult<()> {
        self.move_item_to_bucket(item_id, ItemLocation::Limbo)
    }

    /// Move everything a character carries to a bucket and empty both
    /// equip slots.
    ///
    /// Every item is resolved before the first one moves, so a dangling id
    /// fails the whole call with nothing moved.
    pub fn move_all_from_character(
        &mut self,
        character_id: CharacterId,
        bucket: ItemLocation,
    ) -> PartyResult<()> {
        check_bucket(bucket)?;
        let snapshot = self.find_character(character_id)?.inventory.clone();
        for item_id in &snapshot {
            self.items.find(*item_id)?;
        }

        for item_id in &snapshot {
            self.move_item_to_bucket(*item_id, bucket)?;
        }

        let character = self.character_mut(character_id)?;
        character.inventory.clear();
        character.armor = None;
        character.shield = None;
        debug!(
            character_id = %character_id,
            location = %bucket,
            count = snapshot.len(),
            "Moved all items from character"
        );
        Ok(())
    }

    /// Remove an item from the world entirely.
    pub fn delete_item(&mut self, item_id: ItemId) -> PartyResult<()> {
        let location = self.items.find(item_id)?.location;
        if let ItemLocation::Character(holder) = location {
            self.detach_from_holder(item_id, holder);
        }
        self.items.unregister(item_id);
        info!(item_id = %item_id, "Item deleted");
        Ok(())
    }

    /// Drop an item from its holder's inventory and equip slots. The item's
    /// own location is left for the caller to set.
    fn detach_from_holder(&mut self, item_id: ItemId, holder: CharacterId) {
        match self.character_mut(holder) {
            Ok(character) => {
                character.detach(item_id);
            }
            Err(_) => {
                warn!(
                    item_id = %item_id,
                    character_id = %holder,
                    "Item claimed by missing character"
                );
            }
        }
    }

    // =========================================================================
    // Equipment
    // =========================================================================

    /// Equip a piece of armor the character is carrying.
    pub fn equip_armor(&mut self, character_id: CharacterId, item_id: ItemId) -> PartyResult<()> {
        let character = self.find_character(character_id)?;
        let item = self.items.find(item_id)?;
        if item.holder() != Some(character_id) {
            return Err(PartyError::invalid_state(format!(
                "item {item_id} is not carried by character {character_id}"
            )));
        }
        let Some(armor) = item.as_armor() else {
            return Err(PartyError::invalid_state(format!("item {item_id} is not armor")));
        };
        if !character.holds(item_id) {
            return Err(PartyError::invalid_state(format!(
                "item {item_id} is not in the inventory of character {character_id}"
            )));
        }
        if let Some(class) = character.class {
            if !class.may_wear(armor.armor_type) {
                return Err(PartyError::rule(format!(
                    "{class} cannot wear {}",
                    armor.armor_type
                )));
            }
        }

        self.character_mut(character_id)?.armor = Some(item_id);
        debug!(item_id = %item_id, character_id = %character_id, "Armor equipped");
        Ok(())
    }

    /// Equip a shield the character is carrying.
    pub fn equip_shield(&mut self, character_id: CharacterId, item_id: ItemId) -> PartyResult<()> {
        let character = self.find_character(character_id)?;
        let item = self.items.find(item_id)?;
        if item.holder() != Some(character_id) {
            return Err(PartyError::invalid_state(format!(
                "item {item_id} is not carried by character {character_id}"
            )));
        }
        if item.category() != ItemCategory::Shield {
            return Err(PartyError::invalid_state(format!(
                "item {item_id} is not a shield"
            )));
        }
        if !character.holds(item_id) {
            return Err(PartyError::invalid_state(format!(
                "item {item_id} is not in the inventory of character {character_id}"
            )));
        }
        if let Some(class) = character.class {
            if !class.may_use_shield() {
                return Err(PartyError::rule(format!("{class} cannot equip shield")));
            }
        }

        self.character_mut(character_id)?.shield = Some(item_id);
        debug!(item_id = %item_id, character_id = %character_id, "Shield equipped");
        Ok(())
    }

    /// Clear the armor slot. The item stays in the inventory.
    pub fn unequip_armor(&mut self, character_id: CharacterId) -> PartyResult<()> {
        self.character_mut(character_id)?.armor = None;
        debug!(character_id = %character_id, "Armor unequipped");
        Ok(())
    }

    /// Clear the shield slot. The item stays in the inventory.
    pub fn unequip_shield(&mut self, character_id: CharacterId) -> PartyResult<()> {
        self.character_mut(character_id)?.shield = None;
        debug!(character_id = %character_id, "Shield unequipped");
        Ok(())
    }

    // =========================================================================
    // Validation and reporting
    // =========================================================================

    /// Check a character's inventory: capacity, no duplicates, every id
    /// resolves and points back at the character, and both equip slots name
    /// carried items of the right category.
    ///
    /// Reports the first violation found; it does not repair anything.
    pub fn validate_character_inventory(&self, character_id: CharacterId) -> PartyResult<()> {
        let character = self.find_character(character_id)?;
        let capacity = self.config().inventory_capacity;
        if character.inventory.len() > capacity {
            return Err(PartyError::CapacityExceeded {
                character: character_id,
                capacity,
            });
        }

        let mut seen = HashSet::with_capacity(character.inventory.len());
        for item_id in &character.inventory {
            let item = self.items.find(*item_id).map_err(|_| {
                PartyError::invalid_state(format!("unknown item id {item_id} in inventory"))
            })?;
            if !seen.insert(*item_id) {
                return Err(PartyError::invalid_state(format!(
                    "duplicate item id {item_id} in inventory"
                )));
            }
            if item.holder() != Some(character_id) {
                return Err(PartyError::invalid_state(format!(
                    "item {item_id} is in the inventory but located at {}",
                    item.location
                )));
            }
        }

        let slots = [
            ("armor", character.armor, ItemCategory::Armor),
            ("shield", character.shield, ItemCategory::Shield),
        ];
        for (slot, equipped, category) in slots {
            let Some(item_id) = equipped else { continue };
            let matches = self
                .items
                .find(item_id)
                .map(|item| item.category() == category)
                .unwrap_or(false);
            if !character.holds(item_id) || !matches {
                return Err(PartyError::invalid_state(format!(
                    "{slot} id {item_id} invalid or not {category}"
                )));
            }
        }
        Ok(())
    }

    /// Human-readable listing of a character's inventory, marking equipped
    /// armor and shield.
    pub fn dump_inventory(&self, character_id: CharacterId) -> PartyResult<String> {
        let character = self.find_character(character_id)?;

        let mut out = format!("Inventory for {} (ID {}):\n", character.name, character.id);

        if character.inventory.is_empty() {
            out.push_str("  (no items)\n");
            return Ok(out);
        }

        for item_id in &character.inventory {
            let Ok(item) = self.items.find(*item_id) else {
                out.push_str(&format!("  [Missing item ID {item_id}]\n"));
                continue;
            };
            let marker = if character.armor == Some(*item_id) {
                " (equipped armor)"
            } else if character.shield == Some(*item_id) {
                " (equipped shield)"
            } else {
                ""
            };
            out.push_str(&format!("  - {} [{}]{marker}\n", item.name, item.category()));
        }
        Ok(out)
    }
}

fn check_bucket(location: ItemLocation) -> PartyResult<()> {
    if !location.is_bucket() {
        return Err(PartyError::invalid_state(format!(
            "invalid target location for bucket move: {location}"
        )));
    }
    Ok(())
}
