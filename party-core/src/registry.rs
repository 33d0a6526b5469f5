//! Id-keyed record stores.
//!
//! A [`Registry`] owns every record of one type, hands out sequential ids,
//! and rejects duplicate registration. Items and spells each get one.

use crate::error::{PartyError, PartyResult, RecordKind};
use crate::items::Item;
use crate::world::{ItemId, Spell, SpellId};
use std::collections::BTreeMap;
use std::fmt;

/// A record that can live in a [`Registry`].
pub trait Record {
    type Id: Copy + Ord + From<u32> + Into<u32> + fmt::Display;

    /// Used in `NotFound` and `DuplicateId` errors.
    const KIND: RecordKind;

    fn id(&self) -> Self::Id;
}

impl Record for Item {
    type Id = ItemId;
    const KIND: RecordKind = RecordKind::Item;

    fn id(&self) -> ItemId {
        self.id
    }
}

impl Record for Spell {
    type Id = SpellId;
    const KIND: RecordKind = RecordKind::Spell;

    fn id(&self) -> SpellId {
        self.id
    }
}

/// Store of records keyed by id, with a monotonic id allocator.
///
/// Ids are never reused. Registering a record with an explicit id moves the
/// allocator past it, so later allocations cannot collide. Once `u32::MAX`
/// has been handed out or registered, allocation fails.
#[derive(Debug, Clone)]
pub struct Registry<T: Record> {
    records: BTreeMap<T::Id, T>,
    next_id: u64,
}

impl<T: Record> Registry<T> {
    /// Create an empty registry whose first allocated id is 1.
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Reserve the next sequential id.
    pub fn allocate_id(&mut self) -> PartyResult<T::Id> {
        let id = u32::try_from(self.next_id).map_err(|_| {
            PartyError::invalid_state(format!("{} id space exhausted", T::KIND))
        })?;
        self.next_id += 1;
        Ok(T::Id::from(id))
    }

    /// Add a record. Fails if its id is already registered.
    pub fn register(&mut self, record: T) -> PartyResult<T::Id> {
        let id = record.id();
        if self.records.contains_key(&id) {
            return Err(PartyError::duplicate(T::KIND, id));
        }
        let raw: u32 = id.into();
        self.next_id = self.next_id.max(u64::from(raw) + 1);
        self.records.insert(id, record);
        Ok(id)
    }

    /// Remove a record if present. Never fails.
    pub fn unregister(&mut self, id: T::Id) -> Option<T> {
        self.records.remove(&id)
    }

    pub fn find(&self, id: T::Id) -> PartyResult<&T> {
        self.records
            .get(&id)
            .ok_or_else(|| PartyError::not_found(T::KIND, id))
    }

    pub fn find_mut(&mut self, id: T::Id) -> PartyResult<&mut T> {
        self.records
            .get_mut(&id)
            .ok_or_else(|| PartyError::not_found(T::KIND, id))
    }

    /// All records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Record> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemKind, ShieldStats};
    use crate::world::CastingSchool;

    #[test]
    fn test_sequential_ids() {
        let mut spells: Registry<Spell> = Registry::new();
        assert_eq!(spells.allocate_id(), Ok(SpellId(1)));
        assert_eq!(spells.allocate_id(), Ok(SpellId(2)));
        assert!(spells.is_empty());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut spells: Registry<Spell> = Registry::new();
        let bless = Spell::new(SpellId(1), "Bless", 1, CastingSchool::Divine);
        assert_eq!(spells.register(bless.clone()), Ok(SpellId(1)));
        assert_eq!(
            spells.register(bless),
            Err(PartyError::DuplicateId {
                kind: RecordKind::Spell,
                id: 1
            })
        );
    }

    #[test]
    fn test_register_advances_allocator() {
        let mut items: Registry<Item> = Registry::new();
        items
            .register(Item::new(ItemId(7), "Shield", ItemKind::Shield(ShieldStats { bonus: 0 })))
            .unwrap();
        assert_eq!(items.allocate_id(), Ok(ItemId(8)));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut items: Registry<Item> = Registry::new();
        let id = items.allocate_id().unwrap();
        items.register(Item::new(id, "Rope", ItemKind::Generic)).unwrap();

        assert!(items.unregister(id).is_some());
        assert!(items.unregister(id).is_none());
        assert!(items.find(id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut items: Registry<Item> = Registry::new();
        let first = items.allocate_id().unwrap();
        items.register(Item::new(first, "Torch", ItemKind::Generic)).unwrap();
        items.unregister(first);
        assert_ne!(items.allocate_id(), Ok(first));
    }

    #[test]
    fn test_allocation_stops_at_max_id() {
        let mut spells: Registry<Spell> = Registry::new();
        spells
            .register(Spell::new(SpellId(u32::MAX), "Wish", 9, CastingSchool::Arcane))
            .unwrap();
        assert!(matches!(
            spells.allocate_id(),
            Err(PartyError::InvalidState(_))
        ));
        assert_eq!(spells.len(), 1);
    }
}
