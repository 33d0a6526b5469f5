//! Adventuring party engine.
//!
//! This crate provides:
//! - A party roster with sequential character ids
//! - One id-keyed store for every item category
//! - Inventory moves between characters and the party pool, storage, and limbo
//! - Armor and shield equip slots with class restrictions
//! - Known and memorized spellbooks bounded by a class/level slot table
//! - Validated sparse character patches
//!
//! # Quick Start
//!
//! ```
//! use party_core::{CharacterClass, CharacterPatch, ItemLocation, Party};
//! use party_core::items::ArmorType;
//!
//! let mut party = Party::new();
//! let hero = party.add_character("Thorin").id;
//! party
//!     .patch_character(hero, &CharacterPatch::new().class(CharacterClass::Dwarf).level(2))
//!     .unwrap();
//!
//! let mail = party
//!     .new_armor("Chain Mail", ArmorType::Chain, 0, ItemLocation::Character(hero))
//!     .unwrap()
//!     .id;
//! party.equip_armor(hero, mail).unwrap();
//!
//! println!("{}", party.dump_inventory(hero).unwrap());
//! ```

pub mod class_data;
pub mod config;
pub mod error;
pub mod inventory;
pub mod items;
pub mod party;
pub mod patch;
pub mod registry;
pub mod spellbook;
pub mod testing;
pub mod world;

// Primary public API
pub use class_data::{SpellSlotTable, STANDARD_SPELL_SLOTS};
pub use config::{ConfigError, PartyConfig, SpellRules};
pub use error::{PartyError, PartyResult, RecordKind};
pub use items::{Item, ItemCategory, ItemKind, ItemLocation};
pub use party::Party;
pub use patch::{apply_character_patch, validate_character_patch, CharacterPatch, ValidatedPatch};
pub use spellbook::SpellViolation;
pub use world::{
    Ability, Alignment, CastingSchool, Character, CharacterClass, CharacterId, ItemId, Spell,
    SpellId,
};
