//! Error types shared by every party operation.

use crate::world::CharacterId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of record an id refers to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Character,
    Item,
    Spell,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Character => "character",
            RecordKind::Item => "item",
            RecordKind::Spell => "spell",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Errors from party operations.
///
/// Every failure is a recoverable value. Mutating operations return the
/// first failing check and leave the party unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    /// An id did not resolve to a character, item, or spell.
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: u32 },

    /// A record with this id is already registered.
    #[error("{kind} {id} is already registered")]
    DuplicateId { kind: RecordKind, id: u32 },

    /// The target inventory has no free slot.
    #[error("inventory of character {character} is full ({capacity} items)")]
    CapacityExceeded {
        character: CharacterId,
        capacity: usize,
    },

    /// Wrong category, location, or holder for the requested operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A class, level, school, or slot-table restriction was broken.
    #[error("Rule violation: {0}")]
    RuleViolation(String),

    /// A field was out of range or not in its enumerated set.
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl PartyError {
    pub fn not_found(kind: RecordKind, id: impl Into<u32>) -> Self {
        PartyError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn duplicate(kind: RecordKind, id: impl Into<u32>) -> Self {
        PartyError::DuplicateId {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        PartyError::InvalidState(msg.into())
    }

    pub fn rule(msg: impl Into<String>) -> Self {
        PartyError::RuleViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        PartyError::Validation(msg.into())
    }

    /// True for `NotFound` errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PartyError::NotFound { .. })
    }

    /// True for `RuleViolation` errors.
    pub fn is_rule_violation(&self) -> bool {
        matches!(self, PartyError::RuleViolation(_))
    }
}

/// Result alias for party operations.
pub type PartyResult<T> = Result<T, PartyError>;
