//! Error types for record compilation.

use std::fmt;

use thiserror::Error;

/// Kind of fetched entity a record was compiled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Person,
    Group,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => f.write_str("person"),
            EntityKind::Group => f.write_str("group"),
        }
    }
}

/// A fetched entity could not be turned into a record.
///
/// Any of these aborts the whole compilation; no record set is produced.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed {entity} {id}: missing required field '{field}'")]
    MissingField {
        entity: EntityKind,
        id: u32,
        field: &'static str,
    },

    #[error("Malformed {entity} {id}: field '{field}' contains invalid character {character:?}")]
    InvalidField {
        entity: EntityKind,
        id: u32,
        field: &'static str,
        character: char,
    },

    /// Two entities of one category would share a name key.
    #[error("Duplicate {entity} name '{name}' on ids {first} and {second}")]
    DuplicateName {
        entity: EntityKind,
        name: String,
        first: u32,
        second: u32,
    },

    /// Two entities of one category would share an id key.
    #[error("Duplicate {entity} id {id}")]
    DuplicateId { entity: EntityKind, id: u32 },
}

impl RecordError {
    /// Check if this error is about a malformed entity.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            RecordError::MissingField { .. } | RecordError::InvalidField { .. }
        )
    }

    /// Id of the offending entity.
    pub fn entity_id(&self) -> u32 {
        match self {
            RecordError::MissingField { id, .. } | RecordError::InvalidField { id, .. } => *id,
            RecordError::DuplicateName { second, .. } => *second,
            RecordError::DuplicateId { id, .. } => *id,
        }
    }

    /// Name of the offending field, if the error is about a single field.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            RecordError::MissingField { field, .. } | RecordError::InvalidField { field, .. } => {
                Some(field)
            }
            RecordError::DuplicateName { .. } | RecordError::DuplicateId { .. } => None,
        }
    }
}

impl From<RecordError> for crate::Error {
    fn from(err: RecordError) -> Self {
        crate::Error::Record(err)
    }
}
