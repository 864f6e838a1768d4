use crate::model::FieldKind;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors returned while mapping documents onto model collections.
///
/// Apart from [`Error::Contract`], every variant describes a problem with the
/// document. Processing stops at the first one; records merged or appended
/// before it stay applied.
#[derive(Debug, Error)]
pub enum Error {
    /// The model type itself is unusable. Fix the call site or the model.
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("expected root document to include a '{key}' key")]
    MissingRootKey { key: String },

    #[error("expected an array under key '{key}', found {found}")]
    RootNotArray { key: String, found: &'static str },

    #[error("expected an array of objects under key '{key}', found {found}")]
    RecordNotObject { key: String, found: &'static str },

    #[error("expected '{key}' to be a string, found {found}")]
    IdNotString { key: String, found: &'static str },

    #[error("expected '{key}' to be an object, found {found}")]
    LinksNotObject { key: String, found: &'static str },

    #[error("expected string or array of strings for link '{relation}', found {found}")]
    InvalidLink { relation: String, found: &'static str },

    #[error("expected struct {model} to have field {field}")]
    FieldNotFound { model: &'static str, field: String },

    #[error("expected struct {model} to have relationship field {field}")]
    RelationFieldNotFound { model: &'static str, field: String },

    #[error("struct {model} has no identifier field")]
    MissingIdentifierField { model: &'static str },

    #[error("identifier '{id}' appears more than once in the {model} collection")]
    DuplicateIdentifier { model: &'static str, id: String },

    #[error("cannot assign {model}.{field}: {source}")]
    InvalidField {
        model: &'static str,
        field: String,
        #[source]
        source: SlotError,
    },
}

impl Error {
    /// Whether this is a programmer error rather than a bad document
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Error::Contract(_))
    }
}

/// A model type whose descriptor cannot be used for mapping
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("model type name {name:?} is not a valid struct name")]
    InvalidTypeName { name: &'static str },

    #[error("fields {first} and {second} of {model} resolve to the same name")]
    ClashingFields {
        model: &'static str,
        first: &'static str,
        second: &'static str,
    },

    #[error("field {field} of {model} is listed but has no slot")]
    MissingSlot {
        model: &'static str,
        field: &'static str,
    },
}

/// Failure to store a decoded value in one field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("expected {expected}, found {found}")]
    Mismatch {
        expected: FieldKind,
        found: &'static str,
    },

    #[error("nested value does not match: {0}")]
    Nested(String),

    #[error("invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    #[error("{0} fields cannot hold identifiers")]
    UnsupportedIdentifier(FieldKind),

    #[error("{0} fields cannot hold identifier lists")]
    NotASequence(FieldKind),
}

impl SlotError {
    pub(crate) fn mismatch(expected: FieldKind, found: &serde_json::Value) -> Self {
        SlotError::Mismatch {
            expected,
            found: crate::types::json_type_name(found),
        }
    }
}
