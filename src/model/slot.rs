//! Typed assignment of decoded values into struct fields
//!
//! Every supported field type implements [`Slot`]. The engine only ever sees
//! `&mut dyn Slot`, so the field's declared type decides which JSON shapes it
//! accepts.

use crate::error::SlotError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Kind of a field, as seen by the assignment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Sequence,
    Optional,
    Json,
}

impl FieldKind {
    pub fn to_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Sequence => "sequence",
            FieldKind::Optional => "optional",
            FieldKind::Json => "json",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A settable struct field
pub trait Slot {
    fn kind(&self) -> FieldKind;

    /// Store a decoded attribute value
    fn assign(&mut self, value: &Value) -> Result<(), SlotError>;

    /// Current value, as it would appear in a document
    fn to_value(&self) -> Value;

    /// Store an identifier given in string form
    fn set_identifier(&mut self, _id: &str) -> Result<(), SlotError> {
        Err(SlotError::UnsupportedIdentifier(self.kind()))
    }

    /// Current value in identifier form, whether or not it was ever assigned
    fn id_text(&self) -> Option<String> {
        None
    }

    /// Current identifier, if one is set.
    ///
    /// A bare `String` or integer still holding its default (`""`, `0`)
    /// has none; wrap the field in `Option` when those are real identifiers.
    fn identifier(&self) -> Option<String> {
        self.id_text()
    }

    /// Replace the field with a list of identifiers
    fn set_identifiers(&mut self, _ids: &[&str]) -> Result<(), SlotError> {
        Err(SlotError::NotASequence(self.kind()))
    }

    /// Current identifiers in string form, if this field holds a list of them
    fn identifiers(&self) -> Option<Vec<String>> {
        None
    }
}

impl Slot for String {
    fn kind(&self) -> FieldKind {
        FieldKind::String
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        match value {
            Value::String(s) => {
                self.clone_from(s);
                Ok(())
            }
            other => Err(SlotError::mismatch(FieldKind::String, other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn set_identifier(&mut self, id: &str) -> Result<(), SlotError> {
        self.clear();
        self.push_str(id);
        Ok(())
    }

    fn id_text(&self) -> Option<String> {
        Some(self.clone())
    }

    fn identifier(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.clone())
    }
}

macro_rules! integer_slot {
    ($($ty:ty),*) => {$(
        impl Slot for $ty {
            fn kind(&self) -> FieldKind {
                FieldKind::Integer
            }

            fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
                let Value::Number(n) = value else {
                    return Err(SlotError::mismatch(FieldKind::Integer, value));
                };

                // Only exact fits; floats and out-of-range numbers are rejected
                let fitted = if let Some(i) = n.as_i64() {
                    <$ty>::try_from(i).ok()
                } else if let Some(u) = n.as_u64() {
                    <$ty>::try_from(u).ok()
                } else {
                    None
                };

                *self = fitted.ok_or_else(|| SlotError::mismatch(FieldKind::Integer, value))?;
                Ok(())
            }

            fn to_value(&self) -> Value {
                Value::from(*self)
            }

            fn set_identifier(&mut self, id: &str) -> Result<(), SlotError> {
                *self = id.parse::<$ty>().map_err(|e| SlotError::InvalidIdentifier {
                    value: id.to_string(),
                    reason: e.to_string(),
                })?;
                Ok(())
            }

            fn id_text(&self) -> Option<String> {
                Some(self.to_string())
            }

            fn identifier(&self) -> Option<String> {
                (*self != 0).then(|| self.to_string())
            }
        }
    )*};
}

integer_slot!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Slot for f64 {
    fn kind(&self) -> FieldKind {
        FieldKind::Float
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        match value.as_f64() {
            Some(f) if value.is_number() => {
                *self = f;
                Ok(())
            }
            _ => Err(SlotError::mismatch(FieldKind::Float, value)),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

impl Slot for bool {
    fn kind(&self) -> FieldKind {
        FieldKind::Boolean
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        match value {
            Value::Bool(b) => {
                *self = *b;
                Ok(())
            }
            other => Err(SlotError::mismatch(FieldKind::Boolean, other)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Slot for Value {
    fn kind(&self) -> FieldKind {
        FieldKind::Json
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        self.clone_from(value);
        Ok(())
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: Slot + Default> Slot for Option<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Optional
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.assign(value)?;
        *self = Some(inner);
        Ok(())
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Slot::to_value)
    }

    fn set_identifier(&mut self, id: &str) -> Result<(), SlotError> {
        let mut inner = T::default();
        inner.set_identifier(id)?;
        *self = Some(inner);
        Ok(())
    }

    // `Some(0)` and `Some("")` were assigned explicitly, so they count
    fn id_text(&self) -> Option<String> {
        self.as_ref().and_then(Slot::id_text)
    }

    fn set_identifiers(&mut self, ids: &[&str]) -> Result<(), SlotError> {
        let mut inner = T::default();
        inner.set_identifiers(ids)?;
        *self = Some(inner);
        Ok(())
    }

    fn identifiers(&self) -> Option<Vec<String>> {
        self.as_ref().and_then(Slot::identifiers)
    }
}

impl<T: Slot + Default> Slot for Vec<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Sequence
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        let Value::Array(items) = value else {
            return Err(SlotError::mismatch(FieldKind::Sequence, value));
        };

        let mut built = Vec::with_capacity(items.len());
        for item in items {
            let mut element = T::default();
            element.assign(item)?;
            built.push(element);
        }
        *self = built;
        Ok(())
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Slot::to_value).collect())
    }

    fn set_identifiers(&mut self, ids: &[&str]) -> Result<(), SlotError> {
        let mut built = Vec::with_capacity(ids.len());
        for id in ids {
            let mut element = T::default();
            element.set_identifier(id)?;
            built.push(element);
        }
        *self = built;
        Ok(())
    }

    fn identifiers(&self) -> Option<Vec<String>> {
        self.iter().map(Slot::id_text).collect()
    }
}

/// Field wrapper for nested structured values decoded with serde
///
/// ```rust
/// use jsonapi_merge::Json;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
/// struct Address {
///     city: String,
/// }
///
/// let address: Json<Address> = Json(Address { city: "Oslo".into() });
/// assert_eq!(address.city, "Oslo");
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Serialize + DeserializeOwned> Slot for Json<T> {
    fn kind(&self) -> FieldKind {
        FieldKind::Json
    }

    fn assign(&mut self, value: &Value) -> Result<(), SlotError> {
        self.0 = T::deserialize(value).map_err(|e| SlotError::Nested(e.to_string()))?;
        Ok(())
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(&self.0).unwrap_or(Value::Null)
    }
}
