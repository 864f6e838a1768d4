//! Model descriptors: the typed view of a struct the mapping engine works on
//!
//! A model is a plain struct whose fields implement [`Slot`]. The
//! [`impl_model!`](crate::impl_model) macro lists the fields that take part
//! in mapping; field roles follow from their names:
//!
//! - `id` is the identifier matched against a record's `"id"`
//! - `<relation>_id` is a to-one foreign key (`"links": {"<relation>": "7"}`)
//! - `<relation>_ids` is a to-many foreign key (`"links": {"<relations>": ["7", "8"]}`)
//! - anything else is an attribute
//!
//! ```rust
//! use jsonapi_merge::{impl_model, Model};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! pub struct Article {
//!     pub id: String,
//!     pub title: String,
//!     pub author_id: Option<u64>,
//!     pub tag_ids: Vec<String>,
//! }
//!
//! impl_model!(Article { id, title, author_id, tag_ids });
//!
//! assert_eq!(Article::TYPE_NAME, "Article");
//! ```

pub mod schema;
pub mod slot;

pub use schema::{FieldDescriptor, FieldRole, ModelSchema};
pub use slot::{FieldKind, Json, Slot};

use crate::error::ContractViolation;

/// A struct that documents can be mapped onto
pub trait Model: Default + 'static {
    /// Struct name, used to derive the document's collection key
    const TYPE_NAME: &'static str;

    /// Rust identifiers of the mapped fields, in declaration order
    const FIELDS: &'static [&'static str];

    fn slot(&self, field: &str) -> Option<&dyn Slot>;

    fn slot_mut(&mut self, field: &str) -> Option<&mut dyn Slot>;

    /// Cached, validated field layout of this type
    fn schema() -> Result<&'static ModelSchema, ContractViolation> {
        ModelSchema::of::<Self>()
    }
}

/// Implement [`Model`] for a struct by listing its mapped fields.
///
/// Fields left out of the list are invisible to documents: an attribute key
/// naming one of them is rejected like any unknown key.
#[macro_export]
macro_rules! impl_model {
    ($model:ident { $($field:ident),* $(,)? }) => {
        impl $crate::Model for $model {
            const TYPE_NAME: &'static str = stringify!($model);
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),*];

            fn slot(&self, field: &str) -> Option<&dyn $crate::Slot> {
                match field {
                    $(stringify!($field) => Some(&self.$field as &dyn $crate::Slot),)*
                    _ => None,
                }
            }

            fn slot_mut(&mut self, field: &str) -> Option<&mut dyn $crate::Slot> {
                match field {
                    $(stringify!($field) => Some(&mut self.$field as &mut dyn $crate::Slot),)*
                    _ => None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Comment {
        id: u32,
        body: String,
        post_id: String,
    }

    crate::impl_model!(Comment { id, body, post_id });

    #[derive(Debug, Default)]
    struct Broken {
        name: String,
    }

    impl Model for Broken {
        const TYPE_NAME: &'static str = "Broken";
        const FIELDS: &'static [&'static str] = &["name", "ghost"];

        fn slot(&self, field: &str) -> Option<&dyn Slot> {
            match field {
                "name" => Some(&self.name as &dyn Slot),
                _ => None,
            }
        }

        fn slot_mut(&mut self, field: &str) -> Option<&mut dyn Slot> {
            match field {
                "name" => Some(&mut self.name as &mut dyn Slot),
                _ => None,
            }
        }
    }

    #[test]
    fn test_generated_slots() {
        let mut comment = Comment::default();
        comment.slot_mut("body").unwrap().assign(&json!("hi")).unwrap();
        comment.slot_mut("id").unwrap().set_identifier("5").unwrap();
        comment.slot_mut("post_id").unwrap().set_identifier("p1").unwrap();

        assert_eq!(comment.body, "hi");
        assert_eq!(comment.id, 5);
        assert_eq!(comment.post_id, "p1");
        assert!(comment.slot("missing").is_none());
    }

    #[test]
    fn test_schema_is_cached() {
        let first = Comment::schema().unwrap();
        let second = Comment::schema().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.type_name(), "Comment");
        assert_eq!(first.fields().len(), 3);
    }

    #[test]
    fn test_missing_slot_is_contract_violation() {
        assert_eq!(
            Broken::schema().unwrap_err(),
            ContractViolation::MissingSlot {
                model: "Broken",
                field: "ghost",
            }
        );
    }
}
