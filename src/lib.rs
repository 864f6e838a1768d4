//! # jsonapi-merge - JSON:API style documents onto typed model collections
//!
//! Maps decoded documents of the shape
//!
//! ```json
//! {"articles": [{"id": "1", "title": "Hello", "links": {"author": "9", "tags": ["2", "3"]}}]}
//! ```
//!
//! onto a caller-owned `Vec<Article>`, merging by identifier: a record whose
//! `"id"` matches an existing element updates it in place, every other record
//! is appended.
//!
//! ## Modules
//!
//! - **model**: the [`Model`] trait, [`impl_model!`] and the typed field slots
//! - **unmarshal**: documents -> collections, with relationship links
//! - **marshal**: collections -> documents
//! - **naming**: document key <-> struct name translation
//!
//! ## Quick Start
//!
//! ```rust
//! use jsonapi_merge::impl_model;
//! use serde_json::json;
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Article {
//!     id: String,
//!     title: String,
//!     author_id: Option<u64>,
//!     tag_ids: Vec<String>,
//! }
//!
//! impl_model!(Article { id, title, author_id, tag_ids });
//!
//! # fn main() -> Result<(), jsonapi_merge::Error> {
//! let mut articles = vec![Article { id: "1".into(), title: "Draft".into(), ..Default::default() }];
//!
//! let document = json!({
//!     "articles": [
//!         {"id": "1", "title": "Final", "links": {"tags": ["7"]}},
//!         {"title": "Brand new", "links": {"author": "3"}}
//!     ]
//! });
//! let document = document.as_object().cloned().unwrap_or_default();
//!
//! jsonapi_merge::unmarshal(&document, &mut articles)?;
//!
//! assert_eq!(articles.len(), 2);
//! assert_eq!(articles[0].title, "Final");
//! assert_eq!(articles[0].tag_ids, vec!["7"]);
//! assert_eq!(articles[1].author_id, Some(3));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod marshal;
pub mod model;
pub mod naming;
pub mod types;
pub mod unmarshal;

// Re-export commonly used types for convenience
pub use error::{ContractViolation, Error, Result, SlotError};
pub use marshal::Marshaler;
pub use model::{FieldKind, Json, Model, ModelSchema, Slot};
pub use naming::{KeyConvention, Naming};
pub use types::{Config, Document, DuplicatePolicy};
pub use unmarshal::Unmarshaler;

/// Merge `document` into `destination` using the default [`Config`]
pub fn unmarshal<M: Model>(document: &Document, destination: &mut Vec<M>) -> Result<()> {
    Unmarshaler::new(Config::default())?.unmarshal(document, destination)
}

/// Decode raw JSON and merge it into `destination` using the default [`Config`]
pub fn unmarshal_from_json<M: Model>(data: &[u8], destination: &mut Vec<M>) -> Result<()> {
    Unmarshaler::new(Config::default())?.unmarshal_from_json(data, destination)
}

/// Build a document from `records` using the default [`Config`]
pub fn marshal<M: Model>(records: &[M]) -> Result<Document> {
    Marshaler::new(Config::default())?.marshal(records)
}

/// Serialize `records` to JSON bytes using the default [`Config`]
pub fn marshal_to_json<M: Model>(records: &[M]) -> Result<Vec<u8>> {
    Marshaler::new(Config::default())?.marshal_to_json(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Widget {
        id: i32,
        label: String,
    }

    crate::impl_model!(Widget { id, label });

    #[test]
    fn test_basic_unmarshal() {
        let mut widgets: Vec<Widget> = Vec::new();
        unmarshal_from_json(
            br#"{"widgets": [{"id": "3", "label": "gear"}]}"#,
            &mut widgets,
        )
        .unwrap();

        assert_eq!(widgets, vec![Widget { id: 3, label: "gear".into() }]);
    }

    #[test]
    fn test_basic_marshal() {
        let document = marshal(&[Widget { id: 3, label: "gear".into() }]).unwrap();
        assert_eq!(
            Value::Object(document),
            json!({"widgets": [{"id": "3", "label": "gear"}]})
        );
    }
}
