//! Relationship links -> foreign-key fields

use crate::error::{ContractViolation, Error, Result};
use crate::model::{FieldDescriptor, FieldRole, Model, ModelSchema};
use crate::naming::{singularize, Naming};
use crate::types::json_type_name;
use serde_json::{Map, Value};

const TO_ONE_SUFFIX: &str = "ID";
const TO_MANY_SUFFIX: &str = "IDs";

/// Apply a links object to `target`.
///
/// A string sets the `<Relation>ID` field; an array of strings replaces the
/// `<Relation>IDs` field wholesale. Any other shape is an error.
pub fn resolve_links<M: Model>(
    schema: &ModelSchema,
    naming: &Naming,
    target: &mut M,
    links: &Map<String, Value>,
) -> Result<()> {
    for (relation, link) in links {
        match link {
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .map(|item| {
                        item.as_str().ok_or_else(|| Error::InvalidLink {
                            relation: relation.clone(),
                            found: json_type_name(item),
                        })
                    })
                    .collect::<Result<Vec<&str>>>()?;

                let field = relation_field(schema, naming, relation, TO_MANY_SUFFIX)?;
                log::trace!("{}.{} <- {} ids", schema.type_name(), field.name, ids.len());
                slot_mut(schema, target, field)?
                    .set_identifiers(&ids)
                    .map_err(|source| Error::InvalidField {
                        model: schema.type_name(),
                        field: field.name.clone(),
                        source,
                    })?;
            }
            Value::String(id) => {
                let field = relation_field(schema, naming, relation, TO_ONE_SUFFIX)?;
                log::trace!("{}.{} <- {}", schema.type_name(), field.name, id);
                slot_mut(schema, target, field)?
                    .set_identifier(id)
                    .map_err(|source| Error::InvalidField {
                        model: schema.type_name(),
                        field: field.name.clone(),
                        source,
                    })?;
            }
            other => {
                return Err(Error::InvalidLink {
                    relation: relation.clone(),
                    found: json_type_name(other),
                });
            }
        }
    }

    Ok(())
}

/// Field for `relation`: singular name first (`tags` -> `TagIDs`), then as written
fn relation_field<'s>(
    schema: &'s ModelSchema,
    naming: &Naming,
    relation: &str,
    suffix: &str,
) -> Result<&'s FieldDescriptor> {
    let singular = format!("{}{}", naming.dejsonify(&singularize(relation)), suffix);
    let literal = format!("{}{}", naming.dejsonify(relation), suffix);

    let foreign_key = |name: &str| {
        schema.field(name).filter(|field| match field.role {
            FieldRole::ToOne { .. } => suffix == TO_ONE_SUFFIX,
            FieldRole::ToMany { .. } => suffix == TO_MANY_SUFFIX,
            FieldRole::Identifier | FieldRole::Attribute => false,
        })
    };

    foreign_key(&singular)
        .or_else(|| foreign_key(&literal))
        .ok_or(Error::RelationFieldNotFound {
            model: schema.type_name(),
            field: singular,
        })
}

fn slot_mut<'m, M: Model>(
    schema: &ModelSchema,
    target: &'m mut M,
    field: &FieldDescriptor,
) -> Result<&'m mut dyn crate::model::Slot> {
    target.slot_mut(field.ident).ok_or_else(|| {
        ContractViolation::MissingSlot {
            model: schema.type_name(),
            field: field.ident,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlotError;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Post {
        id: String,
        author_id: u64,
        tag_ids: Vec<String>,
        reviewer_ids: Option<Vec<u32>>,
        editor_ids: String,
        title: String,
    }

    crate::impl_model!(Post { id, author_id, tag_ids, reviewer_ids, editor_ids, title });

    fn resolve(post: &mut Post, links: Value) -> Result<()> {
        let Value::Object(links) = links else {
            panic!("links fixture must be an object");
        };
        resolve_links(Post::schema().unwrap(), &Naming::default(), post, &links)
    }

    #[test]
    fn test_to_one_and_to_many() {
        let mut post = Post::default();
        resolve(
            &mut post,
            json!({"author": "17", "tags": ["a", "b"], "reviewers": ["4"]}),
        )
        .unwrap();

        assert_eq!(post.author_id, 17);
        assert_eq!(post.tag_ids, vec!["a", "b"]);
        assert_eq!(post.reviewer_ids, Some(vec![4]));
    }

    #[test]
    fn test_to_many_replaces() {
        let mut post = Post {
            tag_ids: vec!["1".into(), "2".into()],
            ..Post::default()
        };
        resolve(&mut post, json!({"tags": ["3"]})).unwrap();
        assert_eq!(post.tag_ids, vec!["3"]);

        resolve(&mut post, json!({"tags": []})).unwrap();
        assert!(post.tag_ids.is_empty());
    }

    #[test]
    fn test_unknown_relation() {
        let mut post = Post::default();
        let err = resolve(&mut post, json!({"editor": "1"})).unwrap_err();
        assert!(matches!(
            err,
            Error::RelationFieldNotFound { model: "Post", ref field } if field == "EditorID"
        ));
    }

    #[test]
    fn test_bad_link_shapes() {
        let mut post = Post::default();
        assert!(matches!(
            resolve(&mut post, json!({"author": 17})),
            Err(Error::InvalidLink { found: "number", .. })
        ));
        assert!(matches!(
            resolve(&mut post, json!({"tags": ["1", null]})),
            Err(Error::InvalidLink { found: "null", .. })
        ));
    }

    #[test]
    fn test_array_link_to_scalar_field() {
        let mut post = Post::default();
        let err = resolve(&mut post, json!({"title": ["x"]})).unwrap_err();
        assert!(matches!(err, Error::RelationFieldNotFound { .. }));

        let err = resolve(&mut post, json!({"author": ["1"]})).unwrap_err();
        assert!(matches!(err, Error::RelationFieldNotFound { .. }));
    }

    #[test]
    fn test_invalid_foreign_key() {
        let mut post = Post::default();
        let err = resolve(&mut post, json!({"author": "seventeen"})).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidField { source: SlotError::InvalidIdentifier { .. }, .. }
        ));

        let err = resolve(&mut post, json!({"reviewers": ["x"]})).unwrap_err();
        assert!(matches!(err, Error::InvalidField { .. }));
    }

    #[test]
    fn test_foreign_key_field_must_hold_identifiers() {
        // `editor_ids: String` is a plain attribute, not a to-many field
        let mut post = Post::default();
        let err = resolve(&mut post, json!({"editors": ["1"]})).unwrap_err();
        assert!(matches!(
            err,
            Error::RelationFieldNotFound { model: "Post", ref field } if field == "EditorIDs"
        ));
        assert!(post.editor_ids.is_empty());
    }
}
