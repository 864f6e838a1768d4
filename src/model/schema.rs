//! Per-type field descriptors, derived once and cached

use crate::error::ContractViolation;
use crate::model::Model;
use crate::naming::normalize;
use heck::ToUpperCamelCase;
use once_cell::sync::Lazy;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

/// How a field takes part in mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    /// The record's identifier, filled from `"id"`
    Identifier,
    /// `<relation>_id`, filled from a single-string link
    ToOne { relation: String },
    /// `<relation>_ids`, filled from an array link
    ToMany { relation: String },
    /// Plain attribute
    Attribute,
}

/// One field of a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust field identifier, e.g. `tag_ids`
    pub ident: &'static str,

    /// Struct-style name, e.g. `TagIDs`
    pub name: String,

    pub role: FieldRole,
}

impl FieldDescriptor {
    fn from_ident(ident: &'static str) -> Self {
        let (name, role) = if normalize(ident) == "id" {
            (String::from("ID"), FieldRole::Identifier)
        } else if let Some(base) = ident.strip_suffix("_ids").filter(|b| !b.is_empty()) {
            let relation = base.to_upper_camel_case();
            (format!("{}IDs", relation), FieldRole::ToMany { relation })
        } else if let Some(base) = ident.strip_suffix("_id").filter(|b| !b.is_empty()) {
            let relation = base.to_upper_camel_case();
            (format!("{}ID", relation), FieldRole::ToOne { relation })
        } else {
            return FieldDescriptor::attribute(ident);
        };

        FieldDescriptor { ident, name, role }
    }

    fn attribute(ident: &'static str) -> Self {
        FieldDescriptor {
            ident,
            name: ident.to_upper_camel_case(),
            role: FieldRole::Attribute,
        }
    }
}

/// Field layout of one model type
#[derive(Debug, Clone)]
pub struct ModelSchema {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    lookup: HashMap<String, usize>,
    identifier: Option<usize>,
}

impl ModelSchema {
    /// Build and validate the descriptor for a type name and its fields.
    ///
    /// Roles come from the field names alone; [`ModelSchema::of`] also
    /// checks that foreign-key fields can hold identifiers.
    pub fn new(
        type_name: &'static str,
        idents: &[&'static str],
    ) -> Result<Self, ContractViolation> {
        let fields = idents.iter().map(|&ident| FieldDescriptor::from_ident(ident));
        Self::build(type_name, fields)
    }

    fn build(
        type_name: &'static str,
        descriptors: impl IntoIterator<Item = FieldDescriptor>,
    ) -> Result<Self, ContractViolation> {
        let valid_name = type_name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            && type_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(ContractViolation::InvalidTypeName { name: type_name });
        }

        let mut fields: Vec<FieldDescriptor> = Vec::new();
        let mut lookup = HashMap::new();
        let mut seen = HashMap::new();
        let mut identifier = None;

        for (index, field) in descriptors.into_iter().enumerate() {
            // Names differing only in case or separators are ambiguous in documents
            if let Some(&previous) = seen.get(&normalize(&field.name)) {
                let previous: &FieldDescriptor = &fields[previous];
                return Err(ContractViolation::ClashingFields {
                    model: type_name,
                    first: previous.ident,
                    second: field.ident,
                });
            }

            if field.role == FieldRole::Identifier {
                identifier = Some(index);
            }
            seen.insert(normalize(&field.name), index);
            lookup.insert(field.name.clone(), index);
            fields.push(field);
        }

        Ok(ModelSchema {
            type_name,
            fields,
            lookup,
            identifier,
        })
    }

    /// Descriptor for `M`, checked against the model's slots
    pub fn of<M: Model>() -> Result<&'static ModelSchema, ContractViolation> {
        let type_id = TypeId::of::<M>();

        if let Some(schema) = registry_read(type_id) {
            return Ok(schema);
        }

        let mut scratch = M::default();
        let mut descriptors = Vec::with_capacity(M::FIELDS.len());
        for &ident in M::FIELDS {
            let missing = ContractViolation::MissingSlot {
                model: M::TYPE_NAME,
                field: ident,
            };
            if scratch.slot(ident).is_none() {
                return Err(missing);
            }
            let slot = scratch.slot_mut(ident).ok_or(missing)?;

            // `<name>_id` / `<name>_ids` fields that cannot hold identifiers are attributes
            let field = FieldDescriptor::from_ident(ident);
            let holds_ids = match field.role {
                FieldRole::ToOne { .. } => slot.set_identifier("1").is_ok(),
                FieldRole::ToMany { .. } => slot.set_identifiers(&["1"]).is_ok(),
                FieldRole::Identifier | FieldRole::Attribute => true,
            };
            descriptors.push(if holds_ids {
                field
            } else {
                FieldDescriptor::attribute(ident)
            });
        }
        let schema = ModelSchema::build(M::TYPE_NAME, descriptors)?;

        let mut registry = REGISTRY.write().unwrap_or_else(|e| e.into_inner());
        let schema = *registry
            .entry(type_id)
            .or_insert_with(|| &*Box::leak(Box::new(schema)));
        Ok(schema)
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field with exactly the given struct-style name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.lookup.get(name).map(|&i| &self.fields[i])
    }

    pub fn identifier(&self) -> Option<&FieldDescriptor> {
        self.identifier.map(|i| &self.fields[i])
    }
}

static REGISTRY: Lazy<RwLock<HashMap<TypeId, &'static ModelSchema>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

fn registry_read(type_id: TypeId) -> Option<&'static ModelSchema> {
    let registry = REGISTRY.read().unwrap_or_else(|e| e.into_inner());
    registry.get(&type_id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_from_idents() {
        let schema = ModelSchema::new(
            "Article",
            &["id", "title", "author_id", "tag_ids", "first_name"],
        )
        .unwrap();

        assert_eq!(schema.identifier().unwrap().ident, "id");
        assert_eq!(schema.field("Title").unwrap().role, FieldRole::Attribute);
        assert_eq!(schema.field("FirstName").unwrap().ident, "first_name");

        let author = schema.field("AuthorID").unwrap();
        assert_eq!(author.role, FieldRole::ToOne { relation: "Author".into() });

        let tags = schema.field("TagIDs").unwrap();
        assert_eq!(tags.name, "TagIDs");
        assert_eq!(tags.role, FieldRole::ToMany { relation: "Tag".into() });

        assert!(schema.field("TagIds").is_none());
        assert!(schema.field("TITLE").is_none());
        assert!(schema.field("Missing").is_none());
    }

    #[test]
    fn test_clashing_fields_rejected() {
        let err = ModelSchema::new("Thing", &["tag_ids", "tagids"]).unwrap_err();
        assert_eq!(
            err,
            ContractViolation::ClashingFields {
                model: "Thing",
                first: "tag_ids",
                second: "tagids",
            }
        );
    }

    #[test]
    fn test_invalid_type_name_rejected() {
        assert!(matches!(
            ModelSchema::new("", &["id"]),
            Err(ContractViolation::InvalidTypeName { .. })
        ));
        assert!(matches!(
            ModelSchema::new("Vec<Article>", &["id"]),
            Err(ContractViolation::InvalidTypeName { .. })
        ));
    }

    #[derive(Debug, Default)]
    struct Ledger {
        id: u32,
        account_id: u64,
        audit_id: bool,
        entry_ids: Vec<String>,
        flag_ids: String,
    }

    crate::impl_model!(Ledger { id, account_id, audit_id, entry_ids, flag_ids });

    #[test]
    fn test_foreign_key_names_need_identifier_types() {
        let schema = Ledger::schema().unwrap();

        assert_eq!(
            schema.field("AccountID").unwrap().role,
            FieldRole::ToOne { relation: "Account".into() }
        );
        assert_eq!(
            schema.field("EntryIDs").unwrap().role,
            FieldRole::ToMany { relation: "Entry".into() }
        );

        assert!(schema.field("AuditID").is_none());
        assert_eq!(schema.field("AuditId").unwrap().role, FieldRole::Attribute);
        assert!(schema.field("FlagIDs").is_none());
        assert_eq!(schema.field("FlagIds").unwrap().ident, "flag_ids");
    }

    #[test]
    fn test_no_identifier_field() {
        let schema = ModelSchema::new("Note", &["body"]).unwrap();
        assert!(schema.identifier().is_none());
    }
}
