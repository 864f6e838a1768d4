//! Model collections -> documents

use crate::error::{ContractViolation, Result};
use crate::model::{FieldRole, Model, ModelSchema};
use crate::naming::{pluralize, Naming};
use crate::types::{Config, Document};
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Writes `[M]` as a document the matching [`Unmarshaler`](crate::Unmarshaler) reads back
#[derive(Debug)]
pub struct Marshaler<M: Model> {
    schema: &'static ModelSchema,
    config: Config,
    naming: Naming,
    root_key: String,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Marshaler<M> {
    pub fn new(config: Config) -> Result<Self, ContractViolation> {
        let schema = M::schema()?;
        let naming = config.naming();
        let root_key = naming.root_key(schema.type_name());

        Ok(Marshaler {
            schema,
            config,
            naming,
            root_key,
            _model: PhantomData,
        })
    }

    pub fn marshal(&self, records: &[M]) -> Result<Document> {
        let objects = records
            .iter()
            .map(|record| self.marshal_record(record).map(Value::Object))
            .collect::<Result<Vec<_>>>()?;

        log::debug!("marshaled {} record(s) under '{}'", objects.len(), self.root_key);

        let mut document = Document::new();
        document.insert(self.root_key.clone(), Value::Array(objects));
        Ok(document)
    }

    pub fn marshal_to_json(&self, records: &[M]) -> Result<Vec<u8>> {
        let document = self.marshal(records)?;
        Ok(serde_json::to_vec(&document)?)
    }

    fn marshal_record(&self, record: &M) -> Result<Map<String, Value>> {
        let mut object = Map::new();
        let mut links = Map::new();

        for field in self.schema.fields() {
            let slot = record.slot(field.ident).ok_or(ContractViolation::MissingSlot {
                model: self.schema.type_name(),
                field: field.ident,
            })?;

            // Unset identifiers are left out; an empty `"id"` would read
            // back as a real one
            match &field.role {
                FieldRole::Identifier => {
                    if let Some(id) = slot.identifier() {
                        object.insert(self.config.id_key.clone(), Value::String(id));
                    }
                }
                FieldRole::ToOne { relation } => {
                    if let Some(id) = slot.identifier() {
                        links.insert(self.naming.jsonify(relation), Value::String(id));
                    }
                }
                FieldRole::ToMany { relation } => {
                    if let Some(ids) = slot.identifiers() {
                        let ids = ids.into_iter().map(Value::String).collect();
                        links.insert(pluralize(&self.naming.jsonify(relation)), Value::Array(ids));
                    }
                }
                FieldRole::Attribute => {
                    object.insert(self.naming.jsonify(&field.name), slot.to_value());
                }
            }
        }

        if !links.is_empty() {
            object.insert(self.config.links_key.clone(), Value::Object(links));
        }
        Ok(object)
    }
}
