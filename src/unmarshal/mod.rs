//! Collection unmarshaling: documents -> typed model collections
//!
//! Each record object under the collection key either updates the existing
//! element with the same identifier in place or becomes a new element
//! appended to the destination.

pub mod index;
pub mod links;

pub use index::IdIndex;
pub use links::resolve_links;

use crate::error::{ContractViolation, Error, Result};
use crate::model::{FieldRole, Model, ModelSchema};
use crate::naming::Naming;
use crate::types::{json_type_name, Config, Document};
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Maps documents onto `Vec<M>`
#[derive(Debug)]
pub struct Unmarshaler<M: Model> {
    schema: &'static ModelSchema,
    config: Config,
    naming: Naming,
    root_key: String,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Unmarshaler<M> {
    /// Check the model's descriptor and prepare an unmarshaler.
    ///
    /// Fails only when `M` itself is unusable.
    pub fn new(config: Config) -> Result<Self, ContractViolation> {
        let schema = M::schema()?;
        let naming = config.naming();
        let root_key = naming.root_key(schema.type_name());

        Ok(Unmarshaler {
            schema,
            config,
            naming,
            root_key,
            _model: PhantomData,
        })
    }

    /// Collection key this unmarshaler reads, e.g. `articles`
    pub fn root_key(&self) -> &str {
        &self.root_key
    }

    /// Merge the records of `document` into `destination`.
    ///
    /// On error the destination keeps every change made before the failing
    /// record.
    pub fn unmarshal(&self, document: &Document, destination: &mut Vec<M>) -> Result<()> {
        let records = match document.get(&self.root_key) {
            None | Some(Value::Null) => {
                return Err(Error::MissingRootKey {
                    key: self.root_key.clone(),
                });
            }
            Some(Value::Array(records)) => records,
            Some(other) => {
                return Err(Error::RootNotArray {
                    key: self.root_key.clone(),
                    found: json_type_name(other),
                });
            }
        };

        log::debug!(
            "unmarshaling {} record(s) under '{}' into {} existing {}",
            records.len(),
            self.root_key,
            destination.len(),
            self.schema.type_name()
        );

        let mut index = IdIndex::build(self.schema, destination, self.config.duplicate_ids)?;

        for record in records {
            let Value::Object(record) = record else {
                return Err(Error::RecordNotObject {
                    key: self.root_key.clone(),
                    found: json_type_name(record),
                });
            };
            self.merge_record(record, &mut index, destination)?;
        }

        Ok(())
    }

    /// Decode `data` and merge it into `destination`.
    ///
    /// Decoder errors come back unchanged as [`Error::Json`].
    pub fn unmarshal_from_json(&self, data: &[u8], destination: &mut Vec<M>) -> Result<()> {
        let document: Document = serde_json::from_slice(data)?;
        self.unmarshal(&document, destination)
    }

    fn merge_record(
        &self,
        record: &Map<String, Value>,
        index: &mut IdIndex,
        destination: &mut Vec<M>,
    ) -> Result<()> {
        let id = match record.get(&self.config.id_key) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.as_str()),
            Some(other) => {
                return Err(Error::IdNotString {
                    key: self.config.id_key.clone(),
                    found: json_type_name(other),
                });
            }
        };

        // Match on the identifier as the field stores it: "07" and "7" are
        // the same integer id, "" and 0 are no id at all
        let id = match id {
            Some(id) => self.canonical_id(id)?,
            None => None,
        };

        if let Some(id) = &id {
            if let Some(position) = index.get(id) {
                log::trace!("merging record '{}' into position {}", id, position);
                return self.apply_record(record, &mut destination[position]);
            }
        }

        let mut fresh = M::default();
        self.apply_record(record, &mut fresh)?;

        log::trace!("appending new {} at position {}", self.schema.type_name(), destination.len());
        if let Some(stored) = self.stored_identifier(&fresh) {
            index.insert(stored, destination.len());
        }
        destination.push(fresh);
        Ok(())
    }

    fn canonical_id(&self, id: &str) -> Result<Option<String>> {
        let mut scratch = M::default();
        self.set_identifier(&mut scratch, id)?;
        Ok(self.stored_identifier(&scratch))
    }

    fn stored_identifier(&self, record: &M) -> Option<String> {
        let field = self.schema.identifier()?;
        record.slot(field.ident).and_then(|slot| slot.identifier())
    }

    fn apply_record(&self, record: &Map<String, Value>, target: &mut M) -> Result<()> {
        for (key, value) in record {
            if *key == self.config.links_key {
                let Value::Object(links) = value else {
                    return Err(Error::LinksNotObject {
                        key: key.clone(),
                        found: json_type_name(value),
                    });
                };
                resolve_links(self.schema, &self.naming, target, links)?;
            } else if *key == self.config.id_key {
                match value {
                    Value::Null => {}
                    Value::String(id) => self.set_identifier(target, id)?,
                    other => {
                        return Err(Error::IdNotString {
                            key: key.clone(),
                            found: json_type_name(other),
                        });
                    }
                }
            } else {
                self.set_attribute(target, key, value)?;
            }
        }

        Ok(())
    }

    fn set_identifier(&self, target: &mut M, id: &str) -> Result<()> {
        let field = self.schema.identifier().ok_or(Error::MissingIdentifierField {
            model: self.schema.type_name(),
        })?;

        self.slot_mut(target, field.ident)?
            .set_identifier(id)
            .map_err(|source| Error::InvalidField {
                model: self.schema.type_name(),
                field: field.name.clone(),
                source,
            })
    }

    fn set_attribute(&self, target: &mut M, key: &str, value: &Value) -> Result<()> {
        let name = self.naming.dejsonify(key);

        // Only the key `jsonify` produces for a field addresses it, so
        // `TITLE` or `t_i_t_l_e` do not alias `title`
        let field = self
            .schema
            .field(&name)
            .filter(|field| field.role != FieldRole::Identifier)
            .filter(|_| self.naming.jsonify(&name) == key);
        let Some(field) = field else {
            return Err(Error::FieldNotFound {
                model: self.schema.type_name(),
                field: name,
            });
        };

        self.slot_mut(target, field.ident)?
            .assign(value)
            .map_err(|source| Error::InvalidField {
                model: self.schema.type_name(),
                field: field.name.clone(),
                source,
            })
    }

    fn slot_mut<'m>(
        &self,
        target: &'m mut M,
        ident: &'static str,
    ) -> Result<&'m mut dyn crate::model::Slot> {
        target.slot_mut(ident).ok_or_else(|| {
            ContractViolation::MissingSlot {
                model: self.schema.type_name(),
                field: ident,
            }
            .into()
        })
    }
}
