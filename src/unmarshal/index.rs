use crate::error::{ContractViolation, Error, Result};
use crate::model::{Model, ModelSchema};
use crate::types::DuplicatePolicy;
use std::collections::HashMap;

/// Identifier -> position in the destination collection.
///
/// Built once per call so each incoming record costs one lookup instead of
/// a scan over the destination.
#[derive(Debug, Default)]
pub struct IdIndex {
    positions: HashMap<String, usize>,
}

impl IdIndex {
    /// Index the identifiers already present in `records`
    pub fn build<M: Model>(
        schema: &ModelSchema,
        records: &[M],
        policy: DuplicatePolicy,
    ) -> Result<Self> {
        let mut index = IdIndex::default();
        let Some(id_field) = schema.identifier() else {
            return Ok(index);
        };

        for (position, record) in records.iter().enumerate() {
            let slot = record.slot(id_field.ident).ok_or(ContractViolation::MissingSlot {
                model: schema.type_name(),
                field: id_field.ident,
            })?;
            let Some(id) = slot.identifier() else {
                continue;
            };

            if index.positions.contains_key(&id) {
                match policy {
                    DuplicatePolicy::Reject => {
                        return Err(Error::DuplicateIdentifier {
                            model: schema.type_name(),
                            id,
                        });
                    }
                    DuplicatePolicy::FirstWins => {
                        log::warn!(
                            "{} '{}' appears more than once; merging into the first",
                            schema.type_name(),
                            id
                        );
                        continue;
                    }
                }
            }
            index.positions.insert(id, position);
        }

        Ok(index)
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Record a newly appended element; an existing entry is kept
    pub fn insert(&mut self, id: String, position: usize) {
        self.positions.entry(id).or_insert(position);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Tag {
        id: Option<i64>,
        label: String,
    }

    crate::impl_model!(Tag { id, label });

    #[derive(Debug, Default)]
    struct Draft {
        id: String,
    }

    crate::impl_model!(Draft { id });

    fn tag(id: Option<i64>) -> Tag {
        Tag {
            id,
            label: String::new(),
        }
    }

    #[test]
    fn test_indexes_identifiers() {
        let records = vec![tag(Some(3)), tag(None), tag(Some(9))];
        let index = IdIndex::build(Tag::schema().unwrap(), &records, DuplicatePolicy::Reject).unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("3"), Some(0));
        assert_eq!(index.get("9"), Some(2));
        assert_eq!(index.get("4"), None);
    }

    #[test]
    fn test_duplicates_rejected() {
        let records = vec![tag(Some(3)), tag(Some(3))];
        let err = IdIndex::build(Tag::schema().unwrap(), &records, DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier { ref id, .. } if id == "3"));
    }

    #[test]
    fn test_duplicates_first_wins() {
        let records = vec![tag(Some(1)), tag(Some(3)), tag(Some(3))];
        let index = IdIndex::build(Tag::schema().unwrap(), &records, DuplicatePolicy::FirstWins).unwrap();
        assert_eq!(index.get("3"), Some(1));
    }

    #[test]
    fn test_unset_identifiers_are_skipped() {
        let records = vec![Draft::default(), Draft { id: "a".into() }, Draft::default()];
        let index = IdIndex::build(Draft::schema().unwrap(), &records, DuplicatePolicy::Reject).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(""), None);

        // `Some(0)` is an explicit identifier
        let records = vec![tag(Some(0)), tag(Some(0))];
        let err = IdIndex::build(Tag::schema().unwrap(), &records, DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier { ref id, .. } if id == "0"));
    }
}
