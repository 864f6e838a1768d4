use crate::naming::{KeyConvention, Naming};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded document: the top-level JSON object of one exchange payload
pub type Document = Map<String, Value>;

/// What to do when the destination collection already holds two records
/// with the same identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail before touching the destination
    #[default]
    Reject,
    /// Merge into the first matching record and ignore the rest
    FirstWins,
}

/// Configuration shared by the unmarshaler and the marshaler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Casing convention of document keys
    pub convention: KeyConvention,

    /// Reserved key holding a record's identifier
    pub id_key: String,

    /// Reserved key holding a record's relationships
    pub links_key: String,

    /// Handling of duplicate identifiers in the destination
    pub duplicate_ids: DuplicatePolicy,
}

impl Config {
    pub fn naming(&self) -> Naming {
        Naming::new(self.convention)
    }

    pub fn with_convention(mut self, convention: KeyConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_duplicate_ids(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_ids = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            convention: KeyConvention::default(),
            id_key: String::from("id"),
            links_key: String::from("links"),
            duplicate_ids: DuplicatePolicy::default(),
        }
    }
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.id_key, "id");
        assert_eq!(config.links_key, "links");
        assert_eq!(config.convention, KeyConvention::SnakeCase);
        assert_eq!(config.duplicate_ids, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: Config = serde_json::from_value(json!({
            "convention": "camelCase",
            "duplicate_ids": "first_wins"
        }))
        .unwrap();

        assert_eq!(config.convention, KeyConvention::CamelCase);
        assert_eq!(config.duplicate_ids, DuplicatePolicy::FirstWins);
        assert_eq!(config.links_key, "links");
    }
}
