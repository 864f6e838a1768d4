//! Name translation between document keys and struct-style names
//!
//! Struct-style names are `UpperCamelCase` (`BlogPost`, `FirstName`,
//! `TagIDs`). Document keys follow a [`KeyConvention`]; collection keys are
//! the pluralized key of the record type (`BlogPost` -> `blog_posts`).

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};

/// Casing convention used by document keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyConvention {
    /// `first_name`
    #[default]
    #[serde(rename = "snake_case")]
    SnakeCase,
    /// `firstName`
    #[serde(rename = "camelCase")]
    CamelCase,
    /// `first-name`
    #[serde(rename = "kebab-case")]
    KebabCase,
}

/// Translator for one key convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Naming {
    convention: KeyConvention,
}

impl Naming {
    pub fn new(convention: KeyConvention) -> Self {
        Naming { convention }
    }

    pub fn convention(&self) -> KeyConvention {
        self.convention
    }

    /// Struct-style name -> document key
    pub fn jsonify(&self, name: &str) -> String {
        match self.convention {
            KeyConvention::SnakeCase => name.to_snake_case(),
            KeyConvention::CamelCase => name.to_lower_camel_case(),
            KeyConvention::KebabCase => name.to_kebab_case(),
        }
    }

    /// Document key -> struct-style name
    pub fn dejsonify(&self, key: &str) -> String {
        key.to_upper_camel_case()
    }

    /// Key under which a collection of `type_name` records lives
    pub fn root_key(&self, type_name: &str) -> String {
        pluralize(&self.jsonify(type_name))
    }
}

/// English plural of `noun`
pub fn pluralize(noun: &str) -> String {
    pluralizer::pluralize(noun, 2, false)
}

/// English singular of `noun`
pub fn singularize(noun: &str) -> String {
    pluralizer::pluralize(noun, 1, false)
}

/// [`Naming::jsonify`] with the default convention
pub fn jsonify(name: &str) -> String {
    Naming::default().jsonify(name)
}

/// [`Naming::dejsonify`] with the default convention
pub fn dejsonify(key: &str) -> String {
    Naming::default().dejsonify(key)
}

/// Clash key for struct-style names: lowercase, separators dropped.
///
/// `TagIDs`, `TagIds` and `tag_ids` all become `tagids`.
pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
