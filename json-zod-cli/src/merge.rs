//! Property merging for the `extends` composition convention.
//!
//! A schema may carry an `extends` block with its own `properties`. Before
//! type generation the two property sets are flattened into the top-level
//! `properties` mapping.

use crate::error::MergeError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Which section wins when both define the same property.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergePrecedence {
    /// Top-level `properties` shadow `extends.properties`.
    #[default]
    Base,
    /// `extends.properties` shadow top-level `properties`.
    Extends,
}

impl std::str::FromStr for MergePrecedence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "extends" => Ok(Self::Extends),
            other => Err(format!("expected `base` or `extends`, got `{other}`")),
        }
    }
}

/// Merge `extends.properties` into `properties`.
///
/// Returns a shallow copy of `document` whose `properties` is the union of
/// both sections. Extension keys come first in their original order, followed
/// by keys only present in the base section. Missing or `null` sections count
/// as empty.
///
/// `extends` may also be an array of parent schemas, whose `properties` are
/// merged in order with later parents shadowing earlier ones. Any other shape
/// of `extends` contributes no properties.
pub fn merge_properties(
    document: &Value,
    precedence: MergePrecedence,
) -> Result<Value, MergeError> {
    let object = document.as_object().ok_or(MergeError::NotAnObject {
        found: kind_of(document),
    })?;

    let own = object_section(object.get("properties"), "properties")?;

    let mut merged = Map::new();
    for parent in extended_properties(object.get("extends")) {
        for (key, value) in parent {
            merged.insert(key.clone(), value.clone());
        }
    }

    for (key, value) in own.into_iter().flatten() {
        match precedence {
            MergePrecedence::Base => {
                merged.insert(key.clone(), value.clone());
            }
            MergePrecedence::Extends => {
                merged.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }
    }

    let mut result = object.clone();
    result.insert("properties".to_string(), Value::Object(merged));
    Ok(Value::Object(result))
}

/// The `properties` mappings contributed by an `extends` value, in merge order.
fn extended_properties(extends: Option<&Value>) -> Vec<&Map<String, Value>> {
    let parents = match extends {
        Some(Value::Array(parents)) => parents.iter().collect(),
        Some(parent @ Value::Object(_)) => vec![parent],
        _ => Vec::new(),
    };

    parents
        .into_iter()
        .filter_map(|parent| parent.get("properties")?.as_object())
        .collect()
}

fn object_section<'a>(
    value: Option<&'a Value>,
    section: &'static str,
) -> Result<Option<&'a Map<String, Value>>, MergeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(MergeError::InvalidSection {
            section,
            found: kind_of(other),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
