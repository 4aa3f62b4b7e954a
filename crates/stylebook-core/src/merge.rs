//! Order-specified merging of attribute maps.
//!
//! Records are composed from typed base fields, frontmatter attributes and
//! adapter contributed data. The typed fields are assigned explicitly by the
//! resolvers; the free-form remainder is merged here.

use serde_json::{Map, Value};

/// Deep merge `fallback` into `preferred`.
///
/// Keys present in `preferred` win. When both sides hold an object under the
/// same key the objects are merged recursively with the same rule, so the
/// fallback only fills gaps.
pub fn merge_deep_left(preferred: &mut Map<String, Value>, fallback: Map<String, Value>) {
    for (key, fallback_value) in fallback {
        match preferred.get_mut(&key) {
            Some(Value::Object(preferred_object)) => {
                if let Value::Object(fallback_object) = fallback_value {
                    merge_deep_left(preferred_object, fallback_object);
                }
            }
            Some(_) => {}
            None => {
                preferred.insert(key, fallback_value);
            }
        }
    }
}

/// Shallow merge of two render contexts, `overrides` winning.
///
/// Non-object values replace each other wholesale; a missing side yields the
/// other one.
pub fn merge_context(defaults: Option<&Value>, overrides: Option<Value>) -> Option<Value> {
    match (defaults, overrides) {
        (Some(Value::Object(defaults)), Some(Value::Object(overrides))) => {
            let mut merged = defaults.clone();
            merged.extend(overrides);
            Some(Value::Object(merged))
        }
        (_, Some(overrides)) => Some(overrides),
        (defaults, None) => defaults.cloned(),
    }
}

/// Remove `keys` from an attribute map.
pub fn without_keys(mut attributes: Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    for key in keys {
        attributes.remove(*key);
    }
    attributes
}
