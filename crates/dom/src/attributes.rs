//! Element attributes
//!
//! Typed attribute values (string/number/boolean) keyed by name. The
//! rendering layer stores plot parameters here, selectors read the
//! "resolved" string form.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

/// Type tag of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeType {
    Bool,
    Int,
    Double,
    String,
}

impl AttributeValue {
    pub fn value_type(&self) -> AttributeType {
        match self {
            AttributeValue::Bool(_) => AttributeType::Bool,
            AttributeValue::Int(_) => AttributeType::Int,
            AttributeValue::Double(_) => AttributeType::Double,
            AttributeValue::String(_) => AttributeType::String,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, AttributeValue::String(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, AttributeValue::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, AttributeValue::Int(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, AttributeValue::Double(_))
    }

    /// Int or double
    pub fn is_number(&self) -> bool {
        self.is_int() || self.is_double()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; ints widen to f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Double(d) => Some(*d),
            _ => None,
        }
    }
}

/// String form used by selectors and the serializer.
/// Booleans render as `1`/`0`.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Double(d) => write!(f, "{}", d),
            AttributeValue::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

/// Per-element attribute map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeStore {
    values: AHashMap<String, AttributeValue>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) an attribute
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove an attribute, returning its old value
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.values.remove(name)
    }

    pub fn value_type(&self, name: &str) -> Option<AttributeType> {
        self.values.get(name).map(AttributeValue::value_type)
    }

    /// String form of the attribute, empty when unset
    pub fn resolved(&self, name: &str) -> String {
        self.values
            .get(name)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Attribute names in lexicographic order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Unordered iteration
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_values() {
        let mut store = AttributeStore::new();
        store.set("name", "line");
        store.set("linewidth", 2.5);
        store.set("linetype", 3);
        store.set("visible", true);

        assert_eq!(store.value_type("name"), Some(AttributeType::String));
        assert!(store.get("linewidth").unwrap().is_number());
        assert_eq!(store.get("linetype").unwrap().as_int(), Some(3));
        assert_eq!(store.get("linetype").unwrap().as_double(), Some(3.0));
        assert_eq!(store.get("visible").unwrap().as_bool(), Some(true));
        assert_eq!(store.value_type("missing"), None);
    }

    #[test]
    fn test_resolved_strings() {
        let mut store = AttributeStore::new();
        store.set("a", 1.5);
        store.set("b", false);
        store.set("c", 42);

        assert_eq!(store.resolved("a"), "1.5");
        assert_eq!(store.resolved("b"), "0");
        assert_eq!(store.resolved("c"), "42");
        assert_eq!(store.resolved("unset"), "");
    }

    #[test]
    fn test_names_sorted_and_remove() {
        let mut store = AttributeStore::new();
        store.set("z", "1");
        store.set("a", "2");
        store.set("m", "3");
        assert_eq!(store.names(), vec!["a", "m", "z"]);

        assert_eq!(store.remove("m"), Some(AttributeValue::from("3")));
        assert!(!store.has("m"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove("m"), None);
    }

    #[test]
    fn test_untagged_serde() {
        let values: Vec<AttributeValue> =
            serde_json::from_str(r#"[true, 7, 0.5, "text"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttributeValue::Bool(true),
                AttributeValue::Int(7),
                AttributeValue::Double(0.5),
                AttributeValue::String("text".to_string()),
            ]
        );
    }
}
