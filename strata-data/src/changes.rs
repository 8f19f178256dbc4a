use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column assignments applied by an update, keyed by column name.
///
/// Deserializes from a flat JSON object (`{"title": "x", "done": true}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changes(BTreeMap<String, Value>);

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style assignment.
    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.0.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// The same change set with `column` removed.
    pub fn without(mut self, column: &str) -> Self {
        self.0.remove(column);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Changes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Changes(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_strips_column() {
        let changes = Changes::new().set("id", 11).set("title", "x").without("id");
        assert!(!changes.contains("id"));
        assert_eq!(changes.get("title"), Some(&Value::Text("x".into())));
    }

    #[test]
    fn test_deserialize_flat_object() {
        let changes: Changes = serde_json::from_str(r#"{"done": true, "rank": 3}"#).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.get("rank"), Some(&Value::Int(3)));
    }
}
