use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::fields;

pub use crate::types::FieldName;

/// One persona profile: an ordered field-name to value mapping.
///
/// The corpus schema is not fixed, so records keep every field they arrive
/// with. Field order is the order the source produced them in and is kept
/// through projection and rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaRecord {
    fields: Map<String, Value>,
}

impl PersonaRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Build a record from a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Append or replace a field. New fields go to the end.
    pub fn with_field(mut self, name: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field in place.
    pub fn insert(&mut self, name: impl Into<FieldName>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Raw value of a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Mutable access to a field value.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// Whether the record carries `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// String value of a field, `None` when absent or not a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Integer `age`, accepting integral numbers and numeric strings.
    pub fn age(&self) -> Option<i64> {
        match self.fields.get(fields::AGE)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|v| v.fract() == 0.0).map(|v| v as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Field names in record order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Field entries in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record into its JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

impl From<Map<String, Value>> for PersonaRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

impl FromIterator<(FieldName, Value)> for PersonaRecord {
    fn from_iter<T: IntoIterator<Item = (FieldName, Value)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Render a scalar field the way reports display it.
///
/// Strings are shown raw; every other value uses its JSON text.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_preserves_insertion_order() {
        let record = PersonaRecord::new()
            .with_field("uuid", "u-1")
            .with_field("age", 30)
            .with_field("occupation", "教師");
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["uuid", "age", "occupation"]);
    }

    #[test]
    fn record_round_trips_through_json_in_source_order() {
        let raw = r#"{"z":1,"a":"x","m":[1,2]}"#;
        let record: PersonaRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }

    #[test]
    fn age_accepts_integers_and_numeric_strings() {
        let int_age = PersonaRecord::new().with_field("age", 42);
        assert_eq!(int_age.age(), Some(42));

        let float_age = PersonaRecord::new().with_field("age", json!(42.0));
        assert_eq!(float_age.age(), Some(42));

        let text_age = PersonaRecord::new().with_field("age", " 17 ");
        assert_eq!(text_age.age(), Some(17));

        let fractional = PersonaRecord::new().with_field("age", json!(17.5));
        assert_eq!(fractional.age(), None);

        assert_eq!(PersonaRecord::new().age(), None);
        assert_eq!(PersonaRecord::new().with_field("age", json!(null)).age(), None);
    }

    #[test]
    fn from_value_rejects_non_objects() {
        assert!(PersonaRecord::from_value(json!([1, 2])).is_none());
        assert!(PersonaRecord::from_value(json!("text")).is_none());
        let record = PersonaRecord::from_value(json!({"uuid": "a"})).unwrap();
        assert_eq!(record.str_field("uuid"), Some("a"));
    }

    #[test]
    fn display_value_shows_strings_raw() {
        assert_eq!(display_value(&json!("東京都")), "東京都");
        assert_eq!(display_value(&json!(35)), "35");
        assert_eq!(display_value(&json!(true)), "true");
    }
}
