//! Decoding of list fields that arrive as JSON text.

use serde_json::Value;

use crate::constants::fields::LIST_FIELDS;
use crate::data::PersonaRecord;

/// Decode an embedded list field into its entries.
///
/// Total: absent, `null`, empty, malformed, or wrongly typed input yields an
/// empty list. A value that is already an array of strings is taken as-is.
pub fn decode_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::String(text)) if !text.trim().is_empty() => {
            serde_json::from_str::<Vec<String>>(text).unwrap_or_default()
        }
        Some(Value::Array(items)) => strings_only(items).unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn strings_only(items: &[Value]) -> Option<Vec<String>> {
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Replace every present list field of `record` with its decoded array.
pub fn decode_list_fields(record: &mut PersonaRecord) {
    for name in LIST_FIELDS {
        if let Some(value) = record.get_mut(name) {
            let decoded = decode_list(Some(&*value));
            *value = Value::Array(decoded.into_iter().map(Value::String).collect());
        }
    }
}
