//! Field projection for accepted records.

use std::collections::HashSet;

use crate::data::{FieldName, PersonaRecord};

/// Requested output fields. Empty means "keep every field".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSelection {
    names: Vec<FieldName>,
    lookup: HashSet<FieldName>,
}

impl FieldSelection {
    /// Selection that keeps every field.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from field names; duplicates are ignored.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldName>,
    {
        let mut selection = Self::default();
        for name in names {
            let name = name.into();
            if selection.lookup.insert(name.clone()) {
                selection.names.push(name);
            }
        }
        selection
    }

    /// Parse a comma-separated list such as `uuid, age,occupation`.
    ///
    /// Entries are trimmed and blank entries are dropped.
    pub fn parse(raw: &str) -> Self {
        Self::new(
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    /// Whether the selection keeps every field.
    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether `name` survives projection.
    pub fn keeps(&self, name: &str) -> bool {
        self.is_all() || self.lookup.contains(name)
    }

    /// Field names in the order they were requested.
    pub fn names(&self) -> &[FieldName] {
        &self.names
    }
}

/// Restrict `record` to the selected fields.
///
/// Output keeps the record's own field order, not the requested order.
pub fn project(record: PersonaRecord, selection: &FieldSelection) -> PersonaRecord {
    if selection.is_all() {
        return record;
    }
    record
        .into_map()
        .into_iter()
        .filter(|(name, _)| selection.keeps(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PersonaRecord {
        PersonaRecord::new()
            .with_field("uuid", "u-1")
            .with_field("age", 30)
            .with_field("sex", "女")
            .with_field("occupation", "教師")
    }

    #[test]
    fn empty_selection_is_identity() {
        assert_eq!(project(sample(), &FieldSelection::all()), sample());
        assert_eq!(project(sample(), &FieldSelection::parse("")), sample());
        assert_eq!(project(sample(), &FieldSelection::parse(" , ,")), sample());
    }

    #[test]
    fn projection_keeps_record_order_not_request_order() {
        let selection = FieldSelection::parse("occupation,uuid");
        let projected = project(sample(), &selection);
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["uuid", "occupation"]);
    }

    #[test]
    fn projection_is_intersection_with_record_keys() {
        let selection = FieldSelection::parse("age, persona ,missing");
        let projected = project(sample(), &selection);
        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["age"]);
    }

    #[test]
    fn parse_trims_and_dedups_names() {
        let selection = FieldSelection::parse(" uuid , age,uuid,, ");
        assert_eq!(selection.names(), ["uuid".to_string(), "age".to_string()]);
        assert!(selection.keeps("age"));
        assert!(!selection.keeps("sex"));
        assert!(FieldSelection::all().keeps("anything"));
    }
}
