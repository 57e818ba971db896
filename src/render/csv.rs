use std::collections::HashSet;
use std::io;

use serde_json::Value;

use crate::data::{FieldName, PersonaRecord, display_value};
use crate::errors::PersonaError;

/// Column contract for CSV output.
///
/// Columns come from the first record's field order. Every later record
/// must only use fields from that set; missing fields become empty cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvSchema {
    columns: Vec<FieldName>,
    lookup: HashSet<FieldName>,
}

impl CsvSchema {
    /// Build the contract from explicit column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<FieldName>,
    {
        let columns: Vec<FieldName> = columns.into_iter().map(Into::into).collect();
        let lookup = columns.iter().cloned().collect();
        Self { columns, lookup }
    }

    /// Contract inferred from the first record, `None` for an empty result.
    pub fn from_first(records: &[PersonaRecord]) -> Option<Self> {
        records.first().map(|first| Self::new(first.keys()))
    }

    /// Column names in output order.
    pub fn columns(&self) -> &[FieldName] {
        &self.columns
    }

    /// Fail with the full list of fields outside the column set.
    pub fn check(&self, record_index: usize, record: &PersonaRecord) -> Result<(), PersonaError> {
        let unexpected: Vec<FieldName> = record
            .keys()
            .filter(|name| !self.lookup.contains(*name))
            .map(str::to_string)
            .collect();
        if unexpected.is_empty() {
            Ok(())
        } else {
            Err(PersonaError::SchemaMismatch {
                record_index,
                fields: unexpected,
            })
        }
    }

    fn row(&self, record: &PersonaRecord) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| record.get(column).map(cell_text).unwrap_or_default())
            .collect()
    }
}

/// Text of one CSV cell. Lists and objects are written as JSON.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => display_value(other),
    }
}

/// Serialize records as CSV with a header row and CRLF line endings.
///
/// Every record is validated against the first record's columns before
/// anything is written. An empty result renders as an empty string.
pub fn render_csv(records: &[PersonaRecord]) -> Result<String, PersonaError> {
    let Some(schema) = CsvSchema::from_first(records) else {
        return Ok(String::new());
    };
    for (record_index, record) in records.iter().enumerate() {
        schema.check(record_index, record)?;
    }

    let mut writer = ::csv::WriterBuilder::new()
        .terminator(::csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(schema.columns())?;
    for record in records {
        writer.write_record(schema.row(record))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| PersonaError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| PersonaError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
}
