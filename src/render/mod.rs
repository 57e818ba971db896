//! Output renderers for accepted records.

use std::fmt;
use std::str::FromStr;

use crate::data::PersonaRecord;
use crate::errors::PersonaError;

/// CSV renderer and column contract.
pub mod csv;
/// JSON renderer.
pub mod json;
/// Markdown report renderer.
pub mod markdown;

pub use self::csv::{CsvSchema, render_csv};
pub use self::json::render_json;
pub use self::markdown::render_markdown;

/// Textual output format for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// JSON array of records.
    #[default]
    Json,
    /// CSV with columns taken from the first record.
    Csv,
    /// Human-readable Markdown report.
    Markdown,
}

impl OutputFormat {
    /// Lowercase name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = PersonaError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(PersonaError::InvalidArgument(format!(
                "unsupported output format '{other}' (expected json, csv, or markdown)"
            ))),
        }
    }
}

/// Render `records` with the chosen format. `pretty` only affects JSON.
pub fn render(
    records: &[PersonaRecord],
    format: OutputFormat,
    pretty: bool,
) -> Result<String, PersonaError> {
    match format {
        OutputFormat::Json => render_json(records, pretty),
        OutputFormat::Csv => render_csv(records),
        OutputFormat::Markdown => Ok(render_markdown(records)),
    }
}
