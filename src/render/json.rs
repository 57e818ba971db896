use crate::data::PersonaRecord;
use crate::errors::PersonaError;

/// Serialize records as a JSON array.
///
/// Non-ASCII text is written literally. `pretty` switches to two-space
/// indentation.
pub fn render_json(records: &[PersonaRecord], pretty: bool) -> Result<String, PersonaError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    Ok(rendered)
}
