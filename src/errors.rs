use std::io;

use thiserror::Error;

use crate::types::{FieldName, SourceId};

/// Error type for configuration, source, and rendering failures.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// No access token was given on the command line or in the environment.
    #[error(
        "a Hugging Face access token is required: pass --token or set the {env_var} environment variable"
    )]
    MissingCredential {
        /// Environment variable that was consulted.
        env_var: &'static str,
    },
    /// A flag or criterion value was rejected before any fetch.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The remote host refused the credential.
    #[error("data source '{source_id}' rejected the credential: {reason}")]
    Authentication {
        /// Source that failed.
        source_id: SourceId,
        /// Host response summary.
        reason: String,
    },
    /// The remote host could not be reached or read.
    #[error("data source '{source_id}' is unavailable: {reason}")]
    SourceUnavailable {
        /// Source that failed.
        source_id: SourceId,
        /// Transport error text.
        reason: String,
    },
    /// The remote host answered with data that could not be decoded.
    #[error("data source '{source_id}' returned inconsistent state: {details}")]
    SourceInconsistent {
        /// Source that failed.
        source_id: SourceId,
        /// What could not be decoded.
        details: String,
    },
    /// A record has fields outside the CSV columns taken from the first record.
    #[error(
        "record {record_index} has field(s) outside the CSV column set: {}",
        fields.join(", ")
    )]
    SchemaMismatch {
        /// Zero-based index of the offending record.
        record_index: usize,
        /// Every field outside the column set.
        fields: Vec<FieldName>,
    },
    /// Output or stream failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// CSV writer failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
