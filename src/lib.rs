#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner for the `fetch_personas` binary.
#[cfg(feature = "huggingface")]
pub mod cli;
/// Run configuration types.
pub mod config;
/// Centralized constants for the corpus, source, pipeline, and renderers.
pub mod constants;
/// Persona record type.
pub mod data;
/// Recovery-oriented decoding of serialized list fields.
pub mod decode;
/// Filter criteria and matching.
pub mod filter;
mod hash;
/// Sex token normalization.
pub mod normalize;
/// Count-capped pull loop.
pub mod pipeline;
/// Field projection.
pub mod projection;
/// JSON, CSV, and Markdown renderers.
pub mod render;
/// Record source trait, reordering, and the remote corpus source.
pub mod source;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{PipelineConfig, RunConfig};
pub use data::PersonaRecord;
pub use errors::PersonaError;
pub use filter::FilterCriteria;
pub use pipeline::{RunResult, RunStats, run_pipeline};
pub use projection::FieldSelection;
pub use render::{OutputFormat, render};
pub use source::{InMemorySource, RecordSource, ShuffleBuffer};
#[cfg(feature = "huggingface")]
pub use source::{HuggingFaceRowsConfig, HuggingFaceRowsSource, open_corpus_source};
pub use types::{AccessToken, DatasetId, FieldName, SourceId};
