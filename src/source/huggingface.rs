use std::collections::VecDeque;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{PagePermutation, RecordSource, ShuffleBuffer};
use crate::constants::corpus::{DATASET_CONFIG, DATASET_ID, DATASET_SPLIT, SOURCE_ID};
use crate::constants::source::{
    PAGE_SEED_OFFSET, ROWS_ENDPOINT, ROWS_PAGE_LENGTH, SHUFFLE_BUFFER_CAPACITY,
};
use crate::data::PersonaRecord;
use crate::errors::PersonaError;
use crate::types::{AccessToken, DatasetId, SourceId};

/// Configuration for a paged Hugging Face datasets-server row source.
#[derive(Clone, Debug)]
pub struct HuggingFaceRowsConfig {
    /// Source id used in log lines and errors.
    pub source_id: SourceId,
    /// Hugging Face dataset id, e.g. `nvidia/Nemotron-Personas-Japan`.
    pub dataset: DatasetId,
    /// Dataset config name, e.g. `default`.
    pub config: String,
    /// Split name, e.g. `train`.
    pub split: String,
    /// Rows endpoint URL.
    pub endpoint: String,
    /// Rows requested per page.
    pub page_length: usize,
    /// Bearer token sent with every request.
    pub token: AccessToken,
}

impl HuggingFaceRowsConfig {
    /// Create a config with dataset identity and credential; other values use defaults.
    pub fn new(
        source_id: impl Into<SourceId>,
        dataset: impl Into<DatasetId>,
        config: impl Into<String>,
        split: impl Into<String>,
        token: impl Into<AccessToken>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            dataset: dataset.into(),
            config: config.into(),
            split: split.into(),
            endpoint: ROWS_ENDPOINT.to_string(),
            page_length: ROWS_PAGE_LENGTH,
            token: token.into(),
        }
    }

    /// Config for the fixed persona corpus.
    pub fn persona_corpus(token: impl Into<AccessToken>) -> Self {
        Self::new(SOURCE_ID, DATASET_ID, DATASET_CONFIG, DATASET_SPLIT, token)
    }
}

/// One decoded page of the rows endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct RowsPage {
    /// Row payloads in page order.
    pub rows: Vec<PersonaRecord>,
    /// Total rows in the split, when reported.
    pub num_rows_total: Option<usize>,
    /// Rows that had one or more cells truncated by the server.
    pub truncated_rows: usize,
}

#[derive(Deserialize)]
struct RowsResponse {
    rows: Vec<RowEnvelope>,
    #[serde(default)]
    num_rows_total: Option<usize>,
}

#[derive(Deserialize)]
struct RowEnvelope {
    row: Value,
    #[serde(default)]
    truncated_cells: Vec<String>,
}

/// Decode a rows endpoint response body.
pub fn parse_rows_page(source_id: &str, body: &str) -> Result<RowsPage, PersonaError> {
    let response: RowsResponse =
        serde_json::from_str(body).map_err(|err| PersonaError::SourceInconsistent {
            source_id: source_id.to_string(),
            details: format!("failed decoding rows response: {err}"),
        })?;

    let mut truncated_rows = 0usize;
    let mut rows = Vec::with_capacity(response.rows.len());
    for (position, envelope) in response.rows.into_iter().enumerate() {
        if !envelope.truncated_cells.is_empty() {
            truncated_rows += 1;
        }
        let record =
            PersonaRecord::from_value(envelope.row).ok_or_else(|| PersonaError::SourceInconsistent {
                source_id: source_id.to_string(),
                details: format!("row {position} in page is not a JSON object"),
            })?;
        rows.push(record);
    }

    Ok(RowsPage {
        rows,
        num_rows_total: response.num_rows_total,
        truncated_rows,
    })
}

#[derive(Default)]
struct PageLayout {
    order: Option<PagePermutation>,
    first_page: Option<Vec<PersonaRecord>>,
}

/// Remote row source backed by the datasets-server rows endpoint.
///
/// The first request reads page 0 to learn the split size; pages are then
/// served in a seeded permuted order. Rows inside a page keep server order.
pub struct HuggingFaceRowsSource {
    config: HuggingFaceRowsConfig,
    seed: u64,
    layout: PageLayout,
    pending: VecDeque<PersonaRecord>,
    pages_fetched: usize,
    started: Option<Instant>,
}

impl HuggingFaceRowsSource {
    /// Build a source; no request is made until the first pull.
    pub fn new(config: HuggingFaceRowsConfig, seed: u64) -> Result<Self, PersonaError> {
        if config.page_length == 0 {
            return Err(PersonaError::InvalidArgument(
                "huggingface source page_length must be > 0".to_string(),
            ));
        }
        if config.token.trim().is_empty() {
            return Err(PersonaError::MissingCredential {
                env_var: crate::constants::corpus::TOKEN_ENV_VAR,
            });
        }
        Ok(Self {
            config,
            seed,
            layout: PageLayout::default(),
            pending: VecDeque::new(),
            pages_fetched: 0,
            started: None,
        })
    }

    /// Number of pages requested so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    fn fetch_page(&mut self, page_idx: usize) -> Result<RowsPage, PersonaError> {
        let offset = page_idx * self.config.page_length;
        debug!(
            "[personas:hf] requesting page {} (offset={}, length={}) from {}",
            page_idx, offset, self.config.page_length, self.config.dataset
        );
        let response = ureq::get(&self.config.endpoint)
            .query("dataset", &self.config.dataset)
            .query("config", &self.config.config)
            .query("split", &self.config.split)
            .query("offset", offset.to_string())
            .query("length", self.config.page_length.to_string())
            .header("Authorization", format!("Bearer {}", self.config.token))
            .call()
            .map_err(|err| self.map_transport_error(err))?;

        let body = response
            .into_body()
            .read_to_string()
            .map_err(|err| PersonaError::SourceUnavailable {
                source_id: self.config.source_id.clone(),
                reason: format!("failed reading rows response body: {err}"),
            })?;
        self.pages_fetched += 1;

        let page = parse_rows_page(&self.config.source_id, &body)?;
        if page.truncated_rows > 0 {
            warn!(
                "[personas:hf] page {} had {} row(s) with truncated cells",
                page_idx, page.truncated_rows
            );
        }
        Ok(page)
    }

    fn map_transport_error(&self, err: ureq::Error) -> PersonaError {
        match err {
            ureq::Error::StatusCode(status @ (401 | 403)) => PersonaError::Authentication {
                source_id: self.config.source_id.clone(),
                reason: format!(
                    "dataset '{}' answered HTTP {status}; check the token and that the dataset terms were accepted",
                    self.config.dataset
                ),
            },
            other => PersonaError::SourceUnavailable {
                source_id: self.config.source_id.clone(),
                reason: format!("failed querying rows endpoint: {other}"),
            },
        }
    }

    fn ensure_layout(&mut self) -> Result<(), PersonaError> {
        if self.layout.order.is_some() {
            return Ok(());
        }
        self.started = Some(Instant::now());
        let first = self.fetch_page(0)?;
        let total_rows = first.num_rows_total.unwrap_or(first.rows.len());
        let total_pages = total_rows.div_ceil(self.config.page_length);
        let seed = PagePermutation::seed_for(
            &self.config.dataset,
            self.seed ^ PAGE_SEED_OFFSET,
            total_pages,
        );
        info!(
            "[personas:hf] {} split '{}' reports {} rows across {} page(s)",
            self.config.dataset, self.config.split, total_rows, total_pages
        );
        self.layout = PageLayout {
            order: Some(PagePermutation::new(total_pages, seed)),
            first_page: Some(first.rows),
        };
        Ok(())
    }

    fn load_next_page(&mut self) -> Result<bool, PersonaError> {
        self.ensure_layout()?;
        loop {
            let Some(page_idx) = self.layout.order.as_mut().and_then(Iterator::next) else {
                if let Some(started) = self.started {
                    info!(
                        "[personas:hf] source exhausted after {} page request(s) in {:.2}s",
                        self.pages_fetched,
                        started.elapsed().as_secs_f64()
                    );
                }
                return Ok(false);
            };
            let rows = if page_idx == 0 {
                self.layout.first_page.take().unwrap_or_default()
            } else {
                self.fetch_page(page_idx)?.rows
            };
            if rows.is_empty() {
                debug!("[personas:hf] page {} was empty and was skipped", page_idx);
                continue;
            }
            self.pending.extend(rows);
            return Ok(true);
        }
    }
}

impl RecordSource for HuggingFaceRowsSource {
    fn id(&self) -> &str {
        &self.config.source_id
    }

    fn next_record(&mut self) -> Result<Option<PersonaRecord>, PersonaError> {
        if self.pending.is_empty() && !self.load_next_page()? {
            return Ok(None);
        }
        Ok(self.pending.pop_front())
    }
}

/// Open the persona corpus with the seeded page order and shuffle buffer.
pub fn open_corpus_source(
    token: impl Into<AccessToken>,
    seed: u64,
) -> Result<ShuffleBuffer<HuggingFaceRowsSource>, PersonaError> {
    let rows = HuggingFaceRowsSource::new(HuggingFaceRowsConfig::persona_corpus(token), seed)?;
    Ok(ShuffleBuffer::new(rows, SHUFFLE_BUFFER_CAPACITY, seed))
}
