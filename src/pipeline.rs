//! Count-capped filter-and-sample pull loop.

use std::time::{Duration, Instant};

use tracing::{debug, info};

pub use crate::config::PipelineConfig;
use crate::constants::pipeline::PROGRESS_REPORT_MILLIS;
use crate::data::PersonaRecord;
use crate::decode::decode_list_fields;
use crate::errors::PersonaError;
use crate::projection::project;
use crate::source::RecordSource;

/// Counters describing one pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Raw records pulled from the source.
    pub pulled: usize,
    /// Records that satisfied the criteria.
    pub accepted: usize,
    /// Records dropped by the criteria.
    pub rejected: usize,
    /// Whether the source ran dry before the cap was reached.
    pub source_exhausted: bool,
}

/// Accepted, projected records in acceptance order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunResult {
    /// At most `sample_size` records.
    pub records: Vec<PersonaRecord>,
    /// Run counters.
    pub stats: RunStats,
}

/// Drive `source` until `sample_size` records are accepted or it is exhausted.
///
/// Each raw record is checked against the criteria before any decoding.
/// Accepted records get their list fields decoded and are then projected.
/// Running out of records early is not an error.
pub fn run_pipeline<S>(source: &mut S, config: &PipelineConfig) -> Result<RunResult, PersonaError>
where
    S: RecordSource + ?Sized,
{
    let cap = config.sample_size;
    let mut records = Vec::with_capacity(cap.min(1_024));
    let mut stats = RunStats::default();
    if cap == 0 {
        return Ok(RunResult { records, stats });
    }

    let report_every = Duration::from_millis(PROGRESS_REPORT_MILLIS);
    let started = Instant::now();
    let mut last_report = started;
    debug!(
        "[personas:pipeline] start source='{}' cap={}",
        source.id(),
        cap
    );

    while records.len() < cap {
        let Some(raw) = source.next_record()? else {
            stats.source_exhausted = true;
            break;
        };
        stats.pulled += 1;

        if !config.criteria.matches(&raw) {
            stats.rejected += 1;
        } else {
            let mut accepted = raw;
            decode_list_fields(&mut accepted);
            records.push(project(accepted, &config.fields));
            stats.accepted += 1;
        }

        if last_report.elapsed() >= report_every {
            info!(
                "[personas:pipeline] progress source='{}' pulled={} accepted={}/{} elapsed={:.1}s",
                source.id(),
                stats.pulled,
                stats.accepted,
                cap,
                started.elapsed().as_secs_f64()
            );
            last_report = Instant::now();
        }
    }

    info!(
        "[personas:pipeline] done source='{}' pulled={} accepted={} rejected={} exhausted={} elapsed={:.2}s",
        source.id(),
        stats.pulled,
        stats.accepted,
        stats.rejected,
        stats.source_exhausted,
        started.elapsed().as_secs_f64()
    );
    Ok(RunResult { records, stats })
}
