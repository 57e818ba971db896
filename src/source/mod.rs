//! Record source interfaces and reordering helpers.
//!
//! Ownership model:
//! - `RecordSource` is the pipeline-facing pull interface: one record per
//!   call, `None` once the source is exhausted.
//! - `ShuffleBuffer` wraps any source with a seeded, bounded-buffer reorder.
//! - `PagePermutation` owns the deterministic page-order math used by paged
//!   remote sources.

use std::collections::VecDeque;

use crate::data::PersonaRecord;
use crate::errors::PersonaError;
use crate::hash::source_seed;
use crate::types::SourceId;

mod shuffle;
#[cfg(feature = "huggingface")]
mod huggingface;

pub use shuffle::{DeterministicRng, ShuffleBuffer};
#[cfg(feature = "huggingface")]
pub use huggingface::{
    HuggingFaceRowsConfig, HuggingFaceRowsSource, RowsPage, open_corpus_source, parse_rows_page,
};

/// Pull-based record source.
///
/// Implementations decide how records are fetched and ordered. Callers only
/// see "next record or exhaustion"; a slow source blocks the caller.
pub trait RecordSource: Send {
    /// Stable source identifier used in logs and errors.
    fn id(&self) -> &str;
    /// Produce the next raw record, or `Ok(None)` once exhausted.
    fn next_record(&mut self) -> Result<Option<PersonaRecord>, PersonaError>;
}

impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn next_record(&mut self) -> Result<Option<PersonaRecord>, PersonaError> {
        (**self).next_record()
    }
}

/// In-memory source for tests and small fixtures. Yields records in order.
pub struct InMemorySource {
    id: SourceId,
    records: VecDeque<PersonaRecord>,
    pulled: usize,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(id: impl Into<SourceId>, records: Vec<PersonaRecord>) -> Self {
        Self {
            id: id.into(),
            records: records.into(),
            pulled: 0,
        }
    }

    /// Number of records handed out so far.
    pub fn pulled(&self) -> usize {
        self.pulled
    }

    /// Number of records not yet handed out.
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn next_record(&mut self) -> Result<Option<PersonaRecord>, PersonaError> {
        let next = self.records.pop_front();
        if next.is_some() {
            self.pulled += 1;
        }
        Ok(next)
    }
}

/// Deterministic permutation over `0..total` page indices.
///
/// Uses an affine bijection over the next power-of-two domain and skips
/// values outside `0..total`, so every index is produced exactly once per
/// cycle without materializing the order.
pub struct PagePermutation {
    total: u64,
    domain_bits: u32,
    domain_size: u64,
    seed: u64,
    counter: u64,
    emitted: u64,
}

impl PagePermutation {
    /// Permutation over `0..total` driven by `seed`.
    pub fn new(total: usize, seed: u64) -> Self {
        let total_u64 = total as u64;
        let domain_bits = if total_u64 <= 1 {
            1
        } else {
            64 - (total_u64 - 1).leading_zeros()
        };
        Self {
            total: total_u64,
            domain_bits,
            domain_size: 1u64 << domain_bits,
            seed,
            counter: 0,
            emitted: 0,
        }
    }

    /// Seed for a named source, mixed with the caller's run seed and size.
    pub fn seed_for(source_id: &str, run_seed: u64, total: usize) -> u64 {
        source_seed(source_id, run_seed, total)
    }

    /// Number of indices this permutation covers.
    pub fn len(&self) -> usize {
        self.total as usize
    }

    /// Whether the permutation covers no indices.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn permute_bits(value: u64, bits: u32, seed: u64) -> u64 {
        let mask = if bits == 64 {
            u64::MAX
        } else {
            (1u64 << bits) - 1
        };
        let a = (seed | 1) & mask;
        let b = (seed >> 1) & mask;
        a.wrapping_mul(value).wrapping_add(b) & mask
    }
}

impl Iterator for PagePermutation {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.emitted >= self.total {
            return None;
        }
        loop {
            let v = Self::permute_bits(
                self.counter % self.domain_size,
                self.domain_bits,
                self.seed,
            );
            self.counter = self.counter.wrapping_add(1);
            if v < self.total {
                self.emitted += 1;
                return Some(v as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn numbered(count: usize) -> Vec<PersonaRecord> {
        (0..count)
            .map(|idx| PersonaRecord::new().with_field("uuid", format!("u-{idx}")))
            .collect()
    }

    #[test]
    fn in_memory_source_yields_in_order_then_exhausts() {
        let mut source = InMemorySource::new("fixture", numbered(3));
        let mut ids = Vec::new();
        while let Some(record) = source.next_record().unwrap() {
            ids.push(record.str_field("uuid").unwrap().to_string());
        }
        assert_eq!(ids, vec!["u-0", "u-1", "u-2"]);
        assert_eq!(source.pulled(), 3);
        assert!(source.next_record().unwrap().is_none());
        assert_eq!(source.pulled(), 3);
    }

    #[test]
    fn boxed_sources_delegate() {
        let mut boxed: Box<dyn RecordSource> = Box::new(InMemorySource::new("boxed", numbered(1)));
        assert_eq!(boxed.id(), "boxed");
        assert!(boxed.next_record().unwrap().is_some());
        assert!(boxed.next_record().unwrap().is_none());
    }

    #[test]
    fn page_permutation_covers_every_index_once() {
        for total in [0usize, 1, 2, 7, 64, 100, 1_000] {
            let seed = PagePermutation::seed_for("pages", 42, total);
            let order: Vec<usize> = PagePermutation::new(total, seed).collect();
            assert_eq!(order.len(), total);
            let unique: HashSet<usize> = order.iter().copied().collect();
            assert_eq!(unique.len(), total);
            assert!(order.iter().all(|idx| *idx < total));
        }
    }

    #[test]
    fn page_permutation_is_reproducible_per_seed() {
        let first: Vec<usize> = PagePermutation::new(50, PagePermutation::seed_for("s", 42, 50)).collect();
        let second: Vec<usize> = PagePermutation::new(50, PagePermutation::seed_for("s", 42, 50)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn page_permutation_spreads_across_the_index_space() {
        // Pick a run seed whose multiplier is not 1 or -1 mod 2^k, otherwise
        // the order would be a plain rotation or reversal.
        let total = 256usize;
        let mask = (1u64 << 8) - 1;
        let run_seed = (0..512u64)
            .find(|seed| {
                let a = (PagePermutation::seed_for("spread", *seed, total) | 1) & mask;
                a != 1 && a != mask
            })
            .unwrap();
        let head: Vec<usize> =
            PagePermutation::new(total, PagePermutation::seed_for("spread", run_seed, total))
                .take(64)
                .collect();
        let min_idx = *head.iter().min().unwrap();
        let max_idx = *head.iter().max().unwrap();
        assert!(
            max_idx - min_idx >= total / 2,
            "expected spread across the index space, got min={min_idx} max={max_idx}"
        );
    }
}
