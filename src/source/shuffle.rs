use rand::Rng;

use super::RecordSource;
use crate::data::PersonaRecord;
use crate::errors::PersonaError;

/// Small deterministic RNG (SplitMix64).
///
/// Kept in-crate so a seed reproduces the same order regardless of the
/// `rand` version's `StdRng` algorithm.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let bytes = self.next_u64_internal().to_le_bytes();
            let copy_len = (dest.len() - offset).min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Seeded bounded-buffer reorder over another source.
///
/// Keeps up to `capacity` records buffered and hands out a randomly chosen
/// one per pull, refilling from the inner source. The order is reproducible
/// for a fixed seed and inner order, but it is not a uniform permutation:
/// a record can only move about `capacity` positions from where it arrived.
pub struct ShuffleBuffer<S> {
    inner: S,
    buffer: Vec<PersonaRecord>,
    capacity: usize,
    rng: DeterministicRng,
    inner_exhausted: bool,
}

impl<S: RecordSource> ShuffleBuffer<S> {
    /// Wrap `inner` with a buffer of `capacity` records (minimum 1).
    pub fn new(inner: S, capacity: usize, seed: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner,
            buffer: Vec::with_capacity(capacity.min(4_096)),
            capacity,
            rng: DeterministicRng::new(seed),
            inner_exhausted: false,
        }
    }

    /// Access the wrapped source.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of records currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn fill(&mut self) -> Result<(), PersonaError> {
        while !self.inner_exhausted && self.buffer.len() < self.capacity {
            match self.inner.next_record()? {
                Some(record) => self.buffer.push(record),
                None => self.inner_exhausted = true,
            }
        }
        Ok(())
    }
}

impl<S: RecordSource> RecordSource for ShuffleBuffer<S> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn next_record(&mut self) -> Result<Option<PersonaRecord>, PersonaError> {
        self.fill()?;
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let idx = self.rng.random_range(0..self.buffer.len());
        Ok(Some(self.buffer.swap_remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemorySource;
    use std::collections::HashSet;

    fn numbered(count: usize) -> Vec<PersonaRecord> {
        (0..count)
            .map(|idx| PersonaRecord::new().with_field("idx", idx))
            .collect()
    }

    fn drain<S: RecordSource>(source: &mut S) -> Vec<u64> {
        let mut out = Vec::new();
        while let Some(record) = source.next_record().unwrap() {
            out.push(record.get("idx").and_then(|v| v.as_u64()).unwrap());
        }
        out
    }

    #[test]
    fn shuffle_yields_every_record_exactly_once() {
        let mut source = ShuffleBuffer::new(InMemorySource::new("mem", numbered(50)), 8, 42);
        let order = drain(&mut source);
        assert_eq!(order.len(), 50);
        let unique: HashSet<u64> = order.iter().copied().collect();
        assert_eq!(unique.len(), 50);
        assert!(source.next_record().unwrap().is_none());
    }

    #[test]
    fn same_seed_reproduces_order_and_different_seed_changes_it() {
        let run = |seed| drain(&mut ShuffleBuffer::new(InMemorySource::new("mem", numbered(40)), 16, seed));
        assert_eq!(run(42), run(42));
        assert_ne!(run(42), run(7));
    }

    #[test]
    fn records_move_at_most_buffer_capacity_earlier() {
        let capacity = 4;
        let order = drain(&mut ShuffleBuffer::new(
            InMemorySource::new("mem", numbered(30)),
            capacity,
            3,
        ));
        for (position, idx) in order.iter().enumerate() {
            assert!(
                (*idx as usize) < position + capacity,
                "record {idx} surfaced at {position}, beyond the buffer horizon"
            );
        }
    }

    #[test]
    fn capacity_one_is_a_passthrough() {
        let order = drain(&mut ShuffleBuffer::new(InMemorySource::new("mem", numbered(5)), 1, 9));
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
        let zero = drain(&mut ShuffleBuffer::new(InMemorySource::new("mem", numbered(3)), 0, 9));
        assert_eq!(zero, vec![0, 1, 2]);
    }

    #[test]
    fn pulls_lazily_from_the_inner_source() {
        let mut source = ShuffleBuffer::new(InMemorySource::new("mem", numbered(100)), 10, 1);
        source.next_record().unwrap();
        assert_eq!(source.inner().pulled(), 10);
        assert_eq!(source.buffered(), 9);
    }
}
