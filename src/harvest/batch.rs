//! Grouping of video IDs into detail-lookup batches
//!
//! A detail lookup accepts up to [`MAX_PAGE_SIZE`] comma-joined IDs, so a
//! list of seeds is split into consecutive groups of that size. IDs already
//! present in a previous output table can be excluded first.

use crate::harvest::MAX_PAGE_SIZE;
use std::collections::HashSet;
use std::fmt;

/// An ordered, non-empty group of IDs sent in one detail lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierBatch(Vec<String>);

impl IdentifierBatch {
    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The comma-joined value for the `id` query parameter
    pub fn query(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for IdentifierBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query())
    }
}

/// Splits IDs into detail-lookup batches
#[derive(Debug, Clone, Copy)]
pub struct BatchAssembler {
    batch_size: usize,
}

impl Default for BatchAssembler {
    fn default() -> Self {
        Self::new(MAX_PAGE_SIZE as usize)
    }
}

impl BatchAssembler {
    /// Creates an assembler; `batch_size` is clamped to `1..=MAX_PAGE_SIZE`
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(1, MAX_PAGE_SIZE as usize),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Groups `identifiers` into batches of at most `batch_size`
    ///
    /// With `existing`, IDs in that set are removed first and duplicates are
    /// collapsed. Surviving IDs keep their first-seen order, though callers
    /// should not rely on it. An empty input yields no batches, and a count
    /// that is an exact multiple of the batch size yields no trailing empty
    /// batch.
    pub fn assemble(
        &self,
        identifiers: &[String],
        existing: Option<&HashSet<String>>,
    ) -> Vec<IdentifierBatch> {
        let remaining: Vec<String> = match existing {
            Some(existing) => {
                let mut seen = HashSet::new();
                identifiers
                    .iter()
                    .filter(|id| !existing.contains(*id) && seen.insert(id.as_str()))
                    .cloned()
                    .collect()
            }
            None => identifiers.to_vec(),
        };

        remaining
            .chunks(self.batch_size)
            .map(|chunk| IdentifierBatch(chunk.to_vec()))
            .collect()
    }
}

/// Convenience wrapper around [`BatchAssembler::assemble`]
pub fn assemble_batches(
    identifiers: &[String],
    batch_size: usize,
    existing: Option<&HashSet<String>>,
) -> Vec<IdentifierBatch> {
    BatchAssembler::new(batch_size).assemble(identifiers, existing)
}
