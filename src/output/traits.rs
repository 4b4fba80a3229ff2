//! Table writer trait and error types

use crate::records::Tabular;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table {0} has no 'id' column")]
    MissingIdColumn(String),

    #[error("Table {path} has columns [{existing}], refusing to append [{expected}]")]
    HeaderMismatch {
        path: String,
        existing: String,
        expected: String,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Constant columns merged into every written row
pub type ExtraColumns = BTreeMap<String, String>;

/// Trait for append-only tabular outputs
///
/// Tables are opened per call and closed before returning; nothing is held
/// open between calls. Two harvests appending to the same path at once need
/// an external lock.
pub trait TableWriter {
    /// Appends `records` to the table at `path`
    ///
    /// The header row is written only when the table does not exist yet.
    /// `extra_columns`, if given, are appended to the header and to every
    /// row after the record's own columns. Appending to a table whose
    /// header differs from that column set fails without writing.
    ///
    /// # Returns
    ///
    /// The number of rows written
    fn append<R: Tabular>(
        &self,
        records: &[R],
        path: &Path,
        extra_columns: Option<&ExtraColumns>,
    ) -> OutputResult<usize>;

    /// Reads the `id` column of a previously written table
    ///
    /// A missing or unreadable table yields an empty set.
    fn existing_ids(&self, path: &Path) -> HashSet<String>;
}
