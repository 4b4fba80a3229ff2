//! CSV-backed table writer
//!
//! Tables are UTF-8 with a header row. Missing values are written as empty
//! cells. A UTF-8 byte-order mark at the start of an existing table is
//! tolerated when reading it back.

use crate::output::traits::{ExtraColumns, OutputError, OutputResult, TableWriter};
use crate::records::Tabular;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

const BOM: char = '\u{feff}';

/// Writes records to CSV files, appending to existing ones
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableWriter;

impl CsvTableWriter {
    pub fn new() -> Self {
        Self
    }
}

impl TableWriter for CsvTableWriter {
    fn append<R: Tabular>(
        &self,
        records: &[R],
        path: &Path,
        extra_columns: Option<&ExtraColumns>,
    ) -> OutputResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut header: Vec<&str> = R::header();
        if let Some(extra) = extra_columns {
            header.extend(extra.keys().map(String::as_str));
        }

        let write_header = match read_header(path) {
            Ok(existing) if existing.is_empty() => true,
            Ok(existing) if existing == header => false,
            Ok(existing) => {
                return Err(OutputError::HeaderMismatch {
                    path: path.display().to_string(),
                    existing: existing.join(","),
                    expected: header.join(","),
                })
            }
            Err(OutputError::Io(e)) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => return Err(e),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(&header)?;
        }

        for record in records {
            let mut row: Vec<String> = record
                .row()
                .into_iter()
                .map(Option::unwrap_or_default)
                .collect();
            if let Some(extra) = extra_columns {
                row.extend(extra.values().cloned());
            }
            writer.write_record(&row)?;
        }

        writer.flush()?;
        tracing::debug!("Appended {} rows to {}", records.len(), path.display());
        Ok(records.len())
    }

    fn existing_ids(&self, path: &Path) -> HashSet<String> {
        read_existing_ids(path)
    }
}

/// Reads the header row of an existing table; empty for an empty file
fn read_header(path: &Path) -> OutputResult<Vec<String>> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).to_string())
        .collect())
}

/// Reads a whole table as header-keyed rows
pub fn read_table(path: &Path) -> OutputResult<Vec<BTreeMap<String, String>>> {
    let mut reader = csv::Reader::from_reader(File::open(path)?);
    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            header
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        );
    }
    Ok(rows)
}

/// Reads the `id` column of a table
///
/// Rows may have more or fewer cells than the header; only the `id` cell is
/// read. Fails if the table is missing, malformed, or has no `id` column.
pub fn read_ids(path: &Path) -> OutputResult<HashSet<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(File::open(path)?);
    let id_index = reader
        .headers()?
        .iter()
        .position(|h| h.trim_start_matches(BOM) == "id")
        .ok_or_else(|| OutputError::MissingIdColumn(path.display().to_string()))?;

    let mut ids = HashSet::new();
    for record in reader.records() {
        if let Some(id) = record?.get(id_index).filter(|id| !id.is_empty()) {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

/// Reads the `id` column of a table, treating any failure as "no IDs"
pub fn read_existing_ids(path: &Path) -> HashSet<String> {
    match read_ids(path) {
        Ok(ids) => {
            tracing::info!("Found {} existing records in {}", ids.len(), path.display());
            ids
        }
        Err(OutputError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("No existing output at {}", path.display());
            HashSet::new()
        }
        Err(e) => {
            tracing::warn!(
                "Could not read existing output {}: {}; nothing will be skipped",
                path.display(),
                e
            );
            HashSet::new()
        }
    }
}
