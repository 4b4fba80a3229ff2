//! Output module for persisting harvested records
//!
//! This module handles:
//! - Appending records to CSV tables, writing headers only for new tables
//! - Reading back the IDs of previously written records for resumption
//! - Recording and printing run statistics

mod csv_table;
pub mod stats;
mod traits;

pub use csv_table::{read_existing_ids, read_ids, read_table, CsvTableWriter};
pub use stats::{print_summary, HarvestFailure, HarvestStage, HarvestSummary};
pub use traits::{ExtraColumns, OutputError, OutputResult, TableWriter};
