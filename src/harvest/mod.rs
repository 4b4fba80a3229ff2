//! Harvest module - pagination, batching and orchestration
//!
//! This module contains:
//! - The quota-aware retrying executor
//! - The cursor-driven paginator and its result limit
//! - Identifier batching for detail lookups
//! - Search criteria and date handling
//! - The endpoint client and the harvest coordinator

mod batch;
mod client;
mod coordinator;
mod criteria;
mod paginator;
mod plan;
mod retry;

pub use batch::{assemble_batches, BatchAssembler, IdentifierBatch};
pub use client::YoutubeClient;
pub use coordinator::{Harvester, OutputTargets};
pub use criteria::{
    format_since, parse_since, Order, SearchCriteria, SearchSource, MAX_PAGE_SIZE,
};
pub use paginator::{Paginator, ResultLimit};
pub use plan::{read_list_file, HarvestPlan};
pub use retry::RetryingExecutor;
