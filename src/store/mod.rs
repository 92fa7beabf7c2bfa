//! Record store collaborator.
//!
//! The core never holds a global store: every operation receives a
//! [`RecordStore`] handle. Each method is one persistence step and is expected
//! to be atomic on its own; nothing is atomic across steps.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

use crate::models::{FileSummary, MeasurementRecord, SummaryId, SummaryPredicate, SummaryStatistics};
use thiserror::Error;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Summary {0} not found")]
    SummaryNotFound(SummaryId),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub trait RecordStore {
    /// Insert new measurement rows as they are (normally unlinked).
    fn insert_records(&mut self, records: &[MeasurementRecord]) -> StoreResult<usize>;

    fn find_summary_by_name(&self, source_file_name: &str) -> StoreResult<Option<FileSummary>>;

    /// Insert a summary for a file name that has none yet; the store assigns its id.
    fn insert_summary(
        &mut self,
        source_file_name: &str,
        statistics: &SummaryStatistics,
    ) -> StoreResult<FileSummary>;

    /// Overwrite an existing summary row in place, keyed by its id.
    fn update_summary(&mut self, summary: &FileSummary) -> StoreResult<()>;

    /// Point every unlinked record of `source_file_name` at `summary_id`.
    fn link_unlinked_records(
        &mut self,
        source_file_name: &str,
        summary_id: SummaryId,
    ) -> StoreResult<usize>;

    fn delete_records_for_summary(&mut self, summary_id: SummaryId) -> StoreResult<usize>;

    /// Summaries matching `predicate`, in id order.
    fn query_summaries(&self, predicate: &SummaryPredicate) -> StoreResult<Vec<FileSummary>>;

    /// Up to `limit` records linked to `summary_id`, newest timestamp first.
    fn latest_records_for_summary(
        &self,
        summary_id: SummaryId,
        limit: usize,
    ) -> StoreResult<Vec<MeasurementRecord>>;
}
