pub mod filter;
pub mod measurement;
pub mod summary;

pub use filter::{SummaryCondition, SummaryFilter, SummaryPredicate};
pub use measurement::MeasurementRecord;
pub use summary::{FileSummary, SummaryId, SummaryStatistics};
