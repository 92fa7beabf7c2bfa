pub mod ingest;
pub mod query;
pub mod reconciler;
pub mod statistics;

pub use ingest::{IngestReport, IngestService};
pub use query::{NoMatchReason, QueryOutcome, QueryService};
pub use reconciler::{reconcile, ReconcileOutcome, SummaryReconciler, SummaryUpsert};
pub use statistics::{median, StatisticsAggregator};
