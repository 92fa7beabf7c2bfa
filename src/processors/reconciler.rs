use crate::error::Result;
use crate::models::{FileSummary, MeasurementRecord, SummaryStatistics};
use crate::store::RecordStore;
use tracing::{debug, info};

/// The write a fresh set of statistics turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryUpsert {
    Insert {
        source_file_name: String,
        statistics: SummaryStatistics,
    },
    Update(FileSummary),
}

/// Decide how fresh statistics land on the summary that may already exist.
///
/// An existing summary keeps its id and has every statistic replaced; nothing
/// from the previous upload is carried over.
pub fn reconcile(
    existing: Option<FileSummary>,
    source_file_name: &str,
    fresh: SummaryStatistics,
) -> SummaryUpsert {
    match existing {
        Some(mut summary) => {
            summary.replace_statistics(fresh);
            SummaryUpsert::Update(summary)
        }
        None => SummaryUpsert::Insert {
            source_file_name: source_file_name.to_string(),
            statistics: fresh,
        },
    }
}

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub summary: FileSummary,
    pub created: bool,
    pub rows_inserted: usize,
    pub rows_linked: usize,
    pub previous_rows_removed: usize,
}

/// Persists an accepted batch and upserts its summary.
///
/// Steps, each a separate store call: insert the rows unlinked, upsert the
/// summary by file name, then link the file's unlinked rows to the summary id.
/// A failure between steps can leave unlinked rows behind; they are picked up
/// by the link step of the next upload with the same name.
pub struct SummaryReconciler {
    replace_previous_records: bool,
}

impl SummaryReconciler {
    pub fn new() -> Self {
        Self {
            replace_previous_records: false,
        }
    }

    /// Drop the rows linked to the summary being replaced before relinking.
    pub fn with_replace_previous_records(mut self, replace: bool) -> Self {
        self.replace_previous_records = replace;
        self
    }

    pub fn reconcile_batch<S>(
        &self,
        store: &mut S,
        source_file_name: &str,
        statistics: SummaryStatistics,
        batch: &[MeasurementRecord],
    ) -> Result<ReconcileOutcome>
    where
        S: RecordStore + ?Sized,
    {
        let rows_inserted = store.insert_records(batch)?;
        debug!(file = source_file_name, rows = rows_inserted, "Inserted unlinked rows");

        let existing = store.find_summary_by_name(source_file_name)?;

        let previous_rows_removed = match (&existing, self.replace_previous_records) {
            (Some(previous), true) => store.delete_records_for_summary(previous.id)?,
            _ => 0,
        };

        let (summary, created) = match reconcile(existing, source_file_name, statistics) {
            SummaryUpsert::Insert {
                source_file_name,
                statistics,
            } => (store.insert_summary(&source_file_name, &statistics)?, true),
            SummaryUpsert::Update(summary) => {
                store.update_summary(&summary)?;
                (summary, false)
            }
        };

        let rows_linked = store.link_unlinked_records(source_file_name, summary.id)?;

        info!(
            file = source_file_name,
            summary_id = %summary.id,
            created,
            rows_linked,
            previous_rows_removed,
            "Summary reconciled"
        );

        Ok(ReconcileOutcome {
            summary,
            created,
            rows_inserted,
            rows_linked,
            previous_rows_removed,
        })
    }
}

impl Default for SummaryReconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SummaryId;
    use crate::store::InMemoryStore;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn stats(average_value: f64) -> SummaryStatistics {
        SummaryStatistics {
            first_operation_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            average_execution_time: 1.0,
            average_value,
            median_value: average_value,
            max_value: average_value,
            min_value: average_value,
            time_delta_seconds: 0.0,
        }
    }

    fn rows(name: &str, count: u32) -> Vec<MeasurementRecord> {
        (1..=count)
            .map(|day| {
                MeasurementRecord::new(
                    Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0).unwrap(),
                    1.0,
                    day as f64,
                    name.to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn test_reconcile_without_existing_inserts() {
        assert_eq!(
            reconcile(None, "a.csv", stats(1.0)),
            SummaryUpsert::Insert {
                source_file_name: "a.csv".to_string(),
                statistics: stats(1.0),
            }
        );
    }

    #[test]
    fn test_reconcile_overwrites_all_statistics() {
        let existing = FileSummary::new(SummaryId(4), "a.csv".to_string(), stats(1.0));
        let upsert = reconcile(Some(existing), "a.csv", stats(9.0));

        assert_eq!(
            upsert,
            SummaryUpsert::Update(FileSummary::new(
                SummaryId(4),
                "a.csv".to_string(),
                stats(9.0)
            ))
        );
    }

    #[test]
    fn test_first_upload_creates_and_links() {
        let mut store = InMemoryStore::new();
        let outcome = SummaryReconciler::new()
            .reconcile_batch(&mut store, "a.csv", stats(2.0), &rows("a.csv", 3))
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.rows_inserted, 3);
        assert_eq!(outcome.rows_linked, 3);
        assert!(store
            .records()
            .iter()
            .all(|r| r.summary_id == Some(outcome.summary.id)));
    }

    #[test]
    fn test_reupload_keeps_id_and_previous_rows() {
        let mut store = InMemoryStore::new();
        let reconciler = SummaryReconciler::new();
        let first = reconciler
            .reconcile_batch(&mut store, "a.csv", stats(2.0), &rows("a.csv", 3))
            .unwrap();
        let second = reconciler
            .reconcile_batch(&mut store, "a.csv", stats(5.0), &rows("a.csv", 2))
            .unwrap();

        assert!(!second.created);
        assert_eq!(second.summary.id, first.summary.id);
        assert_eq!(second.rows_linked, 2);
        assert_eq!(store.summaries().len(), 1);
        assert_eq!(store.summaries()[0].statistics, stats(5.0));
        assert_eq!(store.records_for_file("a.csv").count(), 5);
    }

    #[test]
    fn test_reupload_with_replacement_drops_previous_rows() {
        let mut store = InMemoryStore::new();
        let reconciler = SummaryReconciler::new().with_replace_previous_records(true);
        reconciler
            .reconcile_batch(&mut store, "a.csv", stats(2.0), &rows("a.csv", 3))
            .unwrap();
        let second = reconciler
            .reconcile_batch(&mut store, "a.csv", stats(5.0), &rows("a.csv", 2))
            .unwrap();

        assert_eq!(second.previous_rows_removed, 3);
        assert_eq!(store.records_for_file("a.csv").count(), 2);
    }

    #[test]
    fn test_other_files_are_untouched() {
        let mut store = InMemoryStore::new();
        let reconciler = SummaryReconciler::new();
        reconciler
            .reconcile_batch(&mut store, "a.csv", stats(2.0), &rows("a.csv", 1))
            .unwrap();
        let b = reconciler
            .reconcile_batch(&mut store, "b.csv", stats(3.0), &rows("b.csv", 2))
            .unwrap();

        assert!(b.created);
        assert_eq!(b.rows_linked, 2);
        assert_eq!(store.summaries().len(), 2);
    }
}
