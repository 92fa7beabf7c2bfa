use crate::config::Settings;
use crate::error::Result;
use crate::models::FileSummary;
use crate::processors::{SummaryReconciler, StatisticsAggregator};
use crate::readers::{BatchValidator, RecordParser, UploadReader};
use crate::store::RecordStore;
use tracing::{info, warn};

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub summary: FileSummary,
    pub created: bool,
    pub rows_ingested: usize,
    pub rows_linked: usize,
    pub previous_rows_removed: usize,
}

impl IngestReport {
    pub fn summary_line(&self) -> String {
        format!(
            "{} summary #{} for '{}': {} rows ingested, {} linked{}",
            if self.created { "Created" } else { "Replaced" },
            self.summary.id,
            self.summary.source_file_name,
            self.rows_ingested,
            self.rows_linked,
            if self.previous_rows_removed > 0 {
                format!(", {} previous rows removed", self.previous_rows_removed)
            } else {
                String::new()
            }
        )
    }
}

/// Validate, aggregate and reconcile one uploaded file.
///
/// Validation runs to completion before the store is touched, so a rejected
/// upload persists nothing.
pub struct IngestService {
    validator: BatchValidator,
    aggregator: StatisticsAggregator,
    reconciler: SummaryReconciler,
}

impl IngestService {
    pub fn new() -> Self {
        Self {
            validator: BatchValidator::new(),
            aggregator: StatisticsAggregator::new(),
            reconciler: SummaryReconciler::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let parser = RecordParser::new().with_earliest(settings.earliest_valid_date);
        Self::new()
            .with_validator(
                BatchValidator::new()
                    .with_parser(parser)
                    .with_row_limits(settings.min_batch_rows, settings.max_batch_rows),
            )
            .with_reconciler(
                SummaryReconciler::new()
                    .with_replace_previous_records(settings.replace_previous_records),
            )
    }

    pub fn with_validator(mut self, validator: BatchValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_reconciler(mut self, reconciler: SummaryReconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn ingest_lines<S, I, L>(
        &self,
        store: &mut S,
        source_file_name: &str,
        lines: I,
    ) -> Result<IngestReport>
    where
        S: RecordStore + ?Sized,
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let batch = self
            .validator
            .validate(lines, source_file_name)
            .inspect_err(|e| {
                warn!(file = source_file_name, kind = %e.kind(), "Upload rejected: {}", e);
            })?;

        let statistics = self.aggregator.aggregate(&batch)?;
        let outcome =
            self.reconciler
                .reconcile_batch(store, source_file_name, statistics, &batch)?;

        info!(
            file = source_file_name,
            rows = outcome.rows_inserted,
            "Upload ingested"
        );

        Ok(IngestReport {
            summary: outcome.summary,
            created: outcome.created,
            rows_ingested: outcome.rows_inserted,
            rows_linked: outcome.rows_linked,
            previous_rows_removed: outcome.previous_rows_removed,
        })
    }

    /// Decode raw upload bytes, then ingest them.
    pub fn ingest_bytes<S>(
        &self,
        store: &mut S,
        source_file_name: &str,
        bytes: &[u8],
    ) -> Result<IngestReport>
    where
        S: RecordStore + ?Sized,
    {
        let lines = UploadReader::decode_lines(bytes);
        self.ingest_lines(store, source_file_name, &lines)
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProcessingError, ValidationKind};
    use crate::models::{MeasurementRecord, SummaryId, SummaryPredicate, SummaryStatistics};
    use crate::store::{InMemoryStore, StoreError, StoreResult};

    #[test]
    fn test_two_row_upload() {
        let mut store = InMemoryStore::new();
        let report = IngestService::new()
            .ingest_bytes(
                &mut store,
                "a.csv",
                b"header\n2023-01-01;1.0;5.0\n2023-01-02;3.0;7.0",
            )
            .unwrap();

        let stats = &report.summary.statistics;
        assert!(report.created);
        assert_eq!(report.rows_ingested, 2);
        assert_eq!(report.rows_linked, 2);
        assert_eq!(stats.average_value, 6.0);
        assert_eq!(stats.median_value, 6.0);
        assert_eq!(stats.min_value, 5.0);
        assert_eq!(stats.max_value, 7.0);
        assert_eq!(stats.time_delta_seconds, 86_400.0);
        assert!(report.summary_line().starts_with("Created summary #1"));
    }

    #[test]
    fn test_rejected_upload_persists_nothing() {
        let mut store = InMemoryStore::new();
        let err = IngestService::new()
            .ingest_bytes(
                &mut store,
                "a.csv",
                b"header\n2023-01-01;1.0;5.0\n2023-01-02;3.0;-7.0",
            )
            .unwrap_err();

        assert_eq!(
            err.validation().map(|e| e.kind()),
            Some(ValidationKind::InvalidValue)
        );
        assert!(store.records().is_empty());
        assert!(store.summaries().is_empty());
    }

    #[test]
    fn test_pinned_reference_time_rejects_later_rows() {
        use chrono::{TimeZone, Utc};

        let reference = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
        let service = IngestService::new().with_validator(
            BatchValidator::new().with_parser(RecordParser::new().with_reference_time(reference)),
        );
        let mut store = InMemoryStore::new();

        assert!(service
            .ingest_lines(&mut store, "a.csv", ["h", "2023-01-01T12:00:00Z;1;1"])
            .is_ok());
        let err = service
            .ingest_lines(&mut store, "b.csv", ["h", "2023-01-01T12:00:01Z;1;1"])
            .unwrap_err();
        assert_eq!(
            err.validation().map(|e| e.kind()),
            Some(ValidationKind::InvalidDate)
        );
    }

    #[test]
    fn test_settings_drive_row_limits() {
        let settings = Settings {
            max_batch_rows: 1,
            ..Settings::default()
        };
        let mut store = InMemoryStore::new();
        let err = IngestService::from_settings(&settings)
            .ingest_lines(&mut store, "a.csv", ["h", "2023-01-01;1;1", "2023-01-02;1;1"])
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Rejected(_)));
        assert_eq!(
            err.validation().map(|e| e.kind()),
            Some(ValidationKind::BatchSizeOutOfRange)
        );
    }

    /// Fails the summary insert step, after the rows have been written.
    struct SummaryInsertFails(InMemoryStore);

    impl RecordStore for SummaryInsertFails {
        fn insert_records(&mut self, records: &[MeasurementRecord]) -> StoreResult<usize> {
            self.0.insert_records(records)
        }

        fn find_summary_by_name(&self, name: &str) -> StoreResult<Option<FileSummary>> {
            self.0.find_summary_by_name(name)
        }

        fn insert_summary(
            &mut self,
            _source_file_name: &str,
            _statistics: &SummaryStatistics,
        ) -> StoreResult<FileSummary> {
            Err(StoreError::Unavailable("connection reset".to_string()))
        }

        fn update_summary(&mut self, summary: &FileSummary) -> StoreResult<()> {
            self.0.update_summary(summary)
        }

        fn link_unlinked_records(&mut self, name: &str, id: SummaryId) -> StoreResult<usize> {
            self.0.link_unlinked_records(name, id)
        }

        fn delete_records_for_summary(&mut self, id: SummaryId) -> StoreResult<usize> {
            self.0.delete_records_for_summary(id)
        }

        fn query_summaries(&self, predicate: &SummaryPredicate) -> StoreResult<Vec<FileSummary>> {
            self.0.query_summaries(predicate)
        }

        fn latest_records_for_summary(
            &self,
            id: SummaryId,
            limit: usize,
        ) -> StoreResult<Vec<MeasurementRecord>> {
            self.0.latest_records_for_summary(id, limit)
        }
    }

    #[test]
    fn test_store_failure_between_steps_leaves_unlinked_rows() {
        let mut store = SummaryInsertFails(InMemoryStore::new());
        let err = IngestService::new()
            .ingest_lines(&mut store, "a.csv", ["h", "2023-01-01;1;1"])
            .unwrap_err();

        assert!(matches!(err, ProcessingError::Store(StoreError::Unavailable(_))));
        assert!(err.validation().is_none());
        assert_eq!(store.0.records().len(), 1);
        assert!(!store.0.records()[0].is_linked());

        // The next successful upload of the same name links the orphan too
        let mut recovered = store.0;
        let report = IngestService::new()
            .ingest_lines(&mut recovered, "a.csv", ["h", "2023-01-02;1;1"])
            .unwrap();
        assert_eq!(report.rows_linked, 2);
    }
}
