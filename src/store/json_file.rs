use crate::models::{FileSummary, MeasurementRecord, SummaryId, SummaryPredicate, SummaryStatistics};
use crate::store::{InMemoryStore, RecordStore, StoreResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// [`InMemoryStore`] persisted as a JSON snapshot.
///
/// Every mutating step is applied to a copy, written to a temporary sibling
/// file and renamed over the snapshot. A failed write leaves both the file and
/// the in-memory state as they were.
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryStore,
}

impl JsonFileStore {
    /// Open the snapshot at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let inner = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            InMemoryStore::new()
        };

        debug!(
            path = %path.display(),
            summaries = inner.summaries().len(),
            records = inner.records().len(),
            "Opened JSON store"
        );

        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> &InMemoryStore {
        &self.inner
    }

    fn commit<T>(
        &mut self,
        op: impl FnOnce(&mut InMemoryStore) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut next = self.inner.clone();
        let out = op(&mut next)?;
        self.write_snapshot(&next)?;
        self.inner = next;
        Ok(out)
    }

    fn write_snapshot(&self, state: &InMemoryStore) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, state)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn insert_records(&mut self, records: &[MeasurementRecord]) -> StoreResult<usize> {
        self.commit(|store| store.insert_records(records))
    }

    fn find_summary_by_name(&self, source_file_name: &str) -> StoreResult<Option<FileSummary>> {
        self.inner.find_summary_by_name(source_file_name)
    }

    fn insert_summary(
        &mut self,
        source_file_name: &str,
        statistics: &SummaryStatistics,
    ) -> StoreResult<FileSummary> {
        self.commit(|store| store.insert_summary(source_file_name, statistics))
    }

    fn update_summary(&mut self, summary: &FileSummary) -> StoreResult<()> {
        self.commit(|store| store.update_summary(summary))
    }

    fn link_unlinked_records(
        &mut self,
        source_file_name: &str,
        summary_id: SummaryId,
    ) -> StoreResult<usize> {
        self.commit(|store| store.link_unlinked_records(source_file_name, summary_id))
    }

    fn delete_records_for_summary(&mut self, summary_id: SummaryId) -> StoreResult<usize> {
        self.commit(|store| store.delete_records_for_summary(summary_id))
    }

    fn query_summaries(&self, predicate: &SummaryPredicate) -> StoreResult<Vec<FileSummary>> {
        self.inner.query_summaries(predicate)
    }

    fn latest_records_for_summary(
        &self,
        summary_id: SummaryId,
        limit: usize,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        self.inner.latest_records_for_summary(summary_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn stats() -> SummaryStatistics {
        SummaryStatistics {
            first_operation_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            average_execution_time: 1.0,
            average_value: 2.0,
            median_value: 2.0,
            max_value: 2.0,
            min_value: 2.0,
            time_delta_seconds: 0.0,
        }
    }

    #[test]
    fn test_missing_snapshot_opens_empty() -> StoreResult<()> {
        let dir = TempDir::new()?;
        let store = JsonFileStore::open(dir.path().join("store.json"))?;
        assert!(store.snapshot().summaries().is_empty());
        assert!(!store.path().exists());
        Ok(())
    }

    #[test]
    fn test_state_survives_reopen() -> StoreResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path)?;
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        store.insert_records(&[MeasurementRecord::new(ts, 1.0, 2.0, "a.csv".to_string())])?;
        let summary = store.insert_summary("a.csv", &stats())?;
        store.link_unlinked_records("a.csv", summary.id)?;

        let reopened = JsonFileStore::open(&path)?;
        assert_eq!(reopened.find_summary_by_name("a.csv")?, Some(summary.clone()));
        assert_eq!(reopened.latest_records_for_summary(summary.id, 10)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_step_leaves_state_untouched() -> StoreResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.json");
        let mut store = JsonFileStore::open(&path)?;
        store.insert_summary("a.csv", &stats())?;

        let result = store.insert_summary("a.csv", &stats());
        assert!(matches!(result, Err(StoreError::Constraint(_))));

        let reopened = JsonFileStore::open(&path)?;
        assert_eq!(reopened.snapshot().summaries().len(), 1);
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_is_reported() -> StoreResult<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json")?;

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Snapshot(_))
        ));
        Ok(())
    }
}
