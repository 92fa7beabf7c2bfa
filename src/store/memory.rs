use crate::models::{FileSummary, MeasurementRecord, SummaryId, SummaryPredicate, SummaryStatistics};
use crate::store::{RecordStore, StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vector-backed store; also the snapshot format of [`super::JsonFileStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    next_summary_id: u64,
    summaries: Vec<FileSummary>,
    records: Vec<MeasurementRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> &[FileSummary] {
        &self.summaries
    }

    pub fn records(&self) -> &[MeasurementRecord] {
        &self.records
    }

    pub fn records_for_file<'a>(
        &'a self,
        source_file_name: &'a str,
    ) -> impl Iterator<Item = &'a MeasurementRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.source_file_name == source_file_name)
    }

    fn summary_exists(&self, id: SummaryId) -> bool {
        self.summaries.iter().any(|s| s.id == id)
    }
}

impl RecordStore for InMemoryStore {
    fn insert_records(&mut self, records: &[MeasurementRecord]) -> StoreResult<usize> {
        // Check the whole slice first so a bad row leaves the store untouched
        for record in records {
            record
                .validate()
                .map_err(|e| StoreError::Constraint(e.to_string()))?;
            if let Some(id) = record.summary_id {
                if !self.summary_exists(id) {
                    return Err(StoreError::SummaryNotFound(id));
                }
            }
        }

        self.records.extend_from_slice(records);
        Ok(records.len())
    }

    fn find_summary_by_name(&self, source_file_name: &str) -> StoreResult<Option<FileSummary>> {
        Ok(self
            .summaries
            .iter()
            .find(|s| s.source_file_name == source_file_name)
            .cloned())
    }

    fn insert_summary(
        &mut self,
        source_file_name: &str,
        statistics: &SummaryStatistics,
    ) -> StoreResult<FileSummary> {
        if self.find_summary_by_name(source_file_name)?.is_some() {
            return Err(StoreError::Constraint(format!(
                "summary for '{}' already exists",
                source_file_name
            )));
        }

        self.next_summary_id += 1;
        let summary = FileSummary::new(
            SummaryId(self.next_summary_id),
            source_file_name.to_string(),
            statistics.clone(),
        );
        summary
            .validate()
            .map_err(|e| StoreError::Constraint(e.to_string()))?;

        self.summaries.push(summary.clone());
        Ok(summary)
    }

    fn update_summary(&mut self, summary: &FileSummary) -> StoreResult<()> {
        summary
            .validate()
            .map_err(|e| StoreError::Constraint(e.to_string()))?;

        let name_taken = self
            .summaries
            .iter()
            .any(|s| s.id != summary.id && s.source_file_name == summary.source_file_name);
        if name_taken {
            return Err(StoreError::Constraint(format!(
                "summary for '{}' already exists",
                summary.source_file_name
            )));
        }

        let slot = self
            .summaries
            .iter_mut()
            .find(|s| s.id == summary.id)
            .ok_or(StoreError::SummaryNotFound(summary.id))?;
        *slot = summary.clone();
        Ok(())
    }

    fn link_unlinked_records(
        &mut self,
        source_file_name: &str,
        summary_id: SummaryId,
    ) -> StoreResult<usize> {
        if !self.summary_exists(summary_id) {
            return Err(StoreError::SummaryNotFound(summary_id));
        }

        let mut linked = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| !r.is_linked() && r.source_file_name == source_file_name)
        {
            record.link(summary_id);
            linked += 1;
        }
        Ok(linked)
    }

    fn delete_records_for_summary(&mut self, summary_id: SummaryId) -> StoreResult<usize> {
        let before = self.records.len();
        self.records.retain(|r| r.summary_id != Some(summary_id));
        Ok(before - self.records.len())
    }

    fn query_summaries(&self, predicate: &SummaryPredicate) -> StoreResult<Vec<FileSummary>> {
        Ok(self
            .summaries
            .iter()
            .filter(|s| predicate.matches(s))
            .cloned()
            .collect())
    }

    fn latest_records_for_summary(
        &self,
        summary_id: SummaryId,
        limit: usize,
    ) -> StoreResult<Vec<MeasurementRecord>> {
        let mut linked: Vec<MeasurementRecord> = self
            .records
            .iter()
            .filter(|r| r.summary_id == Some(summary_id))
            .cloned()
            .collect();

        linked.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        linked.truncate(limit);
        Ok(linked)
    }
}
