use crate::config::Settings;
use crate::error::Result;
use crate::models::{FileSummary, MeasurementRecord, SummaryFilter};
use crate::store::RecordStore;
use crate::utils::constants::LAST_RECORDS_LIMIT;
use tracing::info;

/// Why a query came back empty. An empty result is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatchReason {
    NoSummaries,
    UnknownFile(String),
    NoLinkedRecords(String),
}

impl std::fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoMatchReason::NoSummaries => write!(f, "No summaries match the given filters"),
            NoMatchReason::UnknownFile(name) => write!(f, "No summary exists for '{}'", name),
            NoMatchReason::NoLinkedRecords(name) => {
                write!(f, "Summary for '{}' has no linked records", name)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Matches(Vec<T>),
    NoMatch(NoMatchReason),
}

impl<T> QueryOutcome<T> {
    fn from_rows(rows: Vec<T>, reason: impl FnOnce() -> NoMatchReason) -> Self {
        if rows.is_empty() {
            QueryOutcome::NoMatch(reason())
        } else {
            QueryOutcome::Matches(rows)
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, QueryOutcome::NoMatch(_))
    }

    pub fn into_matches(self) -> Option<Vec<T>> {
        match self {
            QueryOutcome::Matches(rows) => Some(rows),
            QueryOutcome::NoMatch(_) => None,
        }
    }
}

/// Read side: filtered summaries and the newest rows of a file.
pub struct QueryService {
    last_records_limit: usize,
}

impl QueryService {
    pub fn new() -> Self {
        Self {
            last_records_limit: LAST_RECORDS_LIMIT,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new().with_last_records_limit(settings.last_records_limit)
    }

    pub fn with_last_records_limit(mut self, limit: usize) -> Self {
        self.last_records_limit = limit;
        self
    }

    pub fn query_summaries<S>(
        &self,
        store: &S,
        filter: &SummaryFilter,
    ) -> Result<QueryOutcome<FileSummary>>
    where
        S: RecordStore + ?Sized,
    {
        let predicate = filter.predicate();
        let summaries = store.query_summaries(&predicate)?;

        info!(
            conditions = predicate.conditions().len(),
            matches = summaries.len(),
            "Queried summaries"
        );

        Ok(QueryOutcome::from_rows(summaries, || NoMatchReason::NoSummaries))
    }

    /// The newest records linked to `file_name`'s summary, newest first.
    pub fn query_last_records<S>(
        &self,
        store: &S,
        file_name: &str,
    ) -> Result<QueryOutcome<MeasurementRecord>>
    where
        S: RecordStore + ?Sized,
    {
        let Some(summary) = store.find_summary_by_name(file_name)? else {
            return Ok(QueryOutcome::NoMatch(NoMatchReason::UnknownFile(
                file_name.to_string(),
            )));
        };

        let records = store.latest_records_for_summary(summary.id, self.last_records_limit)?;
        info!(file = file_name, rows = records.len(), "Queried last records");

        Ok(QueryOutcome::from_rows(records, || {
            NoMatchReason::NoLinkedRecords(file_name.to_string())
        }))
    }
}

impl Default for QueryService {
    fn default() -> Self {
        Self::new()
    }
}
