use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::models::FileSummary;

/// Optional query filters over stored summaries.
///
/// Each range only takes part in the query when both ends are present and
/// `start <= end`; a partial or inverted range is ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryFilter {
    pub file_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub start_avg_value: Option<f64>,
    pub end_avg_value: Option<f64>,
    pub start_avg_execution_time: Option<f64>,
    pub end_avg_execution_time: Option<f64>,
}

impl SummaryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_time_range(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    pub fn with_avg_value_range(mut self, start: f64, end: f64) -> Self {
        self.start_avg_value = Some(start);
        self.end_avg_value = Some(end);
        self
    }

    pub fn with_avg_execution_time_range(mut self, start: f64, end: f64) -> Self {
        self.start_avg_execution_time = Some(start);
        self.end_avg_execution_time = Some(end);
        self
    }

    /// Build the conjunction of the filters that are active.
    pub fn predicate(&self) -> SummaryPredicate {
        let mut predicate = SummaryPredicate::all();

        if let Some(name) = self.file_name.as_deref().filter(|n| !n.is_empty()) {
            predicate = predicate.and(SummaryCondition::FileNameEquals(name.to_string()));
        }

        if let Some(range) = active_range(self.start_time, self.end_time) {
            predicate = predicate.and(SummaryCondition::FirstOperationTimeBetween(range));
        }

        if let Some(range) = active_range(self.start_avg_value, self.end_avg_value) {
            predicate = predicate.and(SummaryCondition::AverageValueBetween(range));
        }

        if let Some(range) =
            active_range(self.start_avg_execution_time, self.end_avg_execution_time)
        {
            predicate = predicate.and(SummaryCondition::AverageExecutionTimeBetween(range));
        }

        predicate
    }
}

fn active_range<T: PartialOrd>(start: Option<T>, end: Option<T>) -> Option<RangeInclusive<T>> {
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Some(start..=end),
        _ => None,
    }
}

/// One equality or inclusive-range test against a [`FileSummary`] field.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryCondition {
    FileNameEquals(String),
    FirstOperationTimeBetween(RangeInclusive<DateTime<Utc>>),
    AverageValueBetween(RangeInclusive<f64>),
    AverageExecutionTimeBetween(RangeInclusive<f64>),
}

impl SummaryCondition {
    pub fn matches(&self, summary: &FileSummary) -> bool {
        let stats = &summary.statistics;
        match self {
            SummaryCondition::FileNameEquals(name) => summary.source_file_name == *name,
            SummaryCondition::FirstOperationTimeBetween(range) => {
                range.contains(&stats.first_operation_time)
            }
            SummaryCondition::AverageValueBetween(range) => range.contains(&stats.average_value),
            SummaryCondition::AverageExecutionTimeBetween(range) => {
                range.contains(&stats.average_execution_time)
            }
        }
    }
}

/// Conjunction of conditions; empty means every summary matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryPredicate {
    conditions: Vec<SummaryCondition>,
}

impl SummaryPredicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: SummaryCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn conditions(&self) -> &[SummaryCondition] {
        &self.conditions
    }

    pub fn is_unrestricted(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, summary: &FileSummary) -> bool {
        self.conditions.iter().all(|c| c.matches(summary))
    }
}
