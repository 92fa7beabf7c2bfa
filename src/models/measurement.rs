use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::SummaryId;

/// One validated data row of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MeasurementRecord {
    pub timestamp: DateTime<Utc>,

    #[validate(range(min = 0.0))]
    pub execution_time: f64,

    #[validate(range(min = 0.0))]
    pub value: f64,

    #[validate(length(min = 1))]
    pub source_file_name: String,

    /// Unset until the record is linked to the summary of its file.
    pub summary_id: Option<SummaryId>,
}

impl MeasurementRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        execution_time: f64,
        value: f64,
        source_file_name: String,
    ) -> Self {
        Self {
            timestamp,
            execution_time,
            value,
            source_file_name,
            summary_id: None,
        }
    }

    pub fn is_linked(&self) -> bool {
        self.summary_id.is_some()
    }

    pub fn link(&mut self, summary_id: SummaryId) {
        self.summary_id = Some(summary_id);
    }
}
