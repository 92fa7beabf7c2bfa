use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Store-assigned identity of a [`FileSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryId(pub u64);

impl std::fmt::Display for SummaryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Statistics derived from one accepted batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SummaryStatistics {
    pub first_operation_time: DateTime<Utc>,
    pub average_execution_time: f64,
    pub average_value: f64,
    pub median_value: f64,
    pub max_value: f64,
    pub min_value: f64,

    #[validate(range(min = 0.0))]
    pub time_delta_seconds: f64,
}

/// The single aggregated row kept per source file name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FileSummary {
    pub id: SummaryId,

    #[validate(length(min = 1))]
    pub source_file_name: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub statistics: SummaryStatistics,
}

impl FileSummary {
    pub fn new(id: SummaryId, source_file_name: String, statistics: SummaryStatistics) -> Self {
        Self {
            id,
            source_file_name,
            statistics,
        }
    }

    /// Overwrite every statistic; identity and file name are kept.
    pub fn replace_statistics(&mut self, statistics: SummaryStatistics) {
        self.statistics = statistics;
    }

    pub fn describe(&self) -> String {
        let s = &self.statistics;
        format!(
            "Summary #{} for '{}':\n\
            - First operation: {}\n\
            - Time span: {:.3} s\n\
            - Avg execution time: {:.4}\n\
            - Avg value: {:.4}\n\
            - Median value: {:.4}\n\
            - Min / max value: {:.4} / {:.4}",
            self.id,
            self.source_file_name,
            s.first_operation_time.to_rfc3339(),
            s.time_delta_seconds,
            s.average_execution_time,
            s.average_value,
            s.median_value,
            s.min_value,
            s.max_value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn statistics(average_value: f64) -> SummaryStatistics {
        SummaryStatistics {
            first_operation_time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            average_execution_time: 2.0,
            average_value,
            median_value: average_value,
            max_value: 7.0,
            min_value: 5.0,
            time_delta_seconds: 86400.0,
        }
    }

    #[test]
    fn test_replace_statistics_keeps_identity() {
        let mut summary = FileSummary::new(SummaryId(3), "a.csv".to_string(), statistics(6.0));
        summary.replace_statistics(statistics(10.0));

        assert_eq!(summary.id, SummaryId(3));
        assert_eq!(summary.source_file_name, "a.csv");
        assert_eq!(summary.statistics.average_value, 10.0);
    }

    #[test]
    fn test_negative_time_delta_is_invalid() {
        let mut stats = statistics(6.0);
        stats.time_delta_seconds = -1.0;
        let summary = FileSummary::new(SummaryId(1), "a.csv".to_string(), stats);
        assert!(summary.validate().is_err());
    }

    #[test]
    fn test_serializes_flat() {
        let summary = FileSummary::new(SummaryId(1), "a.csv".to_string(), statistics(6.0));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["average_value"], 6.0);
        assert!(json.get("statistics").is_none());
    }
}
