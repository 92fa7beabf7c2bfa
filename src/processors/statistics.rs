use crate::error::{ProcessingError, Result};
use crate::models::{MeasurementRecord, SummaryStatistics};

/// Computes the per-file summary statistics of an accepted batch.
pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Aggregate a non-empty batch. An empty batch is an error, never a zeroed summary.
    pub fn aggregate(&self, records: &[MeasurementRecord]) -> Result<SummaryStatistics> {
        let first = records.first().ok_or(ProcessingError::EmptyBatch)?;

        let mut min_time = first.timestamp;
        let mut max_time = first.timestamp;
        let mut min_value = f64::INFINITY;
        let mut max_value = f64::NEG_INFINITY;
        // Running means stay finite for any finite input, unlike a plain sum
        let mut execution_mean = 0.0f64;
        let mut value_mean = 0.0f64;

        for (index, record) in records.iter().enumerate() {
            min_time = min_time.min(record.timestamp);
            max_time = max_time.max(record.timestamp);
            min_value = min_value.min(record.value);
            max_value = max_value.max(record.value);

            let n = (index + 1) as f64;
            execution_mean += (record.execution_time - execution_mean) / n;
            value_mean += (record.value - value_mean) / n;
        }

        let mut values: Vec<f64> = records.iter().map(|r| r.value).collect();
        let median_value = median(&mut values).ok_or(ProcessingError::EmptyBatch)?;

        let time_delta_seconds = (max_time - min_time)
            .to_std()
            .map(|span| span.as_secs_f64())
            .unwrap_or(0.0);

        let statistics = SummaryStatistics {
            first_operation_time: min_time,
            average_execution_time: execution_mean,
            average_value: value_mean,
            median_value,
            max_value,
            min_value,
            time_delta_seconds,
        };
        ensure_finite(&statistics)?;

        Ok(statistics)
    }
}

/// Stores serialise non-finite floats as `null`, which they cannot read back.
fn ensure_finite(statistics: &SummaryStatistics) -> Result<()> {
    let fields = [
        ("average_execution_time", statistics.average_execution_time),
        ("average_value", statistics.average_value),
        ("median_value", statistics.median_value),
        ("max_value", statistics.max_value),
        ("min_value", statistics.min_value),
        ("time_delta_seconds", statistics.time_delta_seconds),
    ];

    match fields.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(ProcessingError::InvalidFormat(format!(
            "{} is not finite ({})",
            name, value
        ))),
        None => Ok(()),
    }
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Median of `values`, sorting them in place. Even counts average the two middle values.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;

    if values.len() % 2 == 0 {
        let (lo, hi) = (values[mid - 1], values[mid]);
        Some(lo + (hi - lo) / 2.0)
    } else {
        Some(values[mid])
    }
}
