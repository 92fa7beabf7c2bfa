use crate::error::{ValidationError, ValidationResult};
use crate::models::MeasurementRecord;
use crate::utils::constants::{FIELDS_PER_ROW, FIELD_DELIMITER};
use crate::utils::datetime::{earliest_valid_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};

/// Turns one `<date>;<executionTime>;<value>` line into a [`MeasurementRecord`].
pub struct RecordParser {
    earliest: DateTime<Utc>,
    reference_time: Option<DateTime<Utc>>,
}

impl RecordParser {
    pub fn new() -> Self {
        Self {
            earliest: earliest_valid_timestamp(),
            reference_time: None,
        }
    }

    pub fn with_earliest(mut self, earliest: DateTime<Utc>) -> Self {
        self.earliest = earliest;
        self
    }

    /// Pin the upper date bound instead of reading the clock on every line.
    pub fn with_reference_time(mut self, reference_time: DateTime<Utc>) -> Self {
        self.reference_time = Some(reference_time);
        self
    }

    /// Parse a single data line. `line_number` is 1-based and only used for reporting.
    pub fn parse_line(
        &self,
        line: &str,
        line_number: usize,
        source_file_name: &str,
    ) -> ValidationResult<MeasurementRecord> {
        let parts: Vec<&str> = line.split(FIELD_DELIMITER).collect();

        if parts.len() != FIELDS_PER_ROW {
            return Err(ValidationError::MalformedRow {
                line: line_number,
                found: parts.len(),
            });
        }

        let timestamp = self
            .parse_date(parts[0])
            .ok_or_else(|| ValidationError::InvalidDate {
                line: line_number,
                raw: parts[0].to_string(),
            })?;

        let execution_time =
            parse_non_negative(parts[1]).ok_or_else(|| ValidationError::InvalidExecutionTime {
                line: line_number,
                raw: parts[1].to_string(),
            })?;

        let value = parse_non_negative(parts[2]).ok_or_else(|| ValidationError::InvalidValue {
            line: line_number,
            raw: parts[2].to_string(),
        })?;

        Ok(MeasurementRecord::new(
            timestamp,
            execution_time,
            value,
            source_file_name.to_string(),
        ))
    }

    fn parse_date(&self, raw: &str) -> Option<DateTime<Utc>> {
        let timestamp = parse_timestamp(raw)?;
        let latest = self.reference_time.unwrap_or_else(Utc::now);

        (self.earliest..=latest)
            .contains(&timestamp)
            .then_some(timestamp)
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Finite, non-negative real; a lone decimal comma is read as a decimal point.
fn parse_non_negative(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();

    let parsed = trimmed.parse::<f64>().ok().or_else(|| {
        if trimmed.contains(',') && !trimmed.contains('.') {
            trimmed.replacen(',', ".", 1).parse::<f64>().ok()
        } else {
            None
        }
    })?;

    (parsed.is_finite() && parsed >= 0.0).then_some(parsed)
}
