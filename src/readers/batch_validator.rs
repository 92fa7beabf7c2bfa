use crate::error::{ValidationError, ValidationResult};
use crate::models::MeasurementRecord;
use crate::readers::RecordParser;
use crate::utils::constants::{MAX_BATCH_ROWS, MIN_BATCH_ROWS};
use tracing::debug;

/// Validates a whole upload: all rows are accepted or none are.
pub struct BatchValidator {
    parser: RecordParser,
    min_rows: usize,
    max_rows: usize,
}

impl BatchValidator {
    pub fn new() -> Self {
        Self {
            parser: RecordParser::new(),
            min_rows: MIN_BATCH_ROWS,
            max_rows: MAX_BATCH_ROWS,
        }
    }

    pub fn with_parser(mut self, parser: RecordParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_row_limits(mut self, min_rows: usize, max_rows: usize) -> Self {
        self.min_rows = min_rows;
        self.max_rows = max_rows;
        self
    }

    /// Parse every line after the header, stopping at the first failure.
    ///
    /// The first line is skipped unconditionally, even when it is empty. Row
    /// count bounds are only checked once every line has parsed.
    pub fn validate<I, S>(
        &self,
        lines: I,
        source_file_name: &str,
    ) -> ValidationResult<Vec<MeasurementRecord>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if source_file_name.trim().is_empty() {
            return Err(ValidationError::MissingFileName);
        }

        let records = lines
            .into_iter()
            .enumerate()
            .skip(1)
            .map(|(index, line)| {
                self.parser
                    .parse_line(line.as_ref(), index + 1, source_file_name)
            })
            .collect::<ValidationResult<Vec<_>>>()?;

        if !(self.min_rows..=self.max_rows).contains(&records.len()) {
            return Err(ValidationError::BatchSizeOutOfRange {
                count: records.len(),
                min: self.min_rows,
                max: self.max_rows,
            });
        }

        debug!(
            file = source_file_name,
            rows = records.len(),
            "Batch passed validation"
        );

        Ok(records)
    }
}

impl Default for BatchValidator {
    fn default() -> Self {
        Self::new()
    }
}
