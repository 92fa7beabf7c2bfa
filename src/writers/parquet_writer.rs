use crate::error::{ProcessingError, Result};
use crate::models::{FileSummary, MeasurementRecord};
use crate::utils::constants::{
    COMPRESSION_GZIP, COMPRESSION_LZ4, COMPRESSION_NONE, COMPRESSION_SNAPPY, COMPRESSION_ZSTD,
    DEFAULT_ROW_GROUP_SIZE,
};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const UTC: &str = "UTC";

pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            COMPRESSION_SNAPPY => Compression::SNAPPY,
            COMPRESSION_GZIP => Compression::GZIP(GzipLevel::default()),
            COMPRESSION_LZ4 => Compression::LZ4,
            COMPRESSION_ZSTD => Compression::ZSTD(ZstdLevel::default()),
            COMPRESSION_NONE => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    /// Zero is treated as one; parquet rejects empty row groups.
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Write file summaries to a Parquet file
    pub fn write_summaries(&self, summaries: &[FileSummary], path: &Path) -> Result<()> {
        if summaries.is_empty() {
            return Ok(());
        }

        let schema = Self::summary_schema();
        let batch = Self::summaries_to_batch(summaries, schema.clone())?;
        self.write_batch(batch, schema, path)
    }

    /// Write measurement rows to a Parquet file
    pub fn write_records(&self, records: &[MeasurementRecord], path: &Path) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let schema = Self::record_schema();
        let batch = Self::records_to_batch(records, schema.clone())?;
        self.write_batch(batch, schema, path)
    }

    fn write_batch(&self, batch: RecordBatch, schema: Arc<Schema>, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        Ok(())
    }

    fn timestamp_type() -> DataType {
        DataType::Timestamp(TimeUnit::Microsecond, Some(UTC.into()))
    }

    fn summary_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::UInt64, false),
            Field::new("source_file_name", DataType::Utf8, false),
            Field::new("first_operation_time", Self::timestamp_type(), false),
            Field::new("average_execution_time", DataType::Float64, false),
            Field::new("average_value", DataType::Float64, false),
            Field::new("median_value", DataType::Float64, false),
            Field::new("max_value", DataType::Float64, false),
            Field::new("min_value", DataType::Float64, false),
            Field::new("time_delta_seconds", DataType::Float64, false),
        ]))
    }

    fn record_schema() -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("timestamp", Self::timestamp_type(), false),
            Field::new("execution_time", DataType::Float64, false),
            Field::new("value", DataType::Float64, false),
            Field::new("source_file_name", DataType::Utf8, false),
            Field::new("summary_id", DataType::UInt64, true),
        ]))
    }

    fn summaries_to_batch(summaries: &[FileSummary], schema: Arc<Schema>) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(UInt64Array::from_iter_values(summaries.iter().map(|s| s.id.0))),
            Arc::new(StringArray::from_iter_values(
                summaries.iter().map(|s| s.source_file_name.as_str()),
            )),
            Arc::new(
                TimestampMicrosecondArray::from_iter_values(
                    summaries
                        .iter()
                        .map(|s| s.statistics.first_operation_time.timestamp_micros()),
                )
                .with_timezone(UTC),
            ),
            float_column(summaries, |s| s.statistics.average_execution_time),
            float_column(summaries, |s| s.statistics.average_value),
            float_column(summaries, |s| s.statistics.median_value),
            float_column(summaries, |s| s.statistics.max_value),
            float_column(summaries, |s| s.statistics.min_value),
            float_column(summaries, |s| s.statistics.time_delta_seconds),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    fn records_to_batch(records: &[MeasurementRecord], schema: Arc<Schema>) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(
                TimestampMicrosecondArray::from_iter_values(
                    records.iter().map(|r| r.timestamp.timestamp_micros()),
                )
                .with_timezone(UTC),
            ),
            Arc::new(Float64Array::from_iter_values(
                records.iter().map(|r| r.execution_time),
            )),
            Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.value))),
            Arc::new(StringArray::from_iter_values(
                records.iter().map(|r| r.source_file_name.as_str()),
            )),
            Arc::new(UInt64Array::from(
                records
                    .iter()
                    .map(|r| r.summary_id.map(|id| id.0))
                    .collect::<Vec<Option<u64>>>(),
            )),
        ];

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Get file statistics
    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            file_size,
            compression: self.compression,
        })
    }
}

fn float_column(summaries: &[FileSummary], f: impl Fn(&FileSummary) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(summaries.iter().map(f)))
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Total rows: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} KB\n\
            - Compression: {:?}",
            self.total_rows,
            self.row_groups,
            self.file_size as f64 / 1024.0,
            self.compression,
        )
    }
}
