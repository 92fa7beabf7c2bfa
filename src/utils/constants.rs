/// Field delimiter of uploaded measurement files
pub const FIELD_DELIMITER: char = ';';
pub const FIELDS_PER_ROW: usize = 3;

/// Earliest accepted measurement timestamp: 2000-01-01T00:00:00Z
pub const EARLIEST_VALID_TIMESTAMP: i64 = 946_684_800;

/// Batch size bounds
pub const MIN_BATCH_ROWS: usize = 1;
pub const MAX_BATCH_ROWS: usize = 10_000;

/// Query defaults
pub const LAST_RECORDS_LIMIT: usize = 10;

/// Settings and storage defaults
pub const DEFAULT_CONFIG_FILE: &str = "measurement-processor";
pub const DEFAULT_STORE_PATH: &str = "data/store.json";
pub const ENV_PREFIX: &str = "MEASUREMENT";

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
