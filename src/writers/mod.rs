pub mod parquet_writer;
pub mod table;

pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
pub use table::{OutputFormat, TableWriter};
