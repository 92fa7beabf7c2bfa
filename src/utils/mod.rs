pub mod constants;
pub mod datetime;
pub mod filename;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use datetime::{earliest_valid_timestamp, parse_timestamp};
pub use filename::{generate_default_parquet_filename, upload_file_name};
pub use logging::init_logging;
pub use progress::ProgressReporter;
