use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default Parquet export filename with format: measurement-summaries-{YYMMDD}.parquet
pub fn generate_default_parquet_filename() -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "measurement-summaries-{:02}{:02}{:02}.parquet",
        year, month, day
    );
    PathBuf::from("output").join(filename)
}

/// Use the upload's own file name unless an explicit one was supplied.
pub fn upload_file_name(explicit: Option<&str>, path: &std::path::Path) -> String {
    match explicit {
        Some(name) => name.to_string(),
        None => path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}
