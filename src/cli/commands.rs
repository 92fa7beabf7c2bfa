use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::Result;
use crate::models::SummaryFilter;
use crate::processors::{IngestService, QueryOutcome, QueryService};
use crate::readers::UploadReader;
use crate::store::JsonFileStore;
use crate::utils::filename::{generate_default_parquet_filename, upload_file_name};
use crate::utils::logging::init_logging;
use crate::utils::progress::ProgressReporter;
use crate::writers::{ParquetWriter, TableWriter};
use std::io;
use tracing::{debug, info};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    // Debug output would interleave with the spinner
    let quiet_progress = cli.verbose;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }
    debug!(store = %settings.store_path.display(), "Using store");

    match cli.command {
        Commands::Ingest { input, file_name } => {
            let file_name = upload_file_name(file_name.as_deref(), &input);
            println!("Ingesting {} as '{}'", input.display(), file_name);

            let progress = ProgressReporter::new_spinner("Reading upload...", quiet_progress);

            let reader = UploadReader::with_mmap(settings.use_mmap);
            let path = input.clone();
            let lines = tokio::task::spawn_blocking(move || reader.read_path(&path)).await??;

            progress.set_message(&format!("Validating {} lines...", lines.len()));
            let mut store = JsonFileStore::open(&settings.store_path)?;
            let service = IngestService::from_settings(&settings);

            match service.ingest_lines(&mut store, &file_name, &lines) {
                Ok(report) => {
                    progress.finish_with_message(&report.summary_line());
                    println!("\n{}", report.summary.describe());
                }
                Err(e) => {
                    progress.abandon();
                    if let Some(rejection) = e.validation() {
                        eprintln!("Upload rejected ({}): {}", rejection.kind(), rejection);
                    }
                    return Err(e);
                }
            }
        }

        Commands::Summaries { filters, format } => {
            let filter = SummaryFilter::from(filters);
            let store = JsonFileStore::open(&settings.store_path)?;

            match QueryService::from_settings(&settings).query_summaries(&store, &filter)? {
                QueryOutcome::Matches(summaries) => {
                    TableWriter::new(format).write_summaries(io::stdout().lock(), &summaries)?;
                }
                QueryOutcome::NoMatch(reason) => println!("{}", reason),
            }
        }

        Commands::LastRecords { file_name, format } => {
            let store = JsonFileStore::open(&settings.store_path)?;

            match QueryService::from_settings(&settings).query_last_records(&store, &file_name)? {
                QueryOutcome::Matches(records) => {
                    TableWriter::new(format).write_records(io::stdout().lock(), &records)?;
                }
                QueryOutcome::NoMatch(reason) => println!("{}", reason),
            }
        }

        Commands::Export {
            output,
            compression,
            records,
            row_group_size,
        } => {
            let output = output.unwrap_or_else(generate_default_parquet_filename);
            let compression = compression.unwrap_or_else(|| settings.compression.clone());

            // Create output directory if it doesn't exist
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let writer = ParquetWriter::new()
                .with_compression(&compression)?
                .with_row_group_size(row_group_size);
            let store = JsonFileStore::open(&settings.store_path)?;

            let rows = if records {
                let records = store.snapshot().records();
                if records.is_empty() {
                    println!("No records stored - nothing to export");
                    return Ok(());
                }
                writer.write_records(records, &output)?;
                records.len()
            } else {
                let outcome = QueryService::from_settings(&settings)
                    .query_summaries(&store, &SummaryFilter::new())?;
                let summaries = match outcome {
                    QueryOutcome::Matches(summaries) => summaries,
                    QueryOutcome::NoMatch(reason) => {
                        println!("{} - nothing to export", reason);
                        return Ok(());
                    }
                };
                writer.write_summaries(&summaries, &output)?;
                summaries.len()
            };
            info!(path = %output.display(), rows, records, "Exported");

            let file_info = writer.get_file_info(&output)?;
            println!("{}", file_info.summary());
        }
    }

    Ok(())
}
