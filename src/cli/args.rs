use crate::models::SummaryFilter;
use crate::utils::constants::DEFAULT_ROW_GROUP_SIZE;
use crate::utils::datetime::parse_timestamp;
use crate::writers::OutputFormat;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "measurement-processor")]
#[command(about = "Validate measurement uploads and query their per-file summaries")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(long, global = true, help = "Settings file (TOML)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Store snapshot path, overrides settings")]
    pub store: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a ';'-delimited file and upsert its summary
    Ingest {
        #[arg(short, long, help = "Input file; the first line is treated as a header")]
        input: PathBuf,

        #[arg(long, help = "Source file name to record [default: input's file name]")]
        file_name: Option<String>,
    },

    /// List summaries matching optional filters
    Summaries {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show the most recent records of a file, newest first
    LastRecords {
        file_name: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Export all summaries, or all measurement records, to a Parquet file
    Export {
        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: measurement-summaries-{YYMMDD}.parquet]"
        )]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Compression [default: from settings]")]
        compression: Option<String>,

        #[arg(long, help = "Export raw measurement records instead of summaries")]
        records: bool,

        #[arg(long, default_value_t = DEFAULT_ROW_GROUP_SIZE, help = "Rows per Parquet row group")]
        row_group_size: usize,
    },
}

/// Range filters are only applied when both ends are given and ordered.
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub file_name: Option<String>,

    #[arg(long, value_parser = parse_time_arg)]
    pub start_time: Option<DateTime<Utc>>,

    #[arg(long, value_parser = parse_time_arg)]
    pub end_time: Option<DateTime<Utc>>,

    #[arg(long)]
    pub start_avg_value: Option<f64>,

    #[arg(long)]
    pub end_avg_value: Option<f64>,

    #[arg(long)]
    pub start_avg_execution_time: Option<f64>,

    #[arg(long)]
    pub end_avg_execution_time: Option<f64>,
}

impl From<FilterArgs> for SummaryFilter {
    fn from(args: FilterArgs) -> Self {
        SummaryFilter {
            file_name: args.file_name,
            start_time: args.start_time,
            end_time: args.end_time,
            start_avg_value: args.start_avg_value,
            end_avg_value: args.end_avg_value,
            start_avg_execution_time: args.start_avg_execution_time,
            end_avg_execution_time: args.end_avg_execution_time,
        }
    }
}

fn parse_time_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognised timestamp '{}'", raw))
}
