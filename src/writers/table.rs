use crate::error::Result;
use crate::models::{FileSummary, MeasurementRecord};
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

const SUMMARY_HEADER: [&str; 9] = [
    "id",
    "source_file_name",
    "first_operation_time",
    "average_execution_time",
    "average_value",
    "median_value",
    "max_value",
    "min_value",
    "time_delta_seconds",
];

const RECORD_HEADER: [&str; 5] = [
    "timestamp",
    "execution_time",
    "value",
    "source_file_name",
    "summary_id",
];

/// Renders query results for the terminal or for piping.
pub struct TableWriter {
    format: OutputFormat,
}

impl TableWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_summaries<W: Write>(&self, out: W, summaries: &[FileSummary]) -> Result<()> {
        let rows = summaries.iter().map(|s| {
            let st = &s.statistics;
            vec![
                s.id.to_string(),
                s.source_file_name.clone(),
                st.first_operation_time.to_rfc3339(),
                st.average_execution_time.to_string(),
                st.average_value.to_string(),
                st.median_value.to_string(),
                st.max_value.to_string(),
                st.min_value.to_string(),
                st.time_delta_seconds.to_string(),
            ]
        });

        match self.format {
            OutputFormat::Json => write_json(out, summaries),
            OutputFormat::Csv => write_csv(out, &SUMMARY_HEADER, rows),
            OutputFormat::Table => write_table(out, &SUMMARY_HEADER, rows.collect()),
        }
    }

    pub fn write_records<W: Write>(&self, out: W, records: &[MeasurementRecord]) -> Result<()> {
        let rows = records.iter().map(|r| {
            vec![
                r.timestamp.to_rfc3339(),
                r.execution_time.to_string(),
                r.value.to_string(),
                r.source_file_name.clone(),
                r.summary_id.map(|id| id.to_string()).unwrap_or_default(),
            ]
        });

        match self.format {
            OutputFormat::Json => write_json(out, records),
            OutputFormat::Csv => write_csv(out, &RECORD_HEADER, rows),
            OutputFormat::Table => write_table(out, &RECORD_HEADER, rows.collect()),
        }
    }
}

fn write_json<W: Write, T: serde::Serialize>(mut out: W, rows: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, rows)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(
    out: W,
    header: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_table<W: Write>(mut out: W, header: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(header.to_vec()))?;
    let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    writeln!(out, "{}", "-".repeat(rule_width))?;
    for row in &rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}
