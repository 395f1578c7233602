use csv::ByteRecord;
use meter_domain::domain::LogRecord;

use crate::pipeline::{Envelope, PipelineError};

pub const DATE_COLUMN: usize = 1;
pub const TIME_COLUMN: usize = 2;

/// The two row layouts a meter logger writes.
///
/// Chosen once per file from its first line: any `;` there means the
/// semicolon layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLayout {
    /// `;`-separated, flow in the 5th field (decimal comma allowed).
    Semicolon,
    /// `,`-separated, flow in the 6th field.
    Comma,
}

impl LogLayout {
    pub fn detect(first_line: &[u8]) -> Self {
        if first_line.contains(&b';') {
            LogLayout::Semicolon
        } else {
            LogLayout::Comma
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            LogLayout::Semicolon => b';',
            LogLayout::Comma => b',',
        }
    }

    pub fn flow_column(self) -> usize {
        match self {
            LogLayout::Semicolon => 4,
            LogLayout::Comma => 5,
        }
    }
}

/// Rows recovered from one log file.
#[derive(Debug, Clone)]
pub struct ParsedLog {
    pub layout: LogLayout,
    pub records: Vec<LogRecord>,
    /// Rows without a numeric flow value in the layout's flow column.
    pub dropped_rows: usize,
}

/// Logs are written in ISO-8859-1, where every byte is its own code point.
fn latin1(field: &[u8]) -> String {
    field.iter().map(|&b| char::from(b)).collect()
}

/// Parse a flow value written with either a decimal point or a decimal comma.
pub fn parse_flow(s: &str) -> Option<f64> {
    s.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn record_to_log_record(record: &ByteRecord, layout: LogLayout) -> Result<LogRecord, PipelineError> {
    let flow_col = layout.flow_column();
    let flow_raw = record
        .get(flow_col)
        .map(latin1)
        .ok_or_else(|| PipelineError::InvalidReading(format!("row has no field {flow_col}")))?;
    let flow_accumulated = parse_flow(&flow_raw)
        .ok_or_else(|| PipelineError::InvalidReading(format!("non-numeric flow '{flow_raw}'")))?;

    // Both columns precede the flow column, so they exist once the flow does.
    let date = record.get(DATE_COLUMN).map(latin1).unwrap_or_default();
    let time = record.get(TIME_COLUMN).map(latin1).unwrap_or_default();

    Ok(LogRecord {
        date,
        time,
        flow_accumulated,
    })
}

/// Parse one headerless daily log.
///
/// Never fails: an empty file, a file whose rows are too short, or a file with
/// nothing numeric in its flow column simply yields no records.
pub fn parse_log(bytes: &[u8]) -> ParsedLog {
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let layout = LogLayout::detect(first_line);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(layout.delimiter())
        .from_reader(bytes);

    let mut records = Vec::new();
    let mut dropped_rows = 0;
    for result in rdr.byte_records() {
        let parsed = result
            .map_err(|e| PipelineError::InvalidReading(format!("unreadable row: {e}")))
            .and_then(|record| record_to_log_record(&record, layout));
        match parsed {
            Ok(rec) => records.push(rec),
            Err(e) => {
                tracing::trace!(error = %e, "dropping log row");
                dropped_rows += 1;
            }
        }
    }

    ParsedLog {
        layout,
        records,
        dropped_rows,
    }
}

pub fn is_log_file_name(name: &str) -> bool {
    name.to_ascii_uppercase().ends_with(".CSV")
}

/// Per-batch diagnostics collected while reading log files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub files_read: usize,
    pub files_skipped: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

/// Accumulates parsed rows from the files of one batch, in the order the
/// files are pushed.
#[derive(Debug, Default)]
pub struct LogBatch {
    records: Vec<Envelope<LogRecord>>,
    stats: BatchStats,
}

impl LogBatch {
    pub fn push_file(&mut self, name: &str, bytes: &[u8]) {
        let parsed = parse_log(bytes);
        self.stats.files_read += 1;
        self.stats.rows_dropped += parsed.dropped_rows;
        if parsed.dropped_rows > 0 {
            metrics::counter!("log_rows_dropped_total").increment(parsed.dropped_rows as u64);
        }

        if parsed.records.is_empty() {
            tracing::warn!(file = name, layout = ?parsed.layout, "log file has no usable rows, skipping");
            metrics::counter!("log_files_skipped_total").increment(1);
            self.stats.files_skipped += 1;
            return;
        }

        tracing::debug!(
            file = name,
            layout = ?parsed.layout,
            rows = parsed.records.len(),
            dropped_rows = parsed.dropped_rows,
            "log file parsed"
        );
        self.stats.rows_kept += parsed.records.len();
        self.records.extend(parsed.records.into_iter().map(|payload| Envelope {
            payload,
            origin: name.to_string(),
        }));
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    /// Hand over the collected rows; an empty batch is terminal.
    pub fn finish(self) -> Result<Vec<Envelope<LogRecord>>, PipelineError> {
        tracing::info!(
            files = self.stats.files_read,
            skipped_files = self.stats.files_skipped,
            rows = self.stats.rows_kept,
            dropped_rows = self.stats.rows_dropped,
            "log batch read"
        );
        if self.records.is_empty() {
            return Err(PipelineError::NoValidRows);
        }
        Ok(self.records)
    }
}
