pub mod json_summary;
pub mod rows;
pub mod xlsx;

pub use json_summary::JsonSummarySink;
pub use rows::{report_rows, ReportRow, COLUMN_LABELS};
pub use xlsx::{XlsxReportSink, DEFAULT_SHEET_NAME};
