pub mod pipeline;
pub mod config;
pub mod sources;
pub mod sinks;
pub mod transform;
pub mod observability;
pub mod metrics_export;

pub use pipeline::{Envelope, PipelineError, ReportPipeline, ReportSettings};

use meter_domain::domain::MonthlyReport;
use sinks::XlsxReportSink;
use sources::ZipArchiveSource;

/// Compute the monthly summary for a zip bundle of daily logs.
pub fn build_report(archive: &[u8], settings: &ReportSettings) -> Result<MonthlyReport, PipelineError> {
    let pipeline = ReportPipeline {
        source: ZipArchiveSource::from_bytes(archive),
        settings: *settings,
        sink: XlsxReportSink::default(),
    };
    pipeline.build()
}

/// Zip bundle and daily allowance (m³) in, `.xlsx` workbook bytes out.
///
/// Holds no state between calls; any error means no workbook at all.
pub fn generate_report(archive: &[u8], daily_allowance: f64) -> Result<Vec<u8>, PipelineError> {
    let pipeline = ReportPipeline {
        source: ZipArchiveSource::from_bytes(archive),
        settings: ReportSettings::new(daily_allowance),
        sink: XlsxReportSink::default(),
    };
    let (_, bytes) = pipeline.run()?;
    Ok(bytes)
}
