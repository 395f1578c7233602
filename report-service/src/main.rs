use anyhow::{bail, Context, Result};
use meter_domain::domain::{LogRecord, MonthlyReport};
use report_service::{
    config::AppConfig,
    metrics_export,
    observability,
    pipeline::{PipelineError, ReportPipeline, ReportSettings, Sink, Source},
    sinks::{JsonSummarySink, XlsxReportSink},
    sources::{LogDirectorySource, ZipArchiveSource},
};
use std::{env, fs, path::PathBuf};

const USAGE: &str = "usage: report-service <archive.zip | log_dir> [daily_allowance_m3] [--json]";

fn run_pipeline<S>(source: S, settings: ReportSettings, sink: XlsxReportSink) -> Result<(MonthlyReport, Vec<u8>), PipelineError>
where
    S: Source<LogRecord>,
{
    ReportPipeline { source, settings, sink }.run()
}

/// Build the monthly water-use summary workbook from a bundle of daily meter logs.
///
/// Usage:
///   report-service <archive.zip | log_dir> [daily_allowance_m3] [--json]
fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let print_json = args.iter().any(|a| a == "--json");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();
    let Some(input) = positional.first().map(|s| PathBuf::from(s.as_str())) else {
        bail!(USAGE);
    };

    // Load configuration (REPORT_CONFIG can point to a site-specific file).
    let mut cfg = AppConfig::load()?;
    if let Some(raw) = positional.get(1) {
        cfg.report.daily_allowance_m3 = raw
            .replace(',', ".")
            .parse()
            .with_context(|| format!("invalid daily allowance '{raw}'"))?;
    }
    let settings = cfg.settings();
    settings.validate()?;

    if cfg.metrics.is_some() {
        metrics_export::init()?;
    }

    let sink = XlsxReportSink::new(cfg.report.sheet_name.clone());
    let outcome = if input.is_dir() {
        run_pipeline(LogDirectorySource::new(&input), settings, sink)
    } else {
        ZipArchiveSource::from_path(&input).and_then(|source| run_pipeline(source, settings, sink))
    };

    if let Some(metrics_cfg) = &cfg.metrics {
        if let Err(e) = metrics_export::write_textfile(&metrics_cfg.textfile_path) {
            tracing::warn!(error = %e, "failed to write metrics textfile");
        }
    }

    let (report, workbook) = match outcome {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, input = %input.display(), "no report produced");
            return Err(e.into());
        }
    };

    let output_path = &cfg.report.output_path;
    fs::write(output_path, &workbook)
        .with_context(|| format!("failed to write report to {}", output_path.display()))?;
    tracing::info!(
        path = %output_path.display(),
        days = report.days.len(),
        daily_allowance_m3 = settings.daily_allowance,
        "monthly report written"
    );

    if print_json {
        println!("{}", JsonSummarySink.run(&report)?);
    }

    Ok(())
}
