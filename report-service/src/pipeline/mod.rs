use meter_domain::domain::{LogRecord, MonthlyReport};

use crate::transform::{
    ConsumptionMetrics, DailyAggregator, PumpDetector, PumpSettings, ReadingValidation, SeriesMerger,
};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    /// Name of the log file the payload was read from.
    pub origin: String,
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("no .csv files found in input")]
    NoInputFiles,
    #[error("no valid rows could be extracted from the input files")]
    NoValidRows,
    #[error("no reading carries a valid timestamp")]
    NoValidTimestamps,
    /// Row-level rejection. Stages drop the row and keep going.
    #[error("invalid reading: {0}")]
    InvalidReading(String),
    #[error("archive error: {0}")]
    Archive(String),
    #[error("render error: {0}")]
    Render(String),
    #[error("config error: {0}")]
    Config(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait Source<T> {
    fn read(&self) -> Result<Vec<Envelope<T>>, PipelineError>;
}

pub trait Transform<I, O> {
    fn apply(&self, input: I) -> Result<O, PipelineError>;
}

pub trait Sink<T> {
    type Output;

    fn run(&self, input: &T) -> Result<Self::Output, PipelineError>;
}

/// Caller-supplied knobs for one report run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSettings {
    /// Daily allowance in m³, applied to every day.
    pub daily_allowance: f64,
    pub pump: PumpSettings,
}

impl ReportSettings {
    pub fn new(daily_allowance: f64) -> Self {
        Self {
            daily_allowance,
            pump: PumpSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.daily_allowance.is_finite() || self.daily_allowance < 0.0 {
            return Err(PipelineError::Config(format!(
                "daily allowance must be a non-negative number, got {}",
                self.daily_allowance
            )));
        }
        self.pump.validate()
    }
}

/// Log files in, one rendered report out.
///
/// Every stage runs to completion before the next starts; the first stage
/// error aborts the run and nothing reaches the sink.
pub struct ReportPipeline<S, K> {
    pub source: S,
    pub settings: ReportSettings,
    pub sink: K,
}

impl<S, K> ReportPipeline<S, K>
where
    S: Source<LogRecord>,
    K: Sink<MonthlyReport>,
{
    /// Run every stage up to, but not including, the sink.
    pub fn build(&self) -> Result<MonthlyReport, PipelineError> {
        self.settings.validate()?;

        let records = self.source.read()?;
        let records = ReadingValidation.apply(records)?;
        let series = SeriesMerger.apply(records)?;
        let flagged = PumpDetector::new(self.settings.pump).apply(series)?;
        let days = DailyAggregator::new(self.settings.pump).apply(flagged)?;
        let report = ConsumptionMetrics::new(self.settings.daily_allowance).apply(days)?;

        tracing::info!(
            days = report.days.len(),
            consumption_m3 = report.total.daily_consumption,
            percent_of_allowance = report.total.percent_of_allowance,
            "monthly summary computed"
        );
        Ok(report)
    }

    pub fn run(&self) -> Result<(MonthlyReport, K::Output), PipelineError> {
        let report = self.build()?;
        let output = self.sink.run(&report)?;
        metrics::counter!("reports_generated_total").increment(1);
        Ok((report, output))
    }
}
