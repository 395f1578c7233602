pub mod consumption;
pub mod daily;
pub mod merge;
pub mod pump;

pub use consumption::ConsumptionMetrics;
pub use daily::DailyAggregator;
pub use merge::SeriesMerger;
pub use pump::{PumpDetector, PumpSettings};

use meter_domain::domain::LogRecord;

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Pure validation of a parsed `LogRecord`.
///
/// Rules:
/// - flow must be a finite number.
/// - flow must be non-negative (it is an accumulated meter reading).
pub fn validate_log_record(record: &LogRecord) -> Result<(), PipelineError> {
    if !record.flow_accumulated.is_finite() {
        return Err(PipelineError::InvalidReading("flow must be finite".to_string()));
    }
    if record.flow_accumulated < 0.0 {
        return Err(PipelineError::InvalidReading("flow must be non-negative".to_string()));
    }
    Ok(())
}

/// Drops records that fail [`validate_log_record`]; fails only when nothing
/// is left.
#[derive(Clone, Default)]
pub struct ReadingValidation;

impl Transform<Vec<Envelope<LogRecord>>, Vec<Envelope<LogRecord>>> for ReadingValidation {
    fn apply(&self, input: Vec<Envelope<LogRecord>>) -> Result<Vec<Envelope<LogRecord>>, PipelineError> {
        let mut kept = Vec::with_capacity(input.len());
        for env in input {
            match validate_log_record(&env.payload) {
                Ok(()) => kept.push(env),
                Err(e) => {
                    metrics::counter!("log_rows_dropped_total").increment(1);
                    tracing::debug!(error = %e, file = %env.origin, "reading rejected");
                }
            }
        }

        if kept.is_empty() {
            return Err(PipelineError::NoValidRows);
        }
        Ok(kept)
    }
}
