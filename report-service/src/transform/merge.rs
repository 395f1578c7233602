use meter_domain::domain::{LogRecord, MergedSeries, RawReading};
use time::{macros::format_description, PrimitiveDateTime};

use crate::pipeline::{Envelope, PipelineError, Transform};

/// Parse a joined `YYYY/MM/DD HH:MM:SS` log timestamp.
///
/// Fields after the year may be written with or without a leading zero.
pub fn parse_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    let format = format_description!(
        "[year]/[month padding:none]/[day padding:none] [hour padding:none]:[minute padding:none]:[second padding:none]"
    );
    PrimitiveDateTime::parse(text, format).ok()
}

/// Joins the rows of every file into one chronological series.
///
/// Rows whose timestamp does not parse are dropped; rows sharing a timestamp
/// keep their file-arrival order.
#[derive(Clone, Default)]
pub struct SeriesMerger;

impl Transform<Vec<Envelope<LogRecord>>, MergedSeries> for SeriesMerger {
    fn apply(&self, input: Vec<Envelope<LogRecord>>) -> Result<MergedSeries, PipelineError> {
        let mut readings = Vec::with_capacity(input.len());
        let mut invalid = 0u64;

        for env in input {
            let text = env.payload.timestamp_text();
            match parse_timestamp(&text) {
                Some(ts) => readings.push(RawReading {
                    ts,
                    flow_accumulated: env.payload.flow_accumulated,
                }),
                None => {
                    invalid += 1;
                    tracing::debug!(file = %env.origin, timestamp = %text, "unparseable timestamp");
                }
            }
        }

        if invalid > 0 {
            metrics::counter!("readings_invalid_timestamp_total").increment(invalid);
            tracing::warn!(dropped = invalid, "readings without a valid timestamp dropped");
        }

        let series = MergedSeries::from_unsorted(readings).ok_or(PipelineError::NoValidTimestamps)?;
        tracing::debug!(
            readings = series.len(),
            from = %series.first().ts,
            to = %series.last().ts,
            "series merged"
        );
        Ok(series)
    }
}
