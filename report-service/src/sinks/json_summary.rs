use meter_domain::domain::MonthlyReport;

use crate::pipeline::{PipelineError, Sink};
use crate::sinks::rows::report_rows;

/// Pretty-printed JSON array of the same rows the workbook shows.
#[derive(Clone, Default)]
pub struct JsonSummarySink;

impl Sink<MonthlyReport> for JsonSummarySink {
    type Output = String;

    fn run(&self, input: &MonthlyReport) -> Result<String, PipelineError> {
        let rows = report_rows(input)?;
        serde_json::to_string_pretty(&rows)
            .map_err(|e| PipelineError::Render(format!("failed to serialize summary: {e}")))
    }
}
