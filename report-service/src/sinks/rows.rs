use meter_domain::domain::{MonthlyReport, TOTAL_LABEL};
use serde::Serialize;
use time::macros::format_description;

use crate::pipeline::PipelineError;

/// Header labels, in column order.
pub const COLUMN_LABELS: [&str; 8] = [
    "Data",
    "Hora Leitura",
    "Leitura do medidor em m³ acumulado",
    "Consumo (m³/dia)",
    "Tempo Total de Bombeamento (h)",
    "Tempo Total de Bombeamento (h:min)",
    "Vazão Outorgada Diária (m³)",
    "Consumo Diário x Vazão Outorgada (%)",
];

/// One display row of the summary; the total row leaves the reading columns empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub date: String,
    pub reading_time: Option<String>,
    pub accumulated_reading: Option<f64>,
    pub daily_consumption: f64,
    pub pumping_hours: f64,
    pub pumping_hhmm: String,
    pub daily_allowance: f64,
    pub percent_of_allowance: f64,
}

/// Day rows in date order followed by the `TOTAL MENSAL` row.
pub fn report_rows(report: &MonthlyReport) -> Result<Vec<ReportRow>, PipelineError> {
    let date_format = format_description!("[day]/[month]/[year]");
    let time_format = format_description!("[hour]:[minute]:[second]");
    let render = |e: time::error::Format| PipelineError::Render(format!("failed to format date/time: {e}"));

    let mut rows = Vec::with_capacity(report.days.len() + 1);
    for day in &report.days {
        rows.push(ReportRow {
            date: day.date.format(date_format).map_err(render)?,
            reading_time: Some(day.last_reading_time.format(time_format).map_err(render)?),
            accumulated_reading: Some(day.last_accumulated_flow),
            daily_consumption: day.daily_consumption,
            pumping_hours: day.pumping_duration_hours,
            pumping_hhmm: day.pumping_duration_hhmm(),
            daily_allowance: day.allowance,
            percent_of_allowance: day.percent_of_allowance,
        });
    }

    let total = &report.total;
    rows.push(ReportRow {
        date: TOTAL_LABEL.to_string(),
        reading_time: None,
        accumulated_reading: None,
        daily_consumption: total.daily_consumption,
        pumping_hours: total.pumping_duration_hours,
        pumping_hhmm: total.pumping_duration_hhmm(),
        daily_allowance: total.allowance,
        percent_of_allowance: total.percent_of_allowance,
    });

    Ok(rows)
}
