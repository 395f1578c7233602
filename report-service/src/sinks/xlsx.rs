use meter_domain::domain::MonthlyReport;
use rust_xlsxwriter::{
    Chart, ChartType, Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};

use crate::pipeline::{PipelineError, Sink};
use crate::sinks::rows::{report_rows, ReportRow, COLUMN_LABELS};

pub const DEFAULT_SHEET_NAME: &str = "Resumo Mensal";

const COLUMN_WIDTHS: [f64; 8] = [18.0, 18.0, 35.0, 20.0, 30.0, 35.0, 30.0, 40.0];

// Zero-based column indexes used by the chart.
const DATE_COL: u16 = 0;
const CONSUMPTION_COL: u16 = 3;
const ALLOWANCE_COL: u16 = 6;

struct Formats {
    header: Format,
    text: Format,
    integer: Format,
    decimal: Format,
}

impl Formats {
    fn new() -> Self {
        let centered = Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        Self {
            header: Format::new()
                .set_bold()
                .set_text_wrap()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_background_color(Color::RGB(0xDCE6F1))
                .set_border(FormatBorder::Thin),
            text: centered.clone().set_num_format("@"),
            integer: centered.clone().set_num_format("#,##0"),
            decimal: centered.set_num_format("#,#00.00"),
        }
    }
}

/// Renders the summary as a single-sheet `.xlsx` workbook with a
/// consumption-versus-allowance column chart.
pub struct XlsxReportSink {
    sheet_name: String,
}

impl Default for XlsxReportSink {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl XlsxReportSink {
    pub fn new<S: Into<String>>(sheet_name: S) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }

    fn render(&self, rows: &[ReportRow], day_count: usize) -> Result<Vec<u8>, XlsxError> {
        let formats = Formats::new();
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&self.sheet_name)?;

        for (col, (label, width)) in COLUMN_LABELS.iter().zip(COLUMN_WIDTHS).enumerate() {
            let col = col as u16;
            worksheet.set_column_width(col, width)?;
            worksheet.write_string_with_format(0, col, *label, &formats.header)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            write_row(worksheet, idx as u32 + 1, row, &formats)?;
        }

        if day_count > 0 {
            let chart = self.consumption_chart(day_count as u32);
            worksheet.insert_chart(1, 9, &chart)?;
        }

        workbook.save_to_buffer()
    }

    /// Day rows only: sheet rows 1..=day_count, the total row is left out.
    fn consumption_chart(&self, day_count: u32) -> Chart {
        let sheet = self.sheet_name.as_str();
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_name((sheet, 0, CONSUMPTION_COL))
            .set_categories((sheet, 1, DATE_COL, day_count, DATE_COL))
            .set_values((sheet, 1, CONSUMPTION_COL, day_count, CONSUMPTION_COL));
        chart
            .add_series()
            .set_name((sheet, 0, ALLOWANCE_COL))
            .set_values((sheet, 1, ALLOWANCE_COL, day_count, ALLOWANCE_COL));
        chart.title().set_name("Consumo Diário X Vazão Outorgada");
        chart.x_axis().set_name("Dia");
        chart.y_axis().set_name("Volume (m³)");
        // 1.5x the default 480x288 chart.
        chart.set_width(720).set_height(432);
        chart
    }
}

fn write_optional_number(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> Result<(), XlsxError> {
    match value {
        Some(v) => worksheet.write_number_with_format(row, col, v, format)?,
        None => worksheet.write_blank(row, col, format)?,
    };
    Ok(())
}

fn write_row(worksheet: &mut Worksheet, r: u32, row: &ReportRow, formats: &Formats) -> Result<(), XlsxError> {
    worksheet.write_string_with_format(r, 0, &row.date, &formats.text)?;
    match &row.reading_time {
        Some(t) => worksheet.write_string_with_format(r, 1, t, &formats.text)?,
        None => worksheet.write_blank(r, 1, &formats.text)?,
    };
    write_optional_number(worksheet, r, 2, row.accumulated_reading, &formats.integer)?;
    worksheet.write_number_with_format(r, 3, row.daily_consumption, &formats.integer)?;
    worksheet.write_number_with_format(r, 4, row.pumping_hours, &formats.decimal)?;
    worksheet.write_string_with_format(r, 5, &row.pumping_hhmm, &formats.text)?;
    worksheet.write_number_with_format(r, 6, row.daily_allowance, &formats.integer)?;
    worksheet.write_number_with_format(r, 7, row.percent_of_allowance, &formats.decimal)?;
    Ok(())
}

impl Sink<MonthlyReport> for XlsxReportSink {
    type Output = Vec<u8>;

    fn run(&self, input: &MonthlyReport) -> Result<Vec<u8>, PipelineError> {
        let rows = report_rows(input)?;
        let bytes = self
            .render(&rows, input.days.len())
            .map_err(|e| PipelineError::Render(format!("failed to build workbook: {e}")))?;
        tracing::info!(rows = rows.len(), bytes = bytes.len(), "workbook rendered");
        Ok(bytes)
    }
}
