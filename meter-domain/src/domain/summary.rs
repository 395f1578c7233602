use time::{Date, Time};

/// Date label of the grand-total row.
pub const TOTAL_LABEL: &str = "TOTAL MENSAL";

/// One calendar day of the monthly summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: Date,
    pub last_reading_time: Time,
    /// Meter reading (m³) at `last_reading_time`.
    pub last_accumulated_flow: f64,
    pub pump_event_count: u32,
    pub pumping_duration_hours: f64,
    /// Daily allowance (m³), identical for every day of a report.
    pub allowance: f64,
    /// Difference to the previous day's last reading; 0 on the first day.
    pub daily_consumption: f64,
    pub percent_of_allowance: f64,
}

impl DaySummary {
    pub fn pumping_duration_hhmm(&self) -> String {
        hours_to_hhmm(self.pumping_duration_hours)
    }
}

/// Column sums for the `TOTAL MENSAL` row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyTotal {
    pub daily_consumption: f64,
    pub allowance: f64,
    pub pumping_duration_hours: f64,
    pub percent_of_allowance: f64,
}

impl MonthlyTotal {
    /// Converted once from the summed hours, never from per-day text.
    pub fn pumping_duration_hhmm(&self) -> String {
        hours_to_hhmm(self.pumping_duration_hours)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyReport {
    pub days: Vec<DaySummary>,
    pub total: MonthlyTotal,
}

/// Round to two decimal places, ties to even (0.125 -> 0.12).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `consumption / allowance` as a percentage rounded to two decimals.
///
/// A zero allowance yields 0 whatever the consumption.
pub fn percent_of(consumption: f64, allowance: f64) -> f64 {
    if allowance > 0.0 {
        round2(consumption / allowance * 100.0)
    } else {
        0.0
    }
}

/// Render decimal hours as `HH:MM` (1.5 -> `01:30`).
///
/// Minutes that round up to 60 roll into the hour. Negative or non-finite
/// input renders as an empty string.
pub fn hours_to_hhmm(hours: f64) -> String {
    if !hours.is_finite() || hours < 0.0 {
        return String::new();
    }
    let whole = hours.trunc();
    let mut h = whole as u64;
    let mut m = ((hours - whole) * 60.0).round() as u64;
    if m == 60 {
        h += 1;
        m = 0;
    }
    format!("{h:02}:{m:02}")
}
