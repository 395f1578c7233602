use meter_domain::domain::{percent_of, DaySummary, MonthlyReport, MonthlyTotal};

use crate::pipeline::{PipelineError, Transform};

/// Fill allowance, consumption and percentage on each day (in order).
///
/// Day 0 has no predecessor and consumes 0 by definition.
pub fn apply_consumption(days: &mut [DaySummary], daily_allowance: f64) {
    let mut previous: Option<f64> = None;
    for day in days.iter_mut() {
        day.allowance = daily_allowance;
        day.daily_consumption = previous.map_or(0.0, |p| day.last_accumulated_flow - p);
        day.percent_of_allowance = percent_of(day.daily_consumption, day.allowance);
        previous = Some(day.last_accumulated_flow);
    }
}

/// Column sums for the `TOTAL MENSAL` row, percentage recomputed from them.
pub fn monthly_total(days: &[DaySummary]) -> MonthlyTotal {
    let daily_consumption: f64 = days.iter().map(|d| d.daily_consumption).sum();
    let allowance: f64 = days.iter().map(|d| d.allowance).sum();
    let pumping_duration_hours: f64 = days.iter().map(|d| d.pumping_duration_hours).sum();

    MonthlyTotal {
        daily_consumption,
        allowance,
        pumping_duration_hours,
        percent_of_allowance: percent_of(daily_consumption, allowance),
    }
}

#[derive(Clone)]
pub struct ConsumptionMetrics {
    daily_allowance: f64,
}

impl ConsumptionMetrics {
    pub fn new(daily_allowance: f64) -> Self {
        Self { daily_allowance }
    }
}

impl Transform<Vec<DaySummary>, MonthlyReport> for ConsumptionMetrics {
    fn apply(&self, mut days: Vec<DaySummary>) -> Result<MonthlyReport, PipelineError> {
        apply_consumption(&mut days, self.daily_allowance);
        let total = monthly_total(&days);
        Ok(MonthlyReport { days, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};
    use time::Duration;

    fn days(flows: &[f64], pump_events: &[u32]) -> Vec<DaySummary> {
        flows
            .iter()
            .zip(pump_events)
            .enumerate()
            .map(|(i, (&flow, &events))| DaySummary {
                date: date!(2024-01-01) + Duration::days(i as i64),
                last_reading_time: time!(23:45:00),
                last_accumulated_flow: flow,
                pump_event_count: events,
                pumping_duration_hours: f64::from(events) * 0.25,
                allowance: 0.0,
                daily_consumption: 0.0,
                percent_of_allowance: 0.0,
            })
            .collect()
    }

    #[test]
    fn first_day_consumes_nothing() {
        let report = ConsumptionMetrics::new(100.0)
            .apply(days(&[105.0, 108.0], &[2, 1]))
            .expect("report");

        assert_eq!(report.days[0].daily_consumption, 0.0);
        assert_eq!(report.days[0].percent_of_allowance, 0.0);
        assert_eq!(report.days[1].daily_consumption, 3.0);
        assert_eq!(report.days[1].percent_of_allowance, 3.0);
        assert!(report.days.iter().all(|d| d.allowance == 100.0));
    }

    #[test]
    fn consumption_telescopes_over_the_month() {
        let flows = [1000.0, 1012.0, 1030.0, 1031.0, 1090.0];
        let report = ConsumptionMetrics::new(50.0)
            .apply(days(&flows, &[0, 0, 0, 0, 0]))
            .expect("report");

        let summed: f64 = report.days[1..].iter().map(|d| d.daily_consumption).sum();
        assert_eq!(summed, flows[4] - flows[0]);
        assert_eq!(report.total.daily_consumption, 90.0);
    }

    #[test]
    fn zero_allowance_gives_zero_percentages() {
        let report = ConsumptionMetrics::new(0.0)
            .apply(days(&[0.0, 500.0, 900.0], &[0, 4, 2]))
            .expect("report");

        assert!(report.days.iter().all(|d| d.percent_of_allowance == 0.0));
        assert_eq!(report.total.allowance, 0.0);
        assert_eq!(report.total.percent_of_allowance, 0.0);
    }

    #[test]
    fn total_row_sums_and_recomputes_percentage() {
        let report = ConsumptionMetrics::new(9600.0)
            .apply(days(&[0.0, 4800.0, 14400.0], &[3, 2, 1]))
            .expect("report");

        assert_eq!(report.total.allowance, 28800.0);
        assert_eq!(report.total.daily_consumption, 14400.0);
        assert_eq!(report.total.percent_of_allowance, 50.0);
        assert_eq!(report.total.pumping_duration_hours, 1.5);
        assert_eq!(report.total.pumping_duration_hhmm(), "01:30");
    }

    #[test]
    fn total_pumping_time_is_converted_once_from_hours() {
        // 7 cycles spread over days: 3 x 0.25h + 4 x 0.25h = 1.75h
        let report = ConsumptionMetrics::new(1.0)
            .apply(days(&[0.0, 0.0], &[3, 4]))
            .expect("report");
        assert_eq!(report.days[0].pumping_duration_hhmm(), "00:45");
        assert_eq!(report.days[1].pumping_duration_hhmm(), "01:00");
        assert_eq!(report.total.pumping_duration_hhmm(), "01:45");
    }
}
