use std::collections::BTreeMap;

use meter_domain::domain::{DaySummary, FlaggedReading, RawReading};
use time::Date;

use crate::pipeline::{PipelineError, Transform};
use crate::transform::pump::PumpSettings;

struct DayAccumulator {
    last: RawReading,
    pump_events: u32,
}

/// Groups the flagged series by calendar day.
///
/// Produces the per-day facts (last reading, pump events, pumping time);
/// allowance and consumption are left at zero for [`super::ConsumptionMetrics`].
#[derive(Clone)]
pub struct DailyAggregator {
    cycle_minutes: u32,
}

impl DailyAggregator {
    pub fn new(settings: PumpSettings) -> Self {
        Self {
            cycle_minutes: settings.cycle_minutes,
        }
    }

    fn pumping_hours(&self, events: u32) -> f64 {
        f64::from(events) * f64::from(self.cycle_minutes) / 60.0
    }
}

impl Transform<Vec<FlaggedReading>, Vec<DaySummary>> for DailyAggregator {
    fn apply(&self, input: Vec<FlaggedReading>) -> Result<Vec<DaySummary>, PipelineError> {
        let mut days: BTreeMap<Date, DayAccumulator> = BTreeMap::new();

        // Input is chronological, so the last write per day wins.
        for flagged in &input {
            let acc = days.entry(flagged.reading.date()).or_insert(DayAccumulator {
                last: flagged.reading,
                pump_events: 0,
            });
            acc.last = flagged.reading;
            if flagged.pump_on {
                acc.pump_events += 1;
            }
        }

        let summaries: Vec<DaySummary> = days
            .into_iter()
            .map(|(date, acc)| DaySummary {
                date,
                last_reading_time: acc.last.time(),
                last_accumulated_flow: acc.last.flow_accumulated,
                pump_event_count: acc.pump_events,
                pumping_duration_hours: self.pumping_hours(acc.pump_events),
                allowance: 0.0,
                daily_consumption: 0.0,
                percent_of_allowance: 0.0,
            })
            .collect();

        tracing::debug!(days = summaries.len(), "readings grouped by day");
        Ok(summaries)
    }
}
