use meter_domain::domain::{FlaggedReading, MergedSeries, RawReading};
use serde::Deserialize;

use crate::pipeline::{PipelineError, Transform};

/// How pump cycles show up in the accumulated-flow series.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PumpSettings {
    /// Minimum step (m³) between consecutive readings that counts as a cycle.
    pub step_threshold: f64,
    /// Length of one pump cycle.
    pub cycle_minutes: u32,
}

impl Default for PumpSettings {
    fn default() -> Self {
        Self {
            step_threshold: 2.0,
            cycle_minutes: 15,
        }
    }
}

impl PumpSettings {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.step_threshold.is_finite() || self.step_threshold <= 0.0 {
            return Err(PipelineError::Config(format!(
                "pump step threshold must be a positive number, got {}",
                self.step_threshold
            )));
        }
        Ok(())
    }
}

/// Flag every reading whose step from its predecessor reaches `threshold`.
///
/// The first reading has no predecessor and is never flagged.
pub fn flag_pump_events(readings: &[RawReading], threshold: f64) -> Vec<FlaggedReading> {
    let mut flagged = Vec::with_capacity(readings.len());
    let mut previous: Option<f64> = None;

    for reading in readings {
        let delta = previous.map(|p| reading.flow_accumulated - p);
        flagged.push(FlaggedReading {
            reading: *reading,
            delta,
            pump_on: delta.is_some_and(|d| d >= threshold),
        });
        previous = Some(reading.flow_accumulated);
    }

    flagged
}

#[derive(Clone)]
pub struct PumpDetector {
    settings: PumpSettings,
}

impl PumpDetector {
    pub fn new(settings: PumpSettings) -> Self {
        Self { settings }
    }
}

impl Transform<MergedSeries, Vec<FlaggedReading>> for PumpDetector {
    fn apply(&self, input: MergedSeries) -> Result<Vec<FlaggedReading>, PipelineError> {
        let flagged = flag_pump_events(input.readings(), self.settings.step_threshold);
        let events = flagged.iter().filter(|f| f.pump_on).count();
        metrics::counter!("pump_events_detected_total").increment(events as u64);
        tracing::debug!(events, threshold = self.settings.step_threshold, "pump events detected");
        Ok(flagged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn series(flows: &[f64]) -> Vec<RawReading> {
        let start = datetime!(2024-01-01 00:00:00);
        flows
            .iter()
            .enumerate()
            .map(|(i, &flow)| RawReading {
                ts: start + Duration::minutes(15 * i as i64),
                flow_accumulated: flow,
            })
            .collect()
    }

    #[test]
    fn first_reading_is_never_flagged() {
        let flagged = flag_pump_events(&series(&[500.0]), 2.0);
        assert_eq!(flagged.len(), 1);
        assert!(!flagged[0].pump_on);
        assert_eq!(flagged[0].delta, None);
    }

    #[test]
    fn threshold_is_inclusive() {
        let flagged = flag_pump_events(&series(&[100.0, 102.0, 105.0, 106.5, 106.5]), 2.0);
        let flags: Vec<bool> = flagged.iter().map(|f| f.pump_on).collect();
        assert_eq!(flags, vec![false, true, true, false, false]);
        assert_eq!(flagged[2].delta, Some(3.0));
    }

    #[test]
    fn meter_rollback_is_not_a_pump_event() {
        let flagged = flag_pump_events(&series(&[100.0, 10.0, 12.0]), 2.0);
        let flags: Vec<bool> = flagged.iter().map(|f| f.pump_on).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn detector_uses_configured_threshold() {
        let merged = MergedSeries::from_unsorted(series(&[0.0, 3.0, 8.0])).expect("series");
        let detector = PumpDetector::new(PumpSettings {
            step_threshold: 5.0,
            cycle_minutes: 15,
        });
        let flagged = detector.apply(merged).expect("flagged");
        let flags: Vec<bool> = flagged.iter().map(|f| f.pump_on).collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn settings_reject_non_positive_threshold() {
        let settings = PumpSettings {
            step_threshold: 0.0,
            cycle_minutes: 15,
        };
        assert!(matches!(settings.validate(), Err(PipelineError::Config(_))));
    }
}
