use time::{Date, PrimitiveDateTime, Time};

/// One row lifted out of a daily meter log, before its timestamp is parsed.
///
/// `date` and `time` are the raw text of the log's second and third fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub date: String,
    pub time: String,
    pub flow_accumulated: f64,
}

impl LogRecord {
    /// Date and time joined with a single space, e.g. `2024/01/31 23:45:00`.
    pub fn timestamp_text(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

/// A timestamped accumulated-flow reading (m³).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawReading {
    pub ts: PrimitiveDateTime,
    pub flow_accumulated: f64,
}

impl RawReading {
    pub fn date(&self) -> Date {
        self.ts.date()
    }

    pub fn time(&self) -> Time {
        self.ts.time()
    }
}

/// Readings from every file of a batch in ascending timestamp order.
///
/// Never empty. Readings sharing a timestamp keep the order in which they
/// were handed to [`MergedSeries::from_unsorted`].
#[derive(Debug, Clone)]
pub struct MergedSeries {
    readings: Vec<RawReading>,
}

impl MergedSeries {
    /// Stable-sorts `readings` by timestamp. Returns `None` for an empty batch.
    pub fn from_unsorted(mut readings: Vec<RawReading>) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }
        readings.sort_by_key(|r| r.ts);
        Some(Self { readings })
    }

    pub fn readings(&self) -> &[RawReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn first(&self) -> &RawReading {
        &self.readings[0]
    }

    pub fn last(&self) -> &RawReading {
        &self.readings[self.readings.len() - 1]
    }
}

/// A reading plus the step from its predecessor in the merged series.
///
/// `delta` is `None` only for the first reading of the series, which is
/// therefore never a pump event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlaggedReading {
    pub reading: RawReading,
    pub delta: Option<f64>,
    pub pump_on: bool,
}
