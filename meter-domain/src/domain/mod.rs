pub mod reading;
pub mod summary;

pub use reading::{FlaggedReading, LogRecord, MergedSeries, RawReading};
pub use summary::{hours_to_hhmm, percent_of, round2, DaySummary, MonthlyReport, MonthlyTotal, TOTAL_LABEL};
