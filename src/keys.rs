use crate::parser::LogRecord;

/// The two buckets a visit is counted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationKeys {
    /// `"<DD/Mon/YYYY>,<path>"`
    pub daily: String,
    /// `"<Mon/YYYY>,<path>"`
    pub monthly: String,
}

pub fn derive_keys(record: &LogRecord) -> AggregationKeys {
    AggregationKeys {
        daily: format!("{},{}", record.day, record.path),
        monthly: format!("{},{}", month_of(&record.day), record.path),
    }
}

/// Drops the day-of-month segment: `15/Mar/2024` becomes `Mar/2024`.
/// A day without `/` is returned unchanged.
pub fn month_of(day: &str) -> &str {
    day.split_once('/').map_or(day, |(_, month)| month)
}
