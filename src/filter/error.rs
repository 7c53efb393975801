use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid date range: data_inicio {start} is after data_fim {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Date {date} cannot be moved back {days} days")]
    DateOutOfRange { date: NaiveDate, days: i64 },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
