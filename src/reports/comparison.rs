use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::filter::{FilterError, ReportFilters, SqlParam};

/// Inclusive date range bound to a query's two leading placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// `data_fim` defaults to `today`, `data_inicio` to `default_days` before the end.
    pub fn resolve(filters: &ReportFilters, today: NaiveDate, default_days: i64) -> Result<Self, FilterError> {
        let end = filters.data_fim.unwrap_or(today);
        let start = match filters.data_inicio {
            Some(start) => start,
            None => days_before(end, default_days)?,
        };

        if start > end {
            return Err(FilterError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Same-width window `days` earlier (both bounds move together).
    pub fn shifted_back(&self, days: i64) -> Result<Self, FilterError> {
        Ok(Self {
            start: days_before(self.start, days)?,
            end: days_before(self.end, days)?,
        })
    }

    pub fn params(&self) -> Vec<SqlParam> {
        vec![SqlParam::Date(self.start), SqlParam::Date(self.end)]
    }
}

fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate, FilterError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .ok_or(FilterError::DateOutOfRange { date, days })
}

/// Percentage change from `prior` to `current`; 0 when there is no prior value.
pub fn pct_change(current: f64, prior: f64) -> f64 {
    if prior != 0.0 {
        (current / prior - 1.0) * 100.0
    } else {
        0.0
    }
}

/// `numerator / denominator`, or 0 for a zero denominator.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator != 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Percentage change between two ratios. Every denominator in the chain is
/// guarded, including the prior ratio itself.
pub fn change_of_ratios(cur_num: f64, cur_den: f64, prev_num: f64, prev_den: f64) -> f64 {
    if cur_den == 0.0 || prev_den == 0.0 || prev_num == 0.0 {
        return 0.0;
    }
    ((cur_num / cur_den) / (prev_num / prev_den) - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn window_defaults_to_last_thirty_days() {
        let w = DateWindow::resolve(&ReportFilters::default(), d(2024, 3, 31), 30).unwrap();
        assert_eq!(w, DateWindow { start: d(2024, 3, 1), end: d(2024, 3, 31) });
    }

    #[test]
    fn explicit_end_moves_default_start() {
        let filters = ReportFilters { data_fim: Some(d(2024, 2, 10)), ..Default::default() };
        let w = DateWindow::resolve(&filters, d(2030, 1, 1), 30).unwrap();
        assert_eq!(w.start, d(2024, 1, 11));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let filters = ReportFilters {
            data_inicio: Some(d(2024, 5, 2)),
            data_fim: Some(d(2024, 5, 1)),
            ..Default::default()
        };
        assert!(matches!(
            DateWindow::resolve(&filters, d(2024, 6, 1), 30),
            Err(FilterError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn prior_year_window_keeps_width() {
        let filters = ReportFilters {
            data_inicio: Some(d(2023, 1, 1)),
            data_fim: Some(d(2023, 3, 31)),
            ..Default::default()
        };
        let w = DateWindow::resolve(&filters, d(2023, 6, 1), 30).unwrap();
        let prior = w.shifted_back(365).unwrap();

        assert_eq!(prior, DateWindow { start: d(2022, 1, 1), end: d(2022, 3, 31) });
        assert_eq!(w.end - w.start, prior.end - prior.start);
    }

    #[test]
    fn dates_at_the_calendar_floor_are_rejected_not_panicking() {
        let floor = ReportFilters { data_fim: Some(NaiveDate::MIN), ..Default::default() };
        assert!(matches!(
            DateWindow::resolve(&floor, d(2024, 1, 1), 30),
            Err(FilterError::DateOutOfRange { .. })
        ));

        let explicit = ReportFilters {
            data_inicio: Some(NaiveDate::MIN),
            data_fim: Some(NaiveDate::MIN),
            ..Default::default()
        };
        let w = DateWindow::resolve(&explicit, d(2024, 1, 1), 30).unwrap();
        assert!(matches!(w.shifted_back(365), Err(FilterError::DateOutOfRange { .. })));
    }

    #[test]
    fn pct_change_examples() {
        assert_eq!(pct_change(1000.0, 800.0), 25.0);
        assert_eq!(pct_change(1000.0, 0.0), 0.0);
        assert_eq!(pct_change(0.0, 500.0), -100.0);
    }

    #[test]
    fn ratio_guards_zero() {
        assert_eq!(ratio(10.0, 4.0), 2.5);
        assert_eq!(ratio(10.0, 0.0), 0.0);
    }

    #[test]
    fn change_of_ratios_guards_every_denominator() {
        // ticket 100 -> 125
        assert_eq!(change_of_ratios(1000.0, 8.0, 800.0, 8.0), 25.0);
        assert_eq!(change_of_ratios(1000.0, 0.0, 800.0, 8.0), 0.0);
        assert_eq!(change_of_ratios(1000.0, 8.0, 800.0, 0.0), 0.0);
        // prior ratio is zero: margin was exactly 0% last year
        assert_eq!(change_of_ratios(200.0, 1000.0, 0.0, 800.0), 0.0);
    }
}
