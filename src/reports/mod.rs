//! Report definitions: what each BI endpoint asks the tenant database, and
//! how the returned rows become the response body.

pub mod comparison;
pub mod lookups;
pub mod payables;
pub mod receivables;
pub mod sales;

use chrono::NaiveDate;
use std::collections::HashMap;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::config::ReportConfig;
use crate::database::Row;
use crate::filter::{FilterError, ReportFilters, SqlResult};
use comparison::DateWindow;

/// Everything a report needs to compose its queries.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub filters: ReportFilters,
    pub window: DateWindow,
    pub prior_window: DateWindow,
}

impl ReportContext {
    pub fn new(filters: ReportFilters, today: NaiveDate, settings: &ReportConfig) -> Result<Self, FilterError> {
        let window = DateWindow::resolve(&filters, today, settings.default_window_days)?;
        let prior_window = window.shifted_back(settings.prior_year_shift_days)?;

        Ok(Self { filters, window, prior_window })
    }

    /// Context for reports that read the calendar from the database. Explicit
    /// `data_inicio`/`data_fim` are ignored, so they can never be rejected.
    pub fn without_window(filters: ReportFilters, today: NaiveDate, settings: &ReportConfig) -> Result<Self, FilterError> {
        let undated = ReportFilters { data_inicio: None, data_fim: None, ..filters.clone() };
        let window = DateWindow::resolve(&undated, today, settings.default_window_days)?;
        let prior_window = window.shifted_back(settings.prior_year_shift_days)?;

        Ok(Self { filters, window, prior_window })
    }

    pub fn for_report<R: Report>(filters: ReportFilters, today: NaiveDate, settings: &ReportConfig) -> Result<Self, FilterError> {
        if R::USES_WINDOW {
            Self::new(filters, today, settings)
        } else {
            Self::without_window(filters, today, settings)
        }
    }
}

/// One BI endpoint. `queries` and `collect` agree on the number and order of
/// result sets.
pub trait Report: Send + Sync + 'static {
    type Output: Serialize + Send;

    /// Short name for logs
    const NAME: &'static str;

    /// Whether the queries bind `ctx.window`/`ctx.prior_window`
    const USES_WINDOW: bool = true;

    fn queries(ctx: &ReportContext) -> Vec<SqlResult>;

    fn collect(results: ResultSets) -> Self::Output;
}

/// Result sets in query order. Missing sets read as empty.
pub struct ResultSets(std::vec::IntoIter<Vec<Row>>);

impl ResultSets {
    pub fn new(results: Vec<Vec<Row>>) -> Self {
        Self(results.into_iter())
    }

    pub fn next_set(&mut self) -> Vec<Row> {
        self.0.next().unwrap_or_default()
    }

    /// First row of the next set; aggregate queries with no rows read as all-null.
    pub fn next_row(&mut self) -> Row {
        self.next_set().into_iter().next().unwrap_or_default()
    }
}

/// JSON object that keeps insertion order. Re-inserting a key replaces the
/// value in its original position.
#[derive(Debug, Clone)]
pub struct KeyedRows<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for KeyedRows<T> {
    fn default() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }
}

impl<T: PartialEq> PartialEq for KeyedRows<T> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<T> KeyedRows<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: T) {
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Default> KeyedRows<T> {
    pub fn entry_or_default(&mut self, key: String) -> &mut T {
        let position = match self.index.get(&key) {
            Some(&position) => position,
            None => {
                let position = self.entries.len();
                self.index.insert(key.clone(), position);
                self.entries.push((key, T::default()));
                position
            }
        };
        &mut self.entries[position].1
    }
}

impl<T> FromIterator<(String, T)> for KeyedRows<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let mut rows = Self::new();
        for (key, value) in iter {
            rows.insert(key, value);
        }
        rows
    }
}

impl<T: Serialize> Serialize for KeyedRows<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Cell;

    #[test]
    fn keyed_rows_keep_order_and_overwrite_in_place() {
        let mut rows = KeyedRows::new();
        rows.insert("3".to_string(), 30);
        rows.insert("1".to_string(), 10);
        rows.insert("3".to_string(), 33);

        assert_eq!(rows.keys().collect::<Vec<_>>(), vec!["3", "1"]);
        assert_eq!(rows.get("3"), Some(&33));
        assert_eq!(serde_json::to_string(&rows).unwrap(), r#"{"3":33,"1":10}"#);
    }

    #[test]
    fn large_rankings_keep_lookups_and_order() {
        let rows: KeyedRows<usize> = (0..20_000).map(|i| (format!("C{}", i % 10_000), i)).collect();

        assert_eq!(rows.len(), 10_000);
        assert_eq!(rows.get("C42"), Some(&10_042));
        assert_eq!(rows.keys().next(), Some("C0"));
        assert_eq!(rows.keys().last(), Some("C9999"));
    }

    #[test]
    fn empty_keyed_rows_serialize_as_empty_object() {
        let rows: KeyedRows<i32> = KeyedRows::new();
        assert_eq!(serde_json::to_string(&rows).unwrap(), "{}");
    }

    #[test]
    fn nested_entries_are_created_once() {
        let mut years: KeyedRows<KeyedRows<i32>> = KeyedRows::new();
        years.entry_or_default("2024".into()).insert("1".into(), 1);
        years.entry_or_default("2024".into()).insert("2".into(), 2);

        assert_eq!(years.len(), 1);
        assert_eq!(serde_json::to_string(&years).unwrap(), r#"{"2024":{"1":1,"2":2}}"#);
    }

    #[test]
    fn result_sets_pad_missing_sets() {
        let mut sets = ResultSets::new(vec![vec![Row::new(vec![Cell::Int(1)])]]);
        assert_eq!(sets.next_row().i64(0), 1);
        assert!(sets.next_set().is_empty());
        assert!(sets.next_row().is_null(0));
    }

    #[test]
    fn calendar_reports_ignore_explicit_dates() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let settings = ReportConfig { default_window_days: 30, prior_year_shift_days: 365 };
        let inverted = ReportFilters {
            data_inicio: NaiveDate::from_ymd_opt(2024, 2, 1),
            data_fim: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..Default::default()
        };

        assert!(ReportContext::for_report::<sales::KpiMesAnoReport>(inverted.clone(), today, &settings).is_ok());
        assert!(ReportContext::for_report::<sales::KpiFilialReport>(inverted, today, &settings).is_err());
    }

    #[test]
    fn context_shifts_prior_window() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let settings = ReportConfig { default_window_days: 30, prior_year_shift_days: 365 };
        let ctx = ReportContext::new(ReportFilters::default(), today, &settings).unwrap();

        assert_eq!(ctx.window.end, today);
        assert_eq!(ctx.prior_window.end, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    }
}
