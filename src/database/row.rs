use chrono::{NaiveDate, NaiveDateTime};

/// One column value as returned by a tenant database.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

/// A positional result row. Accessors never fail: missing columns and nulls
/// fall back to the type default, mismatched types are coerced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(pub Vec<Cell>);

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    fn cell(&self, index: usize) -> &Cell {
        self.0.get(index).unwrap_or(&Cell::Null)
    }

    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.cell(index), Cell::Null)
    }

    /// Null → `0.0`
    pub fn f64(&self, index: usize) -> f64 {
        match self.cell(index) {
            Cell::Int(i) => *i as f64,
            Cell::Float(f) => *f,
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
            Cell::Bool(b) => f64::from(u8::from(*b)),
            _ => 0.0,
        }
    }

    /// Null → `0`; fractional values truncate toward zero.
    pub fn i64(&self, index: usize) -> i64 {
        match self.cell(index) {
            Cell::Int(i) => *i,
            Cell::Float(f) => f.trunc() as i64,
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                    .unwrap_or(0)
            }
            Cell::Bool(b) => i64::from(*b),
            _ => 0,
        }
    }

    /// Null → `None`. Integral floats render without a fractional part.
    pub fn text(&self, index: usize) -> Option<String> {
        match self.cell(index) {
            Cell::Null => None,
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => Some((*f as i64).to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.trim_end().to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Date(d) => Some(d.to_string()),
            Cell::Timestamp(ts) => Some(ts.to_string()),
        }
    }

    /// Null → `None`
    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        match self.cell(index) {
            Cell::Date(d) => Some(*d),
            Cell::Timestamp(ts) => Some(ts.date()),
            Cell::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
            _ => None,
        }
    }

    /// Map key for numeric dimensions (day, month, year): null → `"0"`.
    pub fn int_key(&self, index: usize) -> String {
        self.i64(index).to_string()
    }

    /// Map key for coded dimensions (branch, client, ...): null → `""`.
    pub fn text_key(&self, index: usize) -> String {
        self.text(index).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(vec![
            Cell::Null,
            Cell::Int(42),
            Cell::Float(12.5),
            Cell::Text("SUL   ".into()),
            Cell::Float(3.0),
            Cell::Timestamp(NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(0, 0, 0).unwrap()),
        ])
    }

    #[test]
    fn nulls_become_type_defaults() {
        let r = row();
        assert_eq!(r.f64(0), 0.0);
        assert_eq!(r.i64(0), 0);
        assert_eq!(r.text(0), None);
        assert_eq!(r.date(0), None);
        assert!(r.is_null(0));
    }

    #[test]
    fn missing_columns_behave_like_null() {
        let r = row();
        assert_eq!(r.f64(99), 0.0);
        assert_eq!(r.text(99), None);
        assert_eq!(r.int_key(99), "0");
        assert_eq!(r.text_key(99), "");
    }

    #[test]
    fn numeric_coercions() {
        let r = row();
        assert_eq!(r.f64(1), 42.0);
        assert_eq!(r.i64(2), 12);
        assert_eq!(r.i64(4), 3);
    }

    #[test]
    fn text_rendering() {
        let r = row();
        assert_eq!(r.text(1).as_deref(), Some("42"));
        assert_eq!(r.text(3).as_deref(), Some("SUL"));
        assert_eq!(r.text(4).as_deref(), Some("3"));
        assert_eq!(r.text(2).as_deref(), Some("12.5"));
    }

    #[test]
    fn timestamps_read_as_dates() {
        assert_eq!(row().date(5), NaiveDate::from_ymd_opt(2024, 5, 6));
    }
}
