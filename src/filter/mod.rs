pub mod types;
pub mod filter_where;
pub mod error;

pub use types::*;
pub use filter_where::FilterWhere;
pub use error::FilterError;

/// Parse an optional JSON filter body. An empty body means "no filters".
pub fn parse_filters(body: &[u8]) -> Result<ReportFilters, FilterError> {
    if body.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(ReportFilters::default());
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_default_filters() {
        assert_eq!(parse_filters(b"").unwrap(), ReportFilters::default());
        assert_eq!(parse_filters(b"  \n").unwrap(), ReportFilters::default());
        assert_eq!(parse_filters(b"{}").unwrap(), ReportFilters::default());
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(matches!(parse_filters(b"{\"codfilial\":"), Err(FilterError::JsonError(_))));
    }
}
