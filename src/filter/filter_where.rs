use super::types::{FilterField, ReportFilters, SqlParam};

/// Accumulates `AND <column> IN (...)` fragments and their bind parameters in
/// lockstep, so the fragment text and the parameter list never drift apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterWhere {
    clauses: String,
    params: Vec<SqlParam>,
}

impl FilterWhere {
    /// Start from the parameters already bound by the base query's fixed
    /// placeholders (typically the date window).
    pub fn new(leading_params: Vec<SqlParam>) -> Self {
        Self {
            clauses: String::new(),
            params: leading_params,
        }
    }

    /// Build the clause list for `columns`, applied in the given order.
    pub fn generate(
        filters: &ReportFilters,
        columns: &[(FilterField, &str)],
        leading_params: Vec<SqlParam>,
    ) -> Self {
        let mut filter_where = Self::new(leading_params);
        filter_where.apply(filters, columns);
        filter_where
    }

    pub fn apply(&mut self, filters: &ReportFilters, columns: &[(FilterField, &str)]) -> &mut Self {
        for (field, column) in columns {
            self.push_in(column, filters.values(*field));
        }
        self
    }

    /// Absent and empty filters add nothing; `IN ()` is never emitted.
    pub fn push_in(&mut self, column: &str, values: Option<Vec<SqlParam>>) -> &mut Self {
        let Some(values) = values.filter(|v| !v.is_empty()) else {
            return self;
        };
        self.clauses.push_str(&format!(" AND {} IN ({})", column, placeholders(values.len())));
        self.params.extend(values);
        self
    }

    /// Text to splice directly after the base query's WHERE predicate.
    pub fn clauses(&self) -> &str {
        &self.clauses
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    pub fn into_params(self) -> Vec<SqlParam> {
        self.params
    }
}

pub fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}
