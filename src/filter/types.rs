use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A request field that accepts either a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    /// Scalar becomes a one-element list, a list passes through unchanged.
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }

    /// Absent stays absent; present values are always a list afterwards.
    pub fn normalize(value: Option<&Self>) -> Option<Vec<T>> {
        value.map(Self::to_vec)
    }
}

/// Optional filters accepted by every BI endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilters {
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub ano: Option<OneOrMany<i64>>,
    pub mes: Option<OneOrMany<i64>>,
    pub dia: Option<OneOrMany<i64>>,

    pub codfilial: Option<OneOrMany<i64>>,
    pub codcliente: Option<OneOrMany<String>>,
    pub codcid: Option<OneOrMany<i64>>,
    pub codpro: Option<OneOrMany<i64>>,
    pub regiao: Option<OneOrMany<String>>,

    // Accounts payable
    pub codfornecedor: Option<OneOrMany<String>>,
    pub codtransacao: Option<OneOrMany<i64>>,
}

/// Filterable dimensions. Each endpoint pairs them with its own column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Filial,
    Cliente,
    Cidade,
    Regiao,
    Produto,
    Ano,
    Mes,
    Dia,
    Fornecedor,
    Transacao,
}

impl ReportFilters {
    /// Normalized values of one dimension as bind parameters.
    pub fn values(&self, field: FilterField) -> Option<Vec<SqlParam>> {
        fn ints(v: &Option<OneOrMany<i64>>) -> Option<Vec<SqlParam>> {
            OneOrMany::normalize(v.as_ref()).map(|vs| vs.into_iter().map(SqlParam::Int).collect())
        }
        fn texts(v: &Option<OneOrMany<String>>) -> Option<Vec<SqlParam>> {
            OneOrMany::normalize(v.as_ref()).map(|vs| vs.into_iter().map(SqlParam::Text).collect())
        }

        match field {
            FilterField::Filial => ints(&self.codfilial),
            FilterField::Cliente => texts(&self.codcliente),
            FilterField::Cidade => ints(&self.codcid),
            FilterField::Regiao => texts(&self.regiao),
            FilterField::Produto => ints(&self.codpro),
            FilterField::Ano => ints(&self.ano),
            FilterField::Mes => ints(&self.mes),
            FilterField::Dia => ints(&self.dia),
            FilterField::Fornecedor => texts(&self.codfornecedor),
            FilterField::Transacao => ints(&self.codtransacao),
        }
    }
}

/// A positional bind parameter for tenant queries.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
    Date(NaiveDate),
}

impl From<NaiveDate> for SqlParam {
    fn from(date: NaiveDate) -> Self {
        SqlParam::Date(date)
    }
}

/// Query text plus its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

impl SqlResult {
    pub fn new(query: impl Into<String>, params: Vec<SqlParam>) -> Self {
        let result = Self { query: query.into(), params };
        debug_assert!(
            result.is_balanced(),
            "placeholder/parameter mismatch: {} placeholders, {} params",
            result.placeholder_count(),
            result.params.len()
        );
        result
    }

    /// Counts `?` placeholders outside of single-quoted literals.
    pub fn placeholder_count(&self) -> usize {
        let mut in_literal = false;
        let mut count = 0;
        for c in self.query.chars() {
            match c {
                '\'' => in_literal = !in_literal,
                '?' if !in_literal => count += 1,
                _ => {}
            }
        }
        count
    }

    pub fn is_balanced(&self) -> bool {
        self.placeholder_count() == self.params.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_absent_stays_absent() {
        assert_eq!(OneOrMany::<i64>::normalize(None), None);
    }

    #[test]
    fn normalize_scalar_becomes_single_element_list() {
        assert_eq!(OneOrMany::normalize(Some(&OneOrMany::One(7))), Some(vec![7]));
        assert_eq!(
            OneOrMany::normalize(Some(&OneOrMany::One("A".to_string()))),
            Some(vec!["A".to_string()])
        );
    }

    #[test]
    fn normalize_list_passes_through() {
        assert_eq!(OneOrMany::normalize(Some(&OneOrMany::Many(vec![3, 1, 2]))), Some(vec![3, 1, 2]));
        assert_eq!(OneOrMany::<i64>::normalize(Some(&OneOrMany::Many(vec![]))), Some(vec![]));
    }

    #[test]
    fn filters_accept_scalar_or_list_json() {
        let filters: ReportFilters = serde_json::from_value(json!({
            "data_inicio": "2024-01-01",
            "codfilial": [1, 2],
            "codcliente": "A",
            "regiao": ["SUL"],
            "ano": 2024
        }))
        .unwrap();

        assert_eq!(filters.data_inicio, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filters.values(FilterField::Filial), Some(vec![SqlParam::Int(1), SqlParam::Int(2)]));
        assert_eq!(filters.values(FilterField::Cliente), Some(vec![SqlParam::Text("A".into())]));
        assert_eq!(filters.values(FilterField::Ano), Some(vec![SqlParam::Int(2024)]));
        assert_eq!(filters.values(FilterField::Produto), None);
    }

    #[test]
    fn wrong_scalar_type_is_rejected() {
        let parsed = serde_json::from_value::<ReportFilters>(json!({ "codfilial": "abc" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn placeholder_count_ignores_literals() {
        let sql = SqlResult {
            query: "SELECT 1 FROM t WHERE a = '?' AND b = ? AND c IN (?, ?)".to_string(),
            params: vec![SqlParam::Int(1), SqlParam::Int(2), SqlParam::Int(3)],
        };
        assert_eq!(sql.placeholder_count(), 3);
        assert!(sql.is_balanced());
    }
}
