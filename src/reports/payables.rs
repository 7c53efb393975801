//! Accounts payable reports over `VWCPTIT_BI`.

use chrono::NaiveDate;
use serde::Serialize;

use super::{KeyedRows, Report, ReportContext, ResultSets};
use crate::filter::{FilterField, FilterWhere, SqlResult};

const PAYABLE_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Fornecedor, "codfornecedor"),
    (FilterField::Transacao, "codtransacao"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BigNumbersContasPagar {
    pub pago: f64,
    pub a_pagar: f64,
    pub em_atraso: f64,
    pub a_pagar_total: f64,
}

pub struct BigNumbersContasPagarReport;

impl Report for BigNumbersContasPagarReport {
    type Output = Vec<BigNumbersContasPagar>;
    const NAME: &'static str = "big_numbers_contas_pagar";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let windowed = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, ctx.window.params());
        let overdue = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, vec![]);

        vec![
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrpago), 0) AS pago FROM vwcptit_bi \
                     WHERE datamovto >= ? AND datamovto <= ?{}",
                    windowed.clauses()
                ),
                windowed.params().to_vec(),
            ),
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrsaldo), 0) AS a_pagar FROM vwcptit_bi \
                     WHERE condicao_fatura = 'A Pagar' AND datavencto >= ? AND datavencto <= ?{}",
                    windowed.clauses()
                ),
                windowed.params().to_vec(),
            ),
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrsaldo), 0) AS em_atraso FROM vwcptit_bi \
                     WHERE condicao_fatura = 'Em Atraso'{}",
                    overdue.clauses()
                ),
                overdue.into_params(),
            ),
        ]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        let pago = results.next_row().f64(0);
        let a_pagar = results.next_row().f64(0);
        let em_atraso = results.next_row().f64(0);

        vec![BigNumbersContasPagar { pago, a_pagar, em_atraso, a_pagar_total: a_pagar + em_atraso }]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosContasPagarDiaMesAtual {
    pub pago: f64,
    pub a_pagar: f64,
}

pub struct ContasPagarDiaMesAtualReport;

impl Report for ContasPagarDiaMesAtualReport {
    type Output = KeyedRows<DadosContasPagarDiaMesAtual>;
    const NAME: &'static str = "contas_pagar_dia_mes_atual";
    const USES_WINDOW: bool = false;

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT dia, SUM(vlrpago), SUM(a_pagar)
            FROM (
                SELECT dia_movto AS dia, vlrpago, 0 AS a_pagar, codfornecedor, codtransacao
                FROM VWCPTIT_BI
                WHERE ano_movto = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero_movto = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
                UNION ALL
                SELECT dia_vencto AS dia, 0 AS vlrpago, vlrsaldo AS a_pagar, codfornecedor, codtransacao
                FROM VWCPTIT_BI
                WHERE ano_vencto = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero_vencto = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
                  AND condicao_fatura = 'A Pagar'
            ) dados
            WHERE 1=1{}
            GROUP BY dia
            ORDER BY dia
            "#,
            w.clauses()
        );
        vec![SqlResult::new(query, w.into_params())]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| (row.int_key(0), DadosContasPagarDiaMesAtual { pago: row.f64(1), a_pagar: row.f64(2) }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosAPagarFornecedor {
    pub fornecedor: Option<String>,
    pub a_pagar: f64,
}

pub struct APagarFornecedorReport;

impl Report for APagarFornecedorReport {
    type Output = KeyedRows<DadosAPagarFornecedor>;
    const NAME: &'static str = "a_pagar_fornecedor";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let open = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, ctx.window.params());
        let overdue = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT codfornecedor, fornecedor, SUM(vlrsaldo)
            FROM (
                SELECT fornecedor, vlrsaldo, codfornecedor, codtransacao, datavencto
                FROM VWCPTIT_BI
                WHERE condicao_fatura = 'A Pagar' AND datavencto >= ? AND datavencto <= ?{}
                UNION ALL
                SELECT fornecedor, vlrsaldo, codfornecedor, codtransacao, datavencto
                FROM VWCPTIT_BI
                WHERE condicao_fatura = 'Em Atraso'{}
            ) dados
            GROUP BY codfornecedor, fornecedor
            ORDER BY SUM(vlrsaldo) DESC
            "#,
            open.clauses(),
            overdue.clauses()
        );
        let mut params = open.into_params();
        params.extend(overdue.into_params());

        vec![SqlResult::new(query, params)]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| (row.text_key(0), DadosAPagarFornecedor { fornecedor: row.text(1), a_pagar: row.f64(2) }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabelaAPagar {
    pub datavencto: Option<NaiveDate>,
    pub fornecedor: Option<String>,
    pub transacao: Option<String>,
    pub a_pagar: f64,
    pub conta: Option<String>,
}

pub struct TabelaAPagarReport;

impl Report for TabelaAPagarReport {
    type Output = Vec<TabelaAPagar>;
    const NAME: &'static str = "tabela_a_pagar";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, PAYABLE_COLUMNS, ctx.window.params());
        let query = format!(
            "SELECT datavencto, fornecedor, transacao, SUM(vlrsaldo), conta \
             FROM vwcptit_bi \
             WHERE datavencto >= ? AND datavencto <= ?{} \
             GROUP BY datavencto, fornecedor, transacao, conta \
             ORDER BY datavencto DESC",
            w.clauses()
        );
        vec![SqlResult::new(query, w.into_params())]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| TabelaAPagar {
                datavencto: row.date(0),
                fornecedor: row.text(1),
                transacao: row.text(2),
                a_pagar: row.f64(3),
                conta: row.text(4),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReportConfig;
    use crate::database::{Cell, Row};
    use crate::filter::{OneOrMany, ReportFilters, SqlParam};

    fn ctx(filters: ReportFilters) -> ReportContext {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        ReportContext::new(filters, today, &ReportConfig { default_window_days: 30, prior_year_shift_days: 365 }).unwrap()
    }

    #[test]
    fn supplier_then_transaction() {
        let filters = ReportFilters {
            codtransacao: Some(OneOrMany::One(7)),
            codfornecedor: Some(OneOrMany::One("12345678000199".into())),
            ..Default::default()
        };
        let q = &TabelaAPagarReport::queries(&ctx(filters))[0];

        assert!(q.query.contains(" AND codfornecedor IN (?) AND codtransacao IN (?) GROUP BY"));
        assert_eq!(q.params[2..], [SqlParam::Text("12345678000199".into()), SqlParam::Int(7)]);
    }

    #[test]
    fn customer_filters_do_not_apply_to_payables() {
        let filters = ReportFilters { codcliente: Some(OneOrMany::One("A".into())), ..Default::default() };
        for q in BigNumbersContasPagarReport::queries(&ctx(filters)) {
            assert!(q.is_balanced());
            assert!(!q.query.contains("codcliente"));
        }
    }

    #[test]
    fn payable_total_adds_overdue() {
        let one = |v: f64| vec![Row::new(vec![Cell::Float(v)])];
        let out = BigNumbersContasPagarReport::collect(ResultSets::new(vec![one(10.0), one(20.0), one(5.0)]));
        assert_eq!(out[0].a_pagar_total, 25.0);
    }

    #[test]
    fn null_supplier_code_keys_as_empty_string() {
        let rows = vec![Row::new(vec![Cell::Null, Cell::Null, Cell::Float(42.0)])];
        let out = APagarFornecedorReport::collect(ResultSets::new(vec![rows]));
        assert_eq!(out.get("").unwrap().a_pagar, 42.0);
    }
}
