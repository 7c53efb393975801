//! Accounts receivable reports over `VWFACTRC_BI`.

use chrono::NaiveDate;
use serde::Serialize;

use super::{KeyedRows, Report, ReportContext, ResultSets};
use crate::filter::{FilterField, FilterWhere, SqlResult};

const RECEIVABLE_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cliente, "codcliente"),
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BigNumbersContasReceber {
    pub faturamento: f64,
    pub a_receber: f64,
    pub em_atraso: f64,
    pub a_receber_total: f64,
    pub prazo_medio: f64,
}

pub struct BigNumbersContasReceberReport;

impl Report for BigNumbersContasReceberReport {
    type Output = Vec<BigNumbersContasReceber>;
    const NAME: &'static str = "big_numbers_contas_receber";

    /// Received, open, overdue (any due date), average days to receive.
    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let windowed = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, ctx.window.params());
        let overdue = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, vec![]);
        let clauses = windowed.clauses();

        vec![
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrrecbto), 0) AS faturamento FROM VWFACTRC_BI \
                     WHERE datarecbto >= ? AND datarecbto <= ?{}",
                    clauses
                ),
                windowed.params().to_vec(),
            ),
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrsaldo), 0) AS a_receber FROM VWFACTRC_BI \
                     WHERE condicao_fatura = 'A Receber' AND datavencto >= ? AND datavencto <= ?{}",
                    clauses
                ),
                windowed.params().to_vec(),
            ),
            SqlResult::new(
                format!(
                    "SELECT COALESCE(SUM(vlrsaldo), 0) AS em_atraso FROM VWFACTRC_BI \
                     WHERE condicao_fatura = 'Em Atraso'{}",
                    overdue.clauses()
                ),
                overdue.params().to_vec(),
            ),
            SqlResult::new(
                format!(
                    "SELECT COALESCE(AVG(dias_recebimento), 0) AS prazo_medio FROM VWFACTRC_BI \
                     WHERE datarecbto >= ? AND datarecbto <= ? AND dias_recebimento IS NOT NULL{}",
                    clauses
                ),
                windowed.params().to_vec(),
            ),
        ]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        let faturamento = results.next_row().f64(0);
        let a_receber = results.next_row().f64(0);
        let em_atraso = results.next_row().f64(0);
        let prazo_medio = results.next_row().f64(0);

        vec![BigNumbersContasReceber {
            faturamento,
            a_receber,
            em_atraso,
            a_receber_total: a_receber + em_atraso,
            prazo_medio,
        }]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosRecebimentosDiaMesAtual {
    pub faturamento: f64,
    pub a_receber: f64,
}

pub struct RecebimentosDiaMesAtualReport;

impl Report for RecebimentosDiaMesAtualReport {
    type Output = KeyedRows<DadosRecebimentosDiaMesAtual>;
    const NAME: &'static str = "recebimentos_dia_mes_atual";
    const USES_WINDOW: bool = false;

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT dia, SUM(faturamento), SUM(a_receber)
            FROM (
                SELECT dia_recbto AS dia, vlrrecbto AS faturamento, 0 AS a_receber, codfilial, codcliente
                FROM VWFACTRC_BI
                WHERE ano_recbto = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
                UNION ALL
                SELECT dia_vencto AS dia, 0 AS faturamento, vlrsaldo AS a_receber, codfilial, codcliente
                FROM VWFACTRC_BI
                WHERE ano_vencto = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero_vencto = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
                  AND condicao_fatura = 'A Receber'
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
            .map(|row| {
                (
                    row.int_key(0),
                    DadosRecebimentosDiaMesAtual { faturamento: row.f64(1), a_receber: row.f64(2) },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosAReceberCliente {
    pub cliente: Option<String>,
    pub a_receber: f64,
}

pub struct AReceberClienteReport;

impl Report for AReceberClienteReport {
    type Output = KeyedRows<DadosAReceberCliente>;
    const NAME: &'static str = "a_receber_cliente";

    /// Open balances due in the window plus every overdue balance. Both
    /// branches carry the same filters; params follow branch order.
    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let open = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, ctx.window.params());
        let overdue = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT codcliente, cliente, SUM(vlrsaldo)
            FROM (
                SELECT cliente, vlrsaldo, codfilial, codcliente, datavencto
                FROM VWFACTRC_BI
                WHERE condicao_fatura = 'A Receber' AND datavencto >= ? AND datavencto <= ?{}
                UNION ALL
                SELECT cliente, vlrsaldo, codfilial, codcliente, datavencto
                FROM VWFACTRC_BI
                WHERE condicao_fatura = 'Em Atraso'{}
            ) dados
            GROUP BY codcliente, cliente
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
            .map(|row| (row.text_key(0), DadosAReceberCliente { cliente: row.text(1), a_receber: row.f64(2) }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabelaAReceber {
    pub datavencto: Option<NaiveDate>,
    pub cliente: Option<String>,
    pub cidade: Option<String>,
    pub coduf: Option<String>,
    pub produto: Option<String>,
    pub a_receber: f64,
    pub conta: Option<String>,
}

pub struct TabelaAReceberReport;

impl Report for TabelaAReceberReport {
    type Output = Vec<TabelaAReceber>;
    const NAME: &'static str = "tabela_a_receber";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, RECEIVABLE_COLUMNS, ctx.window.params());
        let query = format!(
            "SELECT datavencto, cliente, cidade, coduf, produto, SUM(vlrsaldo), conta \
             FROM vwfactrc_bi \
             WHERE datavencto >= ? AND datavencto <= ?{} \
             GROUP BY datavencto, cliente, cidade, coduf, produto, conta \
             ORDER BY datavencto DESC",
            w.clauses()
        );
        vec![SqlResult::new(query, w.into_params())]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| TabelaAReceber {
                datavencto: row.date(0),
                cliente: row.text(1),
                cidade: row.text(2),
                coduf: row.text(3),
                produto: row.text(4),
                a_receber: row.f64(5),
                conta: row.text(6),
            })
            .collect()
    }
}
