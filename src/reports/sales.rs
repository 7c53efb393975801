//! Freight revenue reports over `VWFACTRC_BI` (invoices received) and
//! `VWFRCTRC_BI` (freight documents issued).

use chrono::NaiveDate;
use serde::Serialize;

use super::comparison::{change_of_ratios, pct_change, ratio, DateWindow};
use super::{KeyedRows, Report, ReportContext, ResultSets};
use crate::filter::{FilterField, FilterWhere, SqlResult};

const BIG_NUMBERS_FACTRC_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cliente, "codcliente"),
    (FilterField::Cidade, "codcid"),
    (FilterField::Regiao, "regiao"),
    (FilterField::Produto, "codpro"),
    (FilterField::Ano, "ano_recbto"),
    (FilterField::Mes, "mes_numero"),
    (FilterField::Dia, "dia_recbto"),
];

const BIG_NUMBERS_FRCTRC_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cliente, "codcliente"),
    (FilterField::Cidade, "codcid"),
    (FilterField::Regiao, "regiao"),
    (FilterField::Produto, "codpro"),
    (FilterField::Ano, "ano_emissao"),
    (FilterField::Mes, "mes_numero"),
    (FilterField::Dia, "dia_emissao"),
];

/// Outer filters on the factrc/frctrc union used by the calendar KPIs.
const CALENDAR_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cidade, "codcid"),
    (FilterField::Regiao, "CAST(regiao AS VARCHAR(50))"),
    (FilterField::Ano, "ano"),
    (FilterField::Mes, "mes_numero"),
    (FilterField::Dia, "dia"),
];

const DIMENSION_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cliente, "codcliente"),
    (FilterField::Cidade, "codcid"),
    (FilterField::Regiao, "CAST(regiao AS VARCHAR(50))"),
    (FilterField::Produto, "codpro"),
    (FilterField::Ano, "ano"),
    (FilterField::Mes, "mes_numero"),
    (FilterField::Dia, "dia"),
];

const CITY_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cidade, "codcid"),
    (FilterField::Regiao, "CAST(regiao AS VARCHAR(50))"),
    (FilterField::Ano, "ano"),
    (FilterField::Mes, "mes_numero"),
    (FilterField::Dia, "dia"),
];

const INVOICE_COLUMNS: &[(FilterField, &str)] = &[
    (FilterField::Filial, "codfilial"),
    (FilterField::Cliente, "codcliente"),
    (FilterField::Regiao, "CAST(regiao AS VARCHAR(50))"),
    (FilterField::Produto, "codpro"),
];

// ---------------------------------------------------------------------------
// Big numbers

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BigNumbers {
    pub faturamento: f64,
    pub faturamento_ano_anterior: f64,
    pub volumes: f64,
    pub volumes_ano_anterior: f64,
    pub embarques: i64,
    pub embarques_ano_anterior: f64,
    pub ticket_medio: f64,
    pub ticket_medio_ano_anterior: f64,
    pub custos: f64,
    pub custos_ano_anterior: f64,
    pub pedagios: f64,
    pub pedagios_ano_anterior: f64,
    pub margem: f64,
    pub margem_ano_anterior: f64,
}

/// Freight-document totals for one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FreightTotals {
    custos: f64,
    pedagios: f64,
    volumes: f64,
    embarques: i64,
    faturados: i64,
}

impl BigNumbers {
    fn compare(faturamento: f64, faturamento_prior: f64, cur: FreightTotals, prior: FreightTotals) -> Self {
        let faturados = cur.faturados as f64;
        let faturados_prior = prior.faturados as f64;

        Self {
            faturamento,
            faturamento_ano_anterior: pct_change(faturamento, faturamento_prior),
            volumes: cur.volumes,
            volumes_ano_anterior: pct_change(cur.volumes, prior.volumes),
            embarques: cur.embarques,
            embarques_ano_anterior: pct_change(cur.embarques as f64, prior.embarques as f64),
            ticket_medio: ratio(faturamento, faturados),
            ticket_medio_ano_anterior: change_of_ratios(faturamento, faturados, faturamento_prior, faturados_prior),
            custos: cur.custos,
            custos_ano_anterior: pct_change(cur.custos, prior.custos),
            pedagios: cur.pedagios,
            pedagios_ano_anterior: pct_change(cur.pedagios, prior.pedagios),
            margem: ratio(faturamento - cur.custos, faturamento) * 100.0,
            margem_ano_anterior: change_of_ratios(
                faturamento - cur.custos,
                faturamento,
                faturamento_prior - prior.custos,
                faturamento_prior,
            ),
        }
    }
}

pub struct BigNumbersReport;

impl Report for BigNumbersReport {
    type Output = Vec<BigNumbers>;
    const NAME: &'static str = "big_numbers";

    /// Revenue current, revenue prior, freight current, freight prior.
    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let factrc = |window: &DateWindow| {
            let w = FilterWhere::generate(&ctx.filters, BIG_NUMBERS_FACTRC_COLUMNS, window.params());
            SqlResult::new(
                format!(
                    "SELECT SUM(vlrrecbto) FROM vwfactrc_bi \
                     WHERE datarecbto >= ? AND datarecbto <= ?{}",
                    w.clauses()
                ),
                w.into_params(),
            )
        };
        let frctrc = |window: &DateWindow| {
            let w = FilterWhere::generate(&ctx.filters, BIG_NUMBERS_FRCTRC_COLUMNS, window.params());
            SqlResult::new(
                format!(
                    "SELECT SUM(vlrcusto), SUM(vlrpedagio), SUM(pesofrete_ton), SUM(embarque), SUM(faturado) \
                     FROM vwfrctrc_bi \
                     WHERE dataemissao >= ? AND dataemissao <= ?{}",
                    w.clauses()
                ),
                w.into_params(),
            )
        };

        vec![
            factrc(&ctx.window),
            factrc(&ctx.prior_window),
            frctrc(&ctx.window),
            frctrc(&ctx.prior_window),
        ]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        let faturamento = results.next_row().f64(0);
        let faturamento_prior = results.next_row().f64(0);
        let freight = |row: crate::database::Row| FreightTotals {
            custos: row.f64(0),
            pedagios: row.f64(1),
            volumes: row.f64(2),
            embarques: row.i64(3),
            faturados: row.i64(4),
        };
        let cur = freight(results.next_row());
        let prior = freight(results.next_row());

        vec![BigNumbers::compare(faturamento, faturamento_prior, cur, prior)]
    }
}

// ---------------------------------------------------------------------------
// Calendar KPIs

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosMesAno {
    pub mes: String,
    pub volume: f64,
    pub embarques: i64,
    pub faturamento: f64,
}

pub struct KpiMesAnoReport;

impl Report for KpiMesAnoReport {
    type Output = KeyedRows<KeyedRows<DadosMesAno>>;
    const NAME: &'static str = "kpi_mes_ano";
    const USES_WINDOW: bool = false;

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, CALENDAR_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT ano, mes_numero, mes, SUM(volume), SUM(embarque), SUM(faturamento)
            FROM (
                SELECT ano_emissao AS ano, mes_emissao AS mes, mes_numero, dia_emissao AS dia,
                       pesofrete_ton AS volume, embarque AS embarque, 0 AS faturamento,
                       codfilial, codcid, regiao
                FROM VWFRCTRC_BI
                WHERE ano_emissao >= EXTRACT(YEAR FROM CURRENT_TIMESTAMP) - 2
                UNION ALL
                SELECT ano_recbto AS ano, mes_recbto AS mes, mes_numero, dia_recbto AS dia,
                       0 AS volume, 0 AS embarque, vlrrecbto AS faturamento,
                       codfilial, codcid, regiao
                FROM VWFACTRC_BI
                WHERE ano_recbto >= EXTRACT(YEAR FROM CURRENT_TIMESTAMP) - 2
            ) dados
            WHERE 1=1{}
            GROUP BY ano, mes, mes_numero
            ORDER BY ano, mes_numero
            "#,
            w.clauses()
        );
        vec![SqlResult::new(query, w.into_params())]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        let mut years: Self::Output = KeyedRows::new();
        for row in results.next_set() {
            years.entry_or_default(row.int_key(0)).insert(
                row.int_key(1),
                DadosMesAno {
                    mes: row.text(2).unwrap_or_else(|| "Indefinido".to_string()),
                    volume: row.f64(3),
                    embarques: row.i64(4),
                    faturamento: row.f64(5),
                },
            );
        }
        years
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosDiaMesAtual {
    pub volume: f64,
    pub embarques: i64,
    pub faturamento: f64,
}

pub struct KpiDiaMesAtualReport;

impl Report for KpiDiaMesAtualReport {
    type Output = KeyedRows<DadosDiaMesAtual>;
    const NAME: &'static str = "kpi_dia_mes_atual";
    const USES_WINDOW: bool = false;

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, CALENDAR_COLUMNS, vec![]);
        let query = format!(
            r#"
            SELECT dia, SUM(volume), SUM(embarques), SUM(faturamento)
            FROM (
                SELECT dia_emissao AS dia, pesofrete_ton AS volume, embarque AS embarques, 0 AS faturamento,
                       codfilial, codcid, regiao, mes_numero, ano_emissao AS ano
                FROM VWFRCTRC_BI
                WHERE ano_emissao = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
                UNION ALL
                SELECT dia_recbto AS dia, 0 AS volume, 0 AS embarques, vlrrecbto AS faturamento,
                       codfilial, codcid, regiao, mes_numero, ano_recbto AS ano
                FROM VWFACTRC_BI
                WHERE ano_recbto = EXTRACT(YEAR FROM CURRENT_TIMESTAMP)
                  AND mes_numero = EXTRACT(MONTH FROM CURRENT_TIMESTAMP)
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
                    DadosDiaMesAtual {
                        volume: row.f64(1),
                        embarques: row.i64(2),
                        faturamento: row.f64(3),
                    },
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Dimension KPIs (window on the operation date of either view)

/// Union of both views with every filterable column, projected as `dados`.
fn operations_union(dimension_columns: &str) -> String {
    format!(
        r#"
        SELECT {dims}, 0 AS volume, 0 AS embarques, vlrrecbto AS faturamento,
               codfilial, codcliente, codcid, regiao, codpro,
               datarecbto AS data_operacao, dia_recbto AS dia, mes_numero, ano_recbto AS ano
        FROM VWFACTRC_BI
        UNION ALL
        SELECT {dims}, pesofrete_ton AS volume, embarque AS embarques, 0 AS faturamento,
               codfilial, codcliente, codcid, regiao, codpro,
               dataemissao AS data_operacao, dia_emissao AS dia, mes_numero, ano_emissao AS ano
        FROM VWFRCTRC_BI
        "#,
        dims = dimension_columns
    )
}

fn dimension_query(
    ctx: &ReportContext,
    select: &str,
    dimension_columns: &str,
    group_by: &str,
    columns: &[(FilterField, &str)],
) -> SqlResult {
    let w = FilterWhere::generate(&ctx.filters, columns, ctx.window.params());
    let query = format!(
        "SELECT {select}, SUM(volume), SUM(embarques), SUM(faturamento) \
         FROM ({union}) dados \
         WHERE data_operacao >= ? AND data_operacao <= ?{clauses} \
         GROUP BY {group_by} \
         ORDER BY SUM(faturamento) DESC",
        select = select,
        union = operations_union(dimension_columns),
        clauses = w.clauses(),
        group_by = group_by,
    );
    SqlResult::new(query, w.into_params())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosFilial {
    pub filial: Option<String>,
    pub volume: f64,
    pub embarques: i64,
    pub faturamento: f64,
}

pub struct KpiFilialReport;

impl Report for KpiFilialReport {
    type Output = KeyedRows<DadosFilial>;
    const NAME: &'static str = "kpi_filial";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        vec![dimension_query(ctx, "codfilial, filial", "filial", "codfilial, filial", DIMENSION_COLUMNS)]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| {
                (
                    row.text_key(0),
                    DadosFilial {
                        filial: row.text(1),
                        volume: row.f64(2),
                        embarques: row.i64(3),
                        faturamento: row.f64(4),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosRegiao {
    pub volume: f64,
    pub embarques: i64,
    pub faturamento: f64,
}

pub struct KpiRegiaoReport;

impl Report for KpiRegiaoReport {
    type Output = KeyedRows<DadosRegiao>;
    const NAME: &'static str = "kpi_regiao";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        // `regiao` is already one of the union's filter columns
        let w = FilterWhere::generate(&ctx.filters, DIMENSION_COLUMNS, ctx.window.params());
        let query = format!(
            r#"
            SELECT regiao, SUM(volume), SUM(embarques), SUM(faturamento)
            FROM (
                SELECT regiao, 0 AS volume, 0 AS embarques, vlrrecbto AS faturamento,
                       codfilial, codcliente, codcid, codpro,
                       datarecbto AS data_operacao, dia_recbto AS dia, mes_numero, ano_recbto AS ano
                FROM VWFACTRC_BI
                UNION ALL
                SELECT regiao, pesofrete_ton AS volume, embarque AS embarques, 0 AS faturamento,
                       codfilial, codcliente, codcid, codpro,
                       dataemissao AS data_operacao, dia_emissao AS dia, mes_numero, ano_emissao AS ano
                FROM VWFRCTRC_BI
            ) dados
            WHERE data_operacao >= ? AND data_operacao <= ?{}
            GROUP BY regiao
            ORDER BY SUM(faturamento) DESC
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
                    row.text_key(0),
                    DadosRegiao {
                        volume: row.f64(1),
                        embarques: row.i64(2),
                        faturamento: row.f64(3),
                    },
                )
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosCidade {
    pub cidade: Option<String>,
    pub volume: f64,
    pub embarques: i64,
    pub faturamento: f64,
}

pub struct KpiCidadeReport;

impl Report for KpiCidadeReport {
    type Output = KeyedRows<DadosCidade>;
    const NAME: &'static str = "kpi_cidade";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        vec![dimension_query(
            ctx,
            "codcid, cidade || '-' || coduf",
            "cidade, coduf",
            "codcid, cidade || '-' || coduf",
            CITY_COLUMNS,
        )]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| {
                (
                    row.text_key(0),
                    DadosCidade {
                        cidade: row.text(1),
                        volume: row.f64(2),
                        embarques: row.i64(3),
                        faturamento: row.f64(4),
                    },
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Invoice KPIs (window on `datarecbto`)

fn invoice_ranking(ctx: &ReportContext, code: &str, label: &str) -> SqlResult {
    let w = FilterWhere::generate(&ctx.filters, INVOICE_COLUMNS, ctx.window.params());
    let query = format!(
        "SELECT {code}, {label}, SUM(vlrrecbto) \
         FROM (SELECT {label}, vlrrecbto, codfilial, codcliente, regiao, codpro, datarecbto FROM VWFACTRC_BI) dados \
         WHERE datarecbto >= ? AND datarecbto <= ?{clauses} \
         GROUP BY {code}, {label} \
         ORDER BY SUM(vlrrecbto) DESC",
        code = code,
        label = label,
        clauses = w.clauses(),
    );
    SqlResult::new(query, w.into_params())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosCliente {
    pub cliente: Option<String>,
    pub faturamento: f64,
}

pub struct KpiClienteReport;

impl Report for KpiClienteReport {
    type Output = KeyedRows<DadosCliente>;
    const NAME: &'static str = "kpi_cliente";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        vec![invoice_ranking(ctx, "codcliente", "cliente")]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| (row.text_key(0), DadosCliente { cliente: row.text(1), faturamento: row.f64(2) }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DadosProduto {
    pub produto: Option<String>,
    pub faturamento: f64,
}

pub struct KpiProdutoReport;

impl Report for KpiProdutoReport {
    type Output = KeyedRows<DadosProduto>;
    const NAME: &'static str = "kpi_produto";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        vec![invoice_ranking(ctx, "codpro", "produto")]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| (row.text_key(0), DadosProduto { produto: row.text(1), faturamento: row.f64(2) }))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabelaFaturamento {
    pub nrofatura: i64,
    pub anofatura: i64,
    pub datarecbto: Option<NaiveDate>,
    pub faturamento: f64,
    pub filial: Option<String>,
    pub cliente: Option<String>,
    pub cidade: Option<String>,
    pub coduf: Option<String>,
    pub produto: Option<String>,
}

pub struct TabelaFaturamentoReport;

impl Report for TabelaFaturamentoReport {
    type Output = Vec<TabelaFaturamento>;
    const NAME: &'static str = "tabela_faturamento";

    fn queries(ctx: &ReportContext) -> Vec<SqlResult> {
        let w = FilterWhere::generate(&ctx.filters, INVOICE_COLUMNS, ctx.window.params());
        let query = format!(
            "SELECT nrofatura, anofatura, datarecbto, vlrrecbto, filial, cliente, cidade, coduf, produto \
             FROM vwfactrc_bi \
             WHERE datarecbto >= ? AND datarecbto <= ?{}",
            w.clauses()
        );
        vec![SqlResult::new(query, w.into_params())]
    }

    fn collect(mut results: ResultSets) -> Self::Output {
        results
            .next_set()
            .into_iter()
            .map(|row| TabelaFaturamento {
                nrofatura: row.i64(0),
                anofatura: row.i64(1),
                datarecbto: row.date(2),
                faturamento: row.f64(3),
                filial: row.text(4),
                cliente: row.text(5),
                cidade: row.text(6),
                coduf: row.text(7),
                produto: row.text(8),
            })
            .collect()
    }
}
