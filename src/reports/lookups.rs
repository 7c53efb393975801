//! Unfiltered code/label lists that feed the dashboard's filter pickers.

use serde::Serialize;

use super::{Report, ReportContext, ResultSets};
use crate::database::Row;
use crate::filter::SqlResult;

fn code_label_pairs<T>(mut results: ResultSets, build: impl Fn(Option<String>, Option<String>) -> T) -> Vec<T> {
    results
        .next_set()
        .into_iter()
        .map(|row: Row| build(row.text(0), row.text(1)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltroFilial {
    pub codfilial: Option<String>,
    pub filial: Option<String>,
}

pub struct FiltroFilialReport;

impl Report for FiltroFilialReport {
    type Output = Vec<FiltroFilial>;
    const NAME: &'static str = "filtro_filial";
    const USES_WINDOW: bool = false;

    fn queries(_ctx: &ReportContext) -> Vec<SqlResult> {
        vec![SqlResult::new("SELECT codfil, nome FROM TBFIL", vec![])]
    }

    fn collect(results: ResultSets) -> Self::Output {
        code_label_pairs(results, |codfilial, filial| FiltroFilial { codfilial, filial })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltroCliente {
    pub codcliente: Option<String>,
    pub cliente: Option<String>,
}

pub struct FiltroClienteReport;

impl Report for FiltroClienteReport {
    type Output = Vec<FiltroCliente>;
    const NAME: &'static str = "filtro_cliente";
    const USES_WINDOW: bool = false;

    fn queries(_ctx: &ReportContext) -> Vec<SqlResult> {
        vec![SqlResult::new("SELECT cgccpfcli, nomefantasia FROM TBCLI", vec![])]
    }

    fn collect(results: ResultSets) -> Self::Output {
        code_label_pairs(results, |codcliente, cliente| FiltroCliente { codcliente, cliente })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltroFornecedor {
    pub codfornecedor: Option<String>,
    pub fornecedor: Option<String>,
}

pub struct FiltroFornecedorReport;

impl Report for FiltroFornecedorReport {
    type Output = Vec<FiltroFornecedor>;
    const NAME: &'static str = "filtro_fornecedor";
    const USES_WINDOW: bool = false;

    fn queries(_ctx: &ReportContext) -> Vec<SqlResult> {
        vec![SqlResult::new("SELECT cgccpfforne, nomefantasia FROM tbfor", vec![])]
    }

    fn collect(results: ResultSets) -> Self::Output {
        code_label_pairs(results, |codfornecedor, fornecedor| FiltroFornecedor { codfornecedor, fornecedor })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiltroTransacao {
    pub codtransacao: Option<String>,
    pub transacao: Option<String>,
}

pub struct FiltroTransacaoReport;

impl Report for FiltroTransacaoReport {
    type Output = Vec<FiltroTransacao>;
    const NAME: &'static str = "filtro_transacao";
    const USES_WINDOW: bool = false;

    fn queries(_ctx: &ReportContext) -> Vec<SqlResult> {
        vec![SqlResult::new("SELECT codtransacao, descricao FROM tbhis", vec![])]
    }

    fn collect(results: ResultSets) -> Self::Output {
        code_label_pairs(results, |codtransacao, transacao| FiltroTransacao { codtransacao, transacao })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Cell;

    #[test]
    fn numeric_codes_render_as_strings() {
        let rows = vec![
            Row::new(vec![Cell::Int(1), Cell::Text("MATRIZ    ".into())]),
            Row::new(vec![Cell::Int(2), Cell::Null]),
        ];
        let out = FiltroFilialReport::collect(ResultSets::new(vec![rows]));

        assert_eq!(out[0], FiltroFilial { codfilial: Some("1".into()), filial: Some("MATRIZ".into()) });
        assert_eq!(out[1].filial, None);
    }

    #[test]
    fn empty_lookup_is_empty_list() {
        let out = FiltroTransacaoReport::collect(ResultSets::new(vec![vec![]]));
        assert!(out.is_empty());
    }
}
