// routes.rs - Router assembly: public routes, /bi/* report routes, global layers

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config;
use crate::database::DatabaseManager;
use crate::handlers::{protected::bi, public::auth};
use crate::middleware::{jwt_auth_middleware, validate_tenant_middleware};
use crate::reports::{lookups::*, payables::*, receivables::*, sales::*};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let settings = config::config();

    let routes = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", post(auth::login_post))
        // Protected
        .merge(bi_routes(state.clone()))
        .with_state(state);

    let mut router = match settings.api.base_path.as_str() {
        "" | "/" => routes,
        base => Router::new().nest(&normalize_base_path(base), routes),
    };

    router = router.layer(DefaultBodyLimit::max(settings.api.max_request_size_bytes));

    if settings.security.enable_cors {
        router = router.layer(cors_layer(&settings.security.cors_origins));
    }
    if settings.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Report endpoints. `route_layer` keeps unknown paths at 404 instead of 401;
/// the JWT layer is added last so it runs before tenant resolution.
fn bi_routes(state: AppState) -> Router<AppState> {
    use bi::{report_get, report_post};

    Router::new()
        // Freight revenue
        .route("/bi/big_numbers", post(report_post::<BigNumbersReport>))
        .route("/bi/kpi_mes_ano", post(report_post::<KpiMesAnoReport>))
        .route("/bi/kpi_dia_mes_atual", post(report_post::<KpiDiaMesAtualReport>))
        .route("/bi/kpi_filial", post(report_post::<KpiFilialReport>))
        .route("/bi/kpi_regiao", post(report_post::<KpiRegiaoReport>))
        .route("/bi/kpi_cidade", post(report_post::<KpiCidadeReport>))
        .route("/bi/kpi_cliente", post(report_post::<KpiClienteReport>))
        .route("/bi/kpi_produto", post(report_post::<KpiProdutoReport>))
        .route("/bi/tabela_faturamento", post(report_post::<TabelaFaturamentoReport>))
        .route("/bi/filtro_filial", get(report_get::<FiltroFilialReport>))
        .route("/bi/filtro_cliente", get(report_get::<FiltroClienteReport>))
        // Accounts receivable
        .route("/bi/big_numbers_contas_receber", post(report_post::<BigNumbersContasReceberReport>))
        .route("/bi/recebimentos_dia_mes_atual", post(report_post::<RecebimentosDiaMesAtualReport>))
        .route("/bi/a_receber_cliente", post(report_post::<AReceberClienteReport>))
        .route("/bi/tabela_a_receber", post(report_post::<TabelaAReceberReport>))
        // Accounts payable
        .route("/bi/filtro_fornecedor", get(report_get::<FiltroFornecedorReport>))
        .route("/bi/filtro_transacao", get(report_get::<FiltroTransacaoReport>))
        .route("/bi/big_numbers_contas_pagar", post(report_post::<BigNumbersContasPagarReport>))
        .route("/bi/contas_pagar_dia_mes_atual", post(report_post::<ContasPagarDiaMesAtualReport>))
        .route("/bi/a_pagar_fornecedor", post(report_post::<APagarFornecedorReport>))
        .route("/bi/tabela_a_pagar", post(report_post::<TabelaAPagarReport>))
        .route_layer(from_fn_with_state(state, validate_tenant_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_matches('/');
    format!("/{}", trimmed)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "BI-FreteFacil API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-tenant BI endpoints over FreteFacil ERP databases",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "login": "POST /login (public - token acquisition)",
            "faturamento": "/bi/big_numbers, /bi/kpi_*, /bi/tabela_faturamento (protected)",
            "contas_receber": "/bi/big_numbers_contas_receber, /bi/a_receber_cliente, ... (protected)",
            "contas_pagar": "/bi/big_numbers_contas_pagar, /bi/a_pagar_fornecedor, ... (protected)",
            "filtros": "/bi/filtro_* (protected)",
        }
    }))
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
