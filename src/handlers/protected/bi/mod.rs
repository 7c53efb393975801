// handlers/protected/bi/mod.rs - BI report endpoints
//
// Every route is one `Report` run against the caller's tenant database:
// POST routes take an optional JSON filter body, GET routes (lookup lists)
// take none.

use axum::{
    body::Bytes,
    extract::{Extension, State},
    response::Json,
};
use std::time::Instant;

use crate::config;
use crate::database::TenantConnection;
use crate::error::ApiError;
use crate::filter::{parse_filters, ReportFilters};
use crate::reports::{Report, ReportContext, ResultSets};
use crate::state::AppState;

/// POST /bi/<report> - filtered report
pub async fn report_post<R: Report>(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantConnection>,
    body: Bytes,
) -> Result<Json<R::Output>, ApiError> {
    let filters = parse_filters(&body)?;
    run_report::<R>(&state, &tenant, filters).await.map(Json)
}

/// GET /bi/<lookup> - unfiltered list
pub async fn report_get<R: Report>(
    State(state): State<AppState>,
    Extension(tenant): Extension<TenantConnection>,
) -> Result<Json<R::Output>, ApiError> {
    run_report::<R>(&state, &tenant, ReportFilters::default()).await.map(Json)
}

async fn run_report<R: Report>(
    state: &AppState,
    tenant: &TenantConnection,
    filters: ReportFilters,
) -> Result<R::Output, ApiError> {
    let today = chrono::Local::now().date_naive();
    let ctx = ReportContext::for_report::<R>(filters, today, &config::config().reports)?;
    let queries = R::queries(&ctx);

    let started = Instant::now();
    let results = state.gateway.execute(tenant, queries).await?;

    tracing::info!(
        report = R::NAME,
        empresa = tenant.empresa,
        window_start = %ctx.window.start,
        window_end = %ctx.window.end,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report served"
    );

    Ok(R::collect(ResultSets::new(results)))
}
