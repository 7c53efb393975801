use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveTime;
use rsfbclient::{prelude::*, FbError, SqlType};
use tracing::{debug, error, warn};

use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::row::{Cell, Row};
use crate::database::tenant::{find_tenant_connection, TenantConnection, TenantGateway};
use crate::filter::{SqlParam, SqlResult};

/// Tenant gateway backed by the control-plane pool (for lookup) and a fresh
/// Firebird connection per request (for execution).
#[derive(Debug, Clone, Copy, Default)]
pub struct FirebirdGateway;

#[async_trait]
impl TenantGateway for FirebirdGateway {
    async fn resolve(&self, empresa: i64) -> Result<TenantConnection, DatabaseError> {
        let pool = DatabaseManager::main_pool().await?;
        find_tenant_connection(&pool, empresa).await
    }

    async fn execute(
        &self,
        connection: &TenantConnection,
        queries: Vec<SqlResult>,
    ) -> Result<Vec<Vec<Row>>, DatabaseError> {
        let connection = connection.clone();
        let timeout = config::config().tenant.query_timeout_secs;

        let task = tokio::task::spawn_blocking(move || run_queries(&connection, queries));

        let joined = match timeout {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), task)
                .await
                .map_err(|_| DatabaseError::Timeout(secs))?,
            None => task.await,
        };

        joined.map_err(|e| DatabaseError::QueryError(format!("Tenant query task failed: {}", e)))?
    }
}

/// Connect, run every query inside one transaction, then close.
fn run_queries(connection: &TenantConnection, queries: Vec<SqlResult>) -> Result<Vec<Vec<Row>>, DatabaseError> {
    let settings = &config::config().tenant;

    let mut conn = rsfbclient::builder_pure_rust()
        .host(&connection.host)
        .port(connection.port)
        .db_name(&connection.path)
        .user(&settings.user)
        .pass(&settings.password)
        .charset(rsfbclient::charset::ISO_8859_1)
        .connect()
        .map_err(|e| {
            error!(
                "Failed to connect to tenant {} database at {}/{}:{}: {}",
                connection.empresa, connection.host, connection.port, connection.path, e
            );
            DatabaseError::ConnectionError(e.to_string())
        })?;

    // Commits on Ok, rolls back on Err.
    let result = conn.with_transaction(|tr| {
        let mut results = Vec::with_capacity(queries.len());
        for sql in queries {
            results.push(run_one(tr, sql)?);
        }
        Ok(results)
    });

    if let Err(e) = conn.close() {
        warn!("Failed to close tenant {} connection: {}", connection.empresa, e);
    }

    result.map_err(|e| {
        error!("Tenant {} query failed: {}", connection.empresa, e);
        DatabaseError::QueryError(e.to_string())
    })
}

fn run_one<Q: Queryable>(tr: &mut Q, sql: SqlResult) -> Result<Vec<Row>, FbError> {
    let db_config = &config::config().database;
    if db_config.enable_query_logging {
        debug!("Tenant query: {} params={:?}", sql.query, sql.params);
    }

    let params: Vec<SqlType> = sql.params.into_iter().map(to_sql_type).collect();
    let started = Instant::now();
    let rows: Vec<rsfbclient::Row> = tr.query(&sql.query, params)?;
    let elapsed = started.elapsed();

    if db_config.enable_slow_query_warning && elapsed.as_millis() as u64 > db_config.slow_query_threshold_ms {
        warn!("Slow tenant query ({} ms, {} rows): {}", elapsed.as_millis(), rows.len(), sql.query);
    }

    Ok(rows.into_iter().map(to_row).collect())
}

fn to_sql_type(param: SqlParam) -> SqlType {
    match param {
        SqlParam::Int(i) => SqlType::Integer(i),
        SqlParam::Text(s) => SqlType::Text(s),
        SqlParam::Date(d) => SqlType::Timestamp(d.and_time(NaiveTime::MIN)),
    }
}

fn to_row(row: rsfbclient::Row) -> Row {
    Row::new(row.cols.into_iter().map(|col| to_cell(col.value)).collect())
}

#[allow(unreachable_patterns)]
fn to_cell(value: SqlType) -> Cell {
    match value {
        SqlType::Null => Cell::Null,
        SqlType::Integer(i) => Cell::Int(i),
        SqlType::Floating(f) => Cell::Float(f),
        SqlType::Text(s) => Cell::Text(s),
        SqlType::Boolean(b) => Cell::Bool(b),
        SqlType::Timestamp(ts) => Cell::Timestamp(ts),
        SqlType::Binary(bytes) => Cell::Text(String::from_utf8_lossy(&bytes).into_owned()),
        _ => Cell::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn date_params_bind_as_midnight_timestamps() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let midnight = d.and_hms_opt(0, 0, 0).unwrap();
        assert!(matches!(to_sql_type(SqlParam::Date(d)), SqlType::Timestamp(ts) if ts == midnight));
        assert!(matches!(to_sql_type(SqlParam::Int(5)), SqlType::Integer(5)));
        assert!(matches!(to_sql_type(SqlParam::Text("SUL".into())), SqlType::Text(s) if s == "SUL"));
    }

    #[test]
    fn driver_values_map_to_cells() {
        assert_eq!(to_cell(SqlType::Null), Cell::Null);
        assert_eq!(to_cell(SqlType::Floating(1.5)), Cell::Float(1.5));
        assert_eq!(to_cell(SqlType::Binary(b"abc".to_vec())), Cell::Text("abc".into()));
    }
}
