use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::row::Row;
use crate::filter::SqlResult;

/// Coordinates of one tenant's ERP database, from `tbempresas`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantConnection {
    pub empresa: i64,
    pub host: String,
    pub port: u16,
    pub path: String,
}

#[derive(Debug, FromRow)]
struct TenantConnectionRow {
    ipbd: Option<String>,
    portabd: Option<String>,
    caminhobd: Option<String>,
}

/// Firebird's default listener port, used when `portabd` is null
pub const DEFAULT_TENANT_PORT: u16 = 3050;

impl TenantConnectionRow {
    fn into_connection(self, empresa: i64) -> Result<TenantConnection, DatabaseError> {
        let host = self.ipbd.filter(|h| !h.trim().is_empty()).ok_or_else(|| {
            DatabaseError::NotFound(format!("Tenant {} has no database host configured", empresa))
        })?;
        let path = self.caminhobd.filter(|p| !p.trim().is_empty()).ok_or_else(|| {
            DatabaseError::NotFound(format!("Tenant {} has no database path configured", empresa))
        })?;
        let port = match self.portabd.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            None => DEFAULT_TENANT_PORT,
            Some(p) => p.parse::<u16>().map_err(|_| {
                DatabaseError::QueryError(format!("Tenant {} has invalid database port {}", empresa, p))
            })?,
        };

        Ok(TenantConnection {
            empresa,
            host: host.trim().to_string(),
            port,
            path: path.trim().to_string(),
        })
    }
}

/// Read the tenant's connection record from the control plane. One read per
/// call; nothing is cached.
pub async fn find_tenant_connection(pool: &PgPool, empresa: i64) -> Result<TenantConnection, DatabaseError> {
    let row = sqlx::query_as::<_, TenantConnectionRow>(
        "SELECT t.ipbd, CAST(t.portabd AS TEXT) AS portabd, t.caminhobd FROM tbempresas t WHERE t.codempresa = $1",
    )
    .bind(empresa)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| DatabaseError::NotFound("Configuração de conexão não encontrada".to_string()))?
        .into_connection(empresa)
}

/// Everything a BI request needs from the outside world: where the tenant's
/// database lives, and a scoped run of composed queries against it.
#[async_trait]
pub trait TenantGateway: Send + Sync {
    async fn resolve(&self, empresa: i64) -> Result<TenantConnection, DatabaseError>;

    /// Run `queries` in order on one fresh connection and transaction, returning
    /// one result set per query. The transaction is rolled back on any failure
    /// and the connection is closed on every exit path.
    async fn execute(
        &self,
        connection: &TenantConnection,
        queries: Vec<SqlResult>,
    ) -> Result<Vec<Vec<Row>>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ip: Option<&str>, port: Option<&str>, path: Option<&str>) -> TenantConnectionRow {
        TenantConnectionRow {
            ipbd: ip.map(str::to_string),
            portabd: port.map(str::to_string),
            caminhobd: path.map(str::to_string),
        }
    }

    #[test]
    fn builds_connection_from_record() {
        let conn = record(Some(" 10.0.0.5 "), Some("3051"), Some("/data/erp.fdb"))
            .into_connection(7)
            .unwrap();
        assert_eq!(
            conn,
            TenantConnection { empresa: 7, host: "10.0.0.5".into(), port: 3051, path: "/data/erp.fdb".into() }
        );
    }

    #[test]
    fn missing_port_uses_firebird_default() {
        let conn = record(Some("db"), None, Some("erp")).into_connection(1).unwrap();
        assert_eq!(conn.port, DEFAULT_TENANT_PORT);
    }

    #[test]
    fn incomplete_records_are_not_found() {
        assert!(matches!(record(None, Some("3050"), Some("erp")).into_connection(1), Err(DatabaseError::NotFound(_))));
        assert!(matches!(record(Some("db"), Some("3050"), Some("  ")).into_connection(1), Err(DatabaseError::NotFound(_))));
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(matches!(record(Some("db"), Some("70000"), Some("erp")).into_connection(1), Err(DatabaseError::QueryError(_))));
    }
}
