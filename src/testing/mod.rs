//! In-memory tenant gateway for router and handler tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth::{generate_jwt, Claims};
use crate::database::{DatabaseError, Row, TenantConnection, TenantGateway};
use crate::filter::SqlResult;

#[derive(Default)]
pub struct MockGateway {
    tenants: HashMap<i64, TenantConnection>,
    results: Vec<Vec<Row>>,
    fail_with: Option<String>,
    pub executed: Mutex<Vec<SqlResult>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(mut self, empresa: i64) -> Self {
        self.tenants.insert(
            empresa,
            TenantConnection {
                empresa,
                host: "127.0.0.1".to_string(),
                port: 3050,
                path: format!("/data/empresa{}.fdb", empresa),
            },
        );
        self
    }

    /// Canned result sets returned by every `execute`
    pub fn with_results(mut self, results: Vec<Vec<Row>>) -> Self {
        self.results = results;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn executed_queries(&self) -> Vec<SqlResult> {
        self.executed.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TenantGateway for MockGateway {
    async fn resolve(&self, empresa: i64) -> Result<TenantConnection, DatabaseError> {
        self.tenants
            .get(&empresa)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound("Configuração de conexão não encontrada".to_string()))
    }

    async fn execute(
        &self,
        _connection: &TenantConnection,
        queries: Vec<SqlResult>,
    ) -> Result<Vec<Vec<Row>>, DatabaseError> {
        if let Some(message) = &self.fail_with {
            return Err(DatabaseError::QueryError(message.clone()));
        }
        if let Ok(mut executed) = self.executed.lock() {
            executed.extend(queries);
        }
        Ok(self.results.clone())
    }
}

/// Signed token for `empresa`, valid for an hour
pub fn token_for(empresa: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "7".to_string(),
        nomeusuario: Some("Operador".to_string()),
        codusuario: Some("7".to_string()),
        ativo: Some("S".to_string()),
        empresa: empresa.map(str::to_string),
        email: Some("operador@example.com".to_string()),
        exp: now + 3600,
        iat: now,
    };
    generate_jwt(&claims).unwrap_or_default()
}
