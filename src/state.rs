use std::sync::Arc;

use crate::database::{FirebirdGateway, TenantGateway};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn TenantGateway>,
}

impl AppState {
    pub fn new(gateway: Arc<dyn TenantGateway>) -> Self {
        Self { gateway }
    }

    /// Production wiring: control-plane lookup plus Firebird execution
    pub fn firebird() -> Self {
        Self::new(Arc::new(FirebirdGateway))
    }
}
