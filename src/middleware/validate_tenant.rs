use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::state::AppState;

/// Middleware that resolves the tenant database for the authenticated
/// `empresa` and injects its `TenantConnection` into the request. Runs after
/// `jwt_auth_middleware`; one control-plane read per request.
pub async fn validate_tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before tenant validation"))?;

    let connection = state.gateway.resolve(auth_user.empresa).await.map_err(|e| {
        if let DatabaseError::NotFound(ref msg) = e {
            tracing::warn!("Tenant validation failed for empresa {}: {}", auth_user.empresa, msg);
        }
        e
    })?;

    tracing::debug!(
        "Tenant {} resolved to {}/{}:{}",
        connection.empresa,
        connection.host,
        connection.port,
        connection.path
    );

    request.extensions_mut().insert(connection);

    Ok(next.run(request).await)
}
