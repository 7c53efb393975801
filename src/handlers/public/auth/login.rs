// handlers/public/auth/login.rs - POST /login handler

use axum::{body::Bytes, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use crate::auth::{generate_jwt, verify_password, Claims};
use crate::database::{models::Usuario, DatabaseManager};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /login - Exchange e-mail and password for a bearer token
///
/// Input: `{ "username": "<emailusuario>", "password": "..." }`
/// Output (202): `{ "access_token": "...", "token_type": "bearer" }`
///
/// The token's `empresa` claim selects the tenant database for every BI
/// request. Unknown users and wrong passwords both answer 401 with the same
/// message.
pub async fn login_post(body: Bytes) -> Result<(StatusCode, Json<LoginResponse>), ApiError> {
    let payload: LoginRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(format!("Invalid login body: {}", e)))?;

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation_error("username and password are required", None));
    }

    let pool = DatabaseManager::main_pool().await?;
    let user = Usuario::find_by_email(&pool, payload.username.trim()).await?;

    let user = match user {
        Some(user) if password_matches(&payload.password, &user) => user,
        _ => {
            tracing::warn!("Failed login attempt for {}", payload.username);
            return Err(ApiError::unauthorized("Usuário ou senha incorretos"));
        }
    };

    let token = generate_jwt(&Claims::for_user(&user))?;
    tracing::info!("User {} logged in for empresa {}", user.codusuario, user.codempresa);

    Ok((
        StatusCode::ACCEPTED,
        Json(LoginResponse {
            access_token: token,
            token_type: "bearer".to_string(),
        }),
    ))
}

fn password_matches(password: &str, user: &Usuario) -> bool {
    user.senhausuario
        .as_deref()
        .map(|hash| verify_password(password, hash))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_body_is_invalid_json() {
        let err = login_post(Bytes::from_static(b"{\"username\":")).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
    }

    #[tokio::test]
    async fn blank_credentials_fail_validation_before_any_lookup() {
        let body = Bytes::from_static(br#"{"username":"  ","password":"x"}"#);
        let err = login_post(body).await.unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
