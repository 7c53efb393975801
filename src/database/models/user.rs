use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;

/// A dashboard user from `tbusuario`. The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Usuario {
    pub codusuario: i64,
    pub nomeusuario: Option<String>,
    #[serde(skip_serializing)]
    pub senhausuario: Option<String>,
    pub codempresa: i64,
    pub usuarioativo: Option<String>,
    pub cpfusuario: Option<String>,
    pub emailusuario: Option<String>,
}

impl Usuario {
    /// Login identifies users by e-mail.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, DatabaseError> {
        let user = sqlx::query_as::<_, Usuario>(
            r#"
            SELECT
                CAST(codusuario AS BIGINT) AS codusuario,
                nomeusuario,
                senhausuario,
                CAST(codempresa AS BIGINT) AS codempresa,
                CAST(usuarioativo AS TEXT) AS usuarioativo,
                cpfusuario,
                emailusuario
            FROM tbusuario
            WHERE emailusuario = $1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
