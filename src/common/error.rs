// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Uma referência (cliente, gerente, categoria...) não existe no tenant.
    #[error("Referência inexistente: {field}")]
    MissingReference { field: &'static str },

    #[error("A atribuição criaria um ciclo na hierarquia")]
    HierarchyCycle,

    #[error("Data inválida: {0}")]
    InvalidDate(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("Registro não encontrado")]
    NotFound,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MissingReference { .. }
            | AppError::HierarchyCycle
            | AppError::InvalidDate(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidToken | AppError::UserNotFound => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte violação de unicidade em `Conflict`; o resto segue como erro de banco.
    pub fn from_unique_violation(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return AppError::Conflict(message.to_owned());
            }
        }
        AppError::DatabaseError(err)
    }

    /// Violação de chave estrangeira (registro ainda referenciado) vira `Conflict`.
    pub fn from_foreign_key_violation(err: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_foreign_key_violation() {
                return AppError::Conflict(message.to_owned());
            }
        }
        AppError::DatabaseError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            AppError::MissingReference { field } => json!({
                "error": format!("O registro informado em '{field}' não existe neste tenant."),
                "field": field,
            }),
            AppError::HierarchyCycle => json!({
                "error": "Um membro não pode gerenciar a si mesmo nem um de seus superiores.",
                "field": "managerId",
            }),
            AppError::InvalidToken => {
                json!({ "error": "Token de autenticação inválido ou ausente." })
            }
            AppError::UserNotFound => {
                json!({ "error": "O usuário do token não existe mais." })
            }
            AppError::NotFound => json!({ "error": "Registro não encontrado." }),
            AppError::InvalidDate(message)
            | AppError::BadRequest(message)
            | AppError::Conflict(message)
            | AppError::Forbidden(message) => json!({ "error": message }),

            // O `tracing` loga a mensagem detalhada; o cliente recebe só a genérica.
            ref e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!(error = ?e, "Erro Interno do Servidor: {}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
        };

        (status, Json(body)).into_response()
    }
}
