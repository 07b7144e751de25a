use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erros da API autenticada (cada variante tem o seu status HTTP).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Usuário sem empresa associada")]
    TenantNotAssigned,

    #[error("Empresa não encontrada")]
    TenantNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Período de teste expirado")]
    TrialExpired,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticación inválido o ausente.".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "Usuario no encontrado.".to_string()),
            AppError::TenantNotAssigned => (
                StatusCode::UNAUTHORIZED,
                "El usuario no pertenece a ninguna empresa.".to_string(),
            ),
            AppError::TenantNotFound => (StatusCode::NOT_FOUND, "Empresa no encontrada.".to_string()),
            AppError::Forbidden(message) => (StatusCode::FORBIDDEN, message),
            AppError::TrialExpired => (
                StatusCode::PAYMENT_REQUIRED,
                "El período de prueba ha expirado. Activa una suscripción para continuar.".to_string(),
            ),

            // DatabaseError e InternalServerError viram 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocurrió un error inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

/// Erros das funções de relay. Todas as categorias têm o mesmo tratamento na
/// fronteira: log + `{"error": msg}` com status 400.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Campo obrigatório ausente ou corpo inválido.
    #[error("{0}")]
    Validation(String),

    /// Segredo/credencial ausente.
    #[error("{0}")]
    Configuration(String),

    /// Provedor externo ou banco respondeu com erro.
    #[error("{0}")]
    Upstream(String),

    /// Nenhum registro elegível encontrado.
    #[error("{0}")]
    Resolution(String),
}

impl RelayError {
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        RelayError::Upstream(err.to_string())
    }

    fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Configuration(_) => "configuration",
            RelayError::Upstream(_) => "upstream",
            RelayError::Resolution(_) => "resolution",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        tracing::error!(kind = self.kind(), "Erro na função de relay: {}", self);
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
