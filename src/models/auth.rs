// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use utoipa::ToSchema;

// Linha da tabela `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_super_admin: bool,
}

// O ator autenticado, montado a cada requisição pelo `auth_guard`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,

    #[schema(example = "operador@gruas-norte.com")]
    pub email: String,

    // Nomes dos cargos na ordem de atribuição
    #[schema(example = json!(["Dueño", "Despachador"]))]
    pub roles: Vec<String>,

    // Pode ser nulo em estados transitórios (perfil sem empresa)
    pub tenant_id: Option<Uuid>,

    pub is_super_admin: bool,

    // Identifica a sessão: claim `session_id` quando existe, senão o `iat`
    #[serde(skip)]
    pub session_id: String,

    // `iat` do token que abriu a requisição
    #[serde(skip)]
    pub session_started_at: DateTime<Utc>,
}

// Estrutura de dados ("claims") dentro do JWT emitido pelo backend hospedado
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At

    // Estável entre renovações do token; ausente em tokens de serviço
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
