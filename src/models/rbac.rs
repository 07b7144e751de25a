// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// O que sai do banco (Tabela Permissions)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    #[schema(example = "clients_edit")]
    pub slug: String,

    #[schema(example = "Editar clientes")]
    pub description: String,

    #[schema(example = "CLIENTS")]
    pub module: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckPayload {
    #[validate(length(min = 1, message = "Debe indicar al menos una capacidad."))]
    #[schema(example = json!(["clients_edit", "clients_view"]))]
    pub capabilities: Vec<String>,

    #[serde(default)]
    pub require_all: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessCheckResponse {
    pub allowed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySetResponse {
    #[schema(example = json!(["clients_edit", "notifications_view"]))]
    pub capabilities: Vec<String>,
}
