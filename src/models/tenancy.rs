// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

// ---
// Tenant (a empresa cliente)
// ---
// `trial_ends_at` só tem significado quando `is_trial` é verdadeiro.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,

    #[schema(example = "Grúas del Norte")]
    pub name: String,

    pub description: Option<String>,
    pub is_trial: bool,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Leitura crua usada pelo avaliador de teste: a data vem como texto ISO-8601.
#[derive(Debug, Clone, FromRow)]
pub struct TrialSnapshot {
    pub is_trial: bool,
    pub trial_ends_at: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtendTrialPayload {
    #[validate(range(min = 1, max = 365, message = "Los días deben estar entre 1 y 365."))]
    #[schema(example = 7)]
    pub days: i64,
}
