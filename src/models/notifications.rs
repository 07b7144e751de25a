// src/models/notifications.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

pub const DEFAULT_CHANNEL: &str = "whatsapp";
pub const STATUS_PENDING: &str = "pending";

// Linha da tabela `notifications`. As funções de relay devolvem a linha como
// está no banco, por isso os campos ficam em snake_case.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub title: String,
    pub message: String,

    #[schema(example = "whatsapp")]
    pub channel: String,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(value_type = Object)]
    pub metadata: Value,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub channel: String,
    pub status: String,
    pub metadata: Value,
}

/// Usuário/empresa a quem uma notificação de teste é atribuída.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct Recipient {
    pub user_id: Uuid,
    pub tenant_id: Option<Uuid>,
}

// --- Corpos das funções de relay ---

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SendTestMessagePayload {
    #[schema(example = "+5215512345678")]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendTestMessageResponse {
    pub success: bool,
    pub sid: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TriggerTestNotificationPayload {
    #[schema(example = "+5215512345678")]
    pub phone: Option<String>,

    #[schema(example = "whatsapp")]
    pub channel: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TriggerTestNotificationResponse {
    pub success: bool,
    pub notification: Notification,
}
