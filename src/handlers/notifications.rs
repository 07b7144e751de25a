// src/handlers/notifications.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{PermNotificationsView, RequireCapability},
        tenancy::TenantContext,
    },
    models::notifications::Notification,
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificações da empresa (mais recentes primeiro)", body = Vec<Notification>),
        (status = 402, description = "Período de teste expirado"),
        (status = 403, description = "Sem a capacidade notifications_view")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn list_notifications(
    State(app_state): State<AppState>,
    _guard: RequireCapability<PermNotificationsView>,
    tenant: TenantContext,
) -> Result<Json<Vec<Notification>>, AppError> {
    let notifications = app_state.notification_repo.list_for_tenant(tenant.0).await?;
    Ok(Json(notifications))
}
