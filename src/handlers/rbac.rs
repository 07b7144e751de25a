// src/handlers/rbac.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::rbac::{AccessCheckPayload, AccessCheckResponse, CapabilitySetResponse, Permission},
    services::permission_service::CapabilityQuery,
};

// GET /api/permissions (para o frontend saber o que mostrar na tela de cargos)
#[utoipa::path(
    get,
    path = "/api/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Catálogo de capacidades", body = Vec<Permission>)
    )
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = app_state.rbac_repo.list_all_permissions().await?;
    Ok(Json(permissions))
}

// GET /api/users/me/capabilities
#[utoipa::path(
    get,
    path = "/api/users/me/capabilities",
    tag = "RBAC",
    responses(
        (status = 200, description = "Capacidades efetivas do usuário na empresa", body = CapabilitySetResponse),
        (status = 401, description = "Não autorizado")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn my_capabilities(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
) -> Result<Json<CapabilitySetResponse>, AppError> {
    let set = app_state
        .permission_evaluator
        .capabilities_of(&user, tenant.0)
        .await?;

    let mut capabilities: Vec<String> = set.iter().cloned().collect();
    capabilities.sort();

    Ok(Json(CapabilitySetResponse { capabilities }))
}

// POST /api/access/check
#[utoipa::path(
    post,
    path = "/api/access/check",
    tag = "RBAC",
    request_body = AccessCheckPayload,
    responses(
        (status = 200, description = "Resultado da avaliação", body = AccessCheckResponse),
        (status = 400, description = "Lista de capacidades vazia")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn check_access(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AccessCheckPayload>,
) -> Result<Json<AccessCheckResponse>, AppError> {
    payload.validate()?;

    let query = CapabilityQuery::from_list(payload.capabilities, payload.require_all);
    let allowed = app_state
        .permission_evaluator
        .can_access(Some(&user), &query)
        .await;

    Ok(Json(AccessCheckResponse { allowed }))
}
