// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSubscriptionManage, RequireCapability},
        tenancy::TenantContext,
    },
    models::{
        tenancy::{ExtendTrialPayload, Tenant},
        trial::TrialStatusResponse,
    },
    services::trial_service::trial_message,
};

// GET /api/tenants/current
#[utoipa::path(
    get,
    path = "/api/tenants/current",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Empresa atual", body = Tenant),
        (status = 404, description = "Empresa não encontrada")
    ),
    params(
        ("x-tenant-id" = Option<Uuid>, Header, description = "Só para super admin")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_current_tenant(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state
        .tenant_repo
        .find_by_id(tenant.0)
        .await?
        .ok_or(AppError::TenantNotFound)?;

    Ok((StatusCode::OK, Json(tenant)))
}

// GET /api/tenants/current/trial
#[utoipa::path(
    get,
    path = "/api/tenants/current/trial",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Estado do período de teste", body = TrialStatusResponse)
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_trial_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    tenant: TenantContext,
) -> Json<TrialStatusResponse> {
    // Nunca falha: leitura ruim vira estado NONE
    let status = app_state
        .trial_service
        .status_for_tenant(tenant.0, Utc::now())
        .await;

    let notify = app_state
        .trial_notices
        .observe(&user, tenant.0, status.state)
        .await;

    let message = trial_message(&status, &locale.0);

    Json(TrialStatusResponse {
        status,
        notify,
        message,
    })
}

// POST /api/tenants/current/trial/extend
#[utoipa::path(
    post,
    path = "/api/tenants/current/trial/extend",
    tag = "Tenancy",
    request_body = ExtendTrialPayload,
    responses(
        (status = 200, description = "Teste estendido", body = Tenant),
        (status = 403, description = "Sem a capacidade subscription_manage")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn extend_trial(
    State(app_state): State<AppState>,
    _guard: RequireCapability<PermSubscriptionManage>,
    tenant: TenantContext,
    Json(payload): Json<ExtendTrialPayload>,
) -> Result<Json<Tenant>, AppError> {
    payload.validate()?;

    let tenant = app_state
        .trial_service
        .extend_trial(tenant.0, payload.days, Utc::now())
        .await?;

    Ok(Json(tenant))
}

// POST /api/tenants/current/subscription
#[utoipa::path(
    post,
    path = "/api/tenants/current/subscription",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Assinatura ativada; empresa sai do teste", body = Tenant),
        (status = 403, description = "Sem a capacidade subscription_manage")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn activate_subscription(
    State(app_state): State<AppState>,
    _guard: RequireCapability<PermSubscriptionManage>,
    tenant: TenantContext,
) -> Result<Json<Tenant>, AppError> {
    let tenant = app_state.trial_service.activate_subscription(tenant.0).await?;
    Ok(Json(tenant))
}
