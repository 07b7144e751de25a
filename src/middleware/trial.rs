// src/middleware/trial.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::trial::TrialState,
};

/// Bloqueia rotas de negócio quando o teste da empresa expirou.
/// Roda depois do `tenant_guard`; falhas de leitura deixam passar.
pub async fn trial_gate(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_super_admin = request
        .extensions()
        .get::<AuthenticatedUser>()
        .is_some_and(|u| u.0.is_super_admin);
    let tenant = request.extensions().get::<TenantContext>().copied();

    if let (false, Some(TenantContext(tenant_id))) = (is_super_admin, tenant) {
        let status = app_state
            .trial_service
            .status_for_tenant(tenant_id, Utc::now())
            .await;

        if status.state == TrialState::Expired {
            tracing::info!("🚫 Empresa {} com teste expirado; acesso bloqueado", tenant_id);
            return Err(AppError::TrialExpired);
        }
    }

    Ok(next.run(request).await)
}
