// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser};

// Cabeçalho usado pelo super admin para operar outra empresa
const TENANT_ID_HEADER: &str = "x-tenant-id";

// A empresa sobre a qual a requisição atua.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

/// Resolve a empresa da requisição. Deve rodar depois do `auth_guard`.
///
/// Usuário sem empresa é tratado como não autenticado nas rotas da empresa.
pub async fn tenant_guard(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    let tenant_id = resolve_tenant(&user, request.headers().get(TENANT_ID_HEADER))?;

    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}

fn resolve_tenant(
    user: &AuthenticatedUser,
    header: Option<&axum::http::HeaderValue>,
) -> Result<Uuid, AppError> {
    if user.0.is_super_admin {
        if let Some(value) = header {
            let tenant_id = value
                .to_str()
                .ok()
                .and_then(|raw| Uuid::parse_str(raw).ok())
                .ok_or_else(|| AppError::Forbidden("Cabecera X-Tenant-ID inválida.".into()))?;
            return Ok(tenant_id);
        }
    }

    user.0.tenant_id.ok_or(AppError::TenantNotAssigned)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or(AppError::TenantNotAssigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::CurrentUser;
    use axum::http::HeaderValue;
    use chrono::Utc;

    fn user(is_super_admin: bool, tenant_id: Option<Uuid>) -> AuthenticatedUser {
        AuthenticatedUser(CurrentUser {
            id: Uuid::new_v4(),
            email: "x@gruas.com".into(),
            roles: vec![],
            tenant_id,
            is_super_admin,
            session_id: "sess-1".into(),
            session_started_at: Utc::now(),
        })
    }

    #[test]
    fn profile_tenant_is_used_by_default() {
        let tenant = Uuid::new_v4();
        assert_eq!(resolve_tenant(&user(false, Some(tenant)), None).unwrap(), tenant);
    }

    #[test]
    fn header_is_ignored_for_regular_users() {
        let own = Uuid::new_v4();
        let other = HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap();
        assert_eq!(resolve_tenant(&user(false, Some(own)), Some(&other)).unwrap(), own);
    }

    #[test]
    fn super_admin_can_target_any_tenant() {
        let other = Uuid::new_v4();
        let header = HeaderValue::from_str(&other.to_string()).unwrap();
        assert_eq!(resolve_tenant(&user(true, None), Some(&header)).unwrap(), other);
    }

    #[test]
    fn user_without_tenant_is_rejected() {
        assert!(matches!(
            resolve_tenant(&user(false, None), None),
            Err(AppError::TenantNotAssigned)
        ));
    }
}
