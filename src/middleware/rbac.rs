// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::permission_service::CapabilityQuery,
};

/// Uma capacidade conhecida em tempo de compilação.
pub trait CapabilityDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// Guardião: o handler só roda se o usuário tiver a capacidade `T`.
pub struct RequireCapability<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = parts.extensions.get::<AuthenticatedUser>().cloned();
        let required = T::slug();

        let allowed = app_state
            .permission_evaluator
            .can_access(user.as_ref().map(|u| &u.0), &CapabilityQuery::single(required))
            .await;

        if !allowed {
            if user.is_none() {
                return Err(AppError::InvalidToken);
            }
            return Err(AppError::Forbidden(format!(
                "Necesitas el permiso '{}' para realizar esta acción.",
                required
            )));
        }

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// CAPACIDADES USADAS PELAS ROTAS
// ---

pub struct PermNotificationsView;
impl CapabilityDef for PermNotificationsView {
    fn slug() -> &'static str { "notifications_view" }
}

pub struct PermSubscriptionManage;
impl CapabilityDef for PermSubscriptionManage {
    fn slug() -> &'static str { "subscription_manage" }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::post,
        Router,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::test_support::{
        bare_state, current_user, sign_in, with_capability_source, SignedIn,
    };
    use crate::services::permission_service::{testing::StaticCapabilities, CapabilitySource};

    fn guarded() -> Router<AppState> {
        Router::new().route(
            "/subscription",
            post(|_: RequireCapability<PermSubscriptionManage>| async { "ok" }),
        )
    }

    fn router(source: Arc<dyn CapabilitySource>, signed_in: Option<SignedIn>) -> Router {
        let state = with_capability_source(bare_state(), source);
        let routes = guarded();
        let routes = match signed_in {
            Some(signed_in) => routes.layer(from_fn_with_state(signed_in, sign_in)),
            None => routes,
        };
        routes.with_state(state)
    }

    async fn call(router: Router) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/subscription")
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap().status()
    }

    fn member() -> SignedIn {
        SignedIn::member(current_user(false, Some(Uuid::new_v4())))
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let source = StaticCapabilities::granting(&["subscription_manage"]);
        assert_eq!(call(router(source, None)).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_capability_is_forbidden() {
        let source = StaticCapabilities::granting(&["clients_view"]);
        assert_eq!(call(router(source, Some(member()))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn granted_capability_reaches_the_handler() {
        let source = StaticCapabilities::granting(&["clients_view", "subscription_manage"]);
        assert_eq!(call(router(source, Some(member()))).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn lookup_failure_is_forbidden() {
        assert_eq!(
            call(router(StaticCapabilities::failing(), Some(member()))).await,
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn user_without_tenant_is_forbidden() {
        let source = StaticCapabilities::granting(&["subscription_manage"]);
        let orphan = SignedIn::member(current_user(false, None));
        assert_eq!(call(router(source, Some(orphan))).await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn super_admin_needs_no_capability() {
        let admin = SignedIn::member(current_user(true, None));
        assert_eq!(
            call(router(StaticCapabilities::failing(), Some(admin))).await,
            StatusCode::OK
        );
    }
}
