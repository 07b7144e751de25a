//src/main.rs

use axum::{
    http::{header, HeaderName, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, tenancy::tenant_guard, trial::trial_gate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}

/// Monta o router completo.
pub fn app(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/permissions", get(handlers::rbac::list_permissions));

    // Rotas do usuário (só autenticação)
    let user_routes = Router::new()
        .route("/users/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Rotas da empresa: auth -> tenant (as camadas rodam de baixo para cima)
    let tenant_routes = Router::new()
        .route("/users/me/capabilities", get(handlers::rbac::my_capabilities))
        .route("/access/check", post(handlers::rbac::check_access))
        .route("/tenants/current", get(handlers::tenancy::get_current_tenant))
        .route("/tenants/current/trial", get(handlers::tenancy::get_trial_status))
        .route("/tenants/current/trial/extend", post(handlers::tenancy::extend_trial))
        .route("/tenants/current/subscription", post(handlers::tenancy::activate_subscription))
        .layer(axum_middleware::from_fn(tenant_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    // Rotas de negócio: além da empresa, exigem teste válido ou assinatura
    let business_routes = Router::new()
        .route("/notifications", get(handlers::notifications::list_notifications))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), trial_gate))
        .layer(axum_middleware::from_fn(tenant_guard))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let relay_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ]);

    let relay_routes = Router::new()
        .route("/send-test-message", post(handlers::relay::send_test_message))
        .route(
            "/trigger-test-notification",
            post(handlers::relay::trigger_test_notification),
        )
        .layer(relay_cors);

    let api_routes = public_routes
        .merge(user_routes)
        .merge(tenant_routes)
        .merge(business_routes);

    Router::new()
        .nest("/api", api_routes)
        .nest("/functions/v1", relay_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::test_support::{test_config, test_state};
    use crate::services::notification_service::testing::InMemoryNotificationStore;

    fn test_app() -> Router {
        let store = Arc::new(InMemoryNotificationStore::default());
        app(test_state(test_config("http://127.0.0.1:9", None), store))
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn tenant_routes_require_a_token() {
        for uri in [
            "/api/users/me",
            "/api/tenants/current/trial",
            "/api/users/me/capabilities",
            "/api/notifications",
        ] {
            let response = test_app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let request = Request::builder()
            .uri("/api/tenants/current")
            .header("authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
