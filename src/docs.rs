// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Users ---
        handlers::auth::get_me,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::my_capabilities,
        handlers::rbac::check_access,

        // --- Tenancy ---
        handlers::tenancy::get_current_tenant,
        handlers::tenancy::get_trial_status,
        handlers::tenancy::extend_trial,
        handlers::tenancy::activate_subscription,

        // --- Notifications ---
        handlers::notifications::list_notifications,

        // --- Relay ---
        handlers::relay::send_test_message,
        handlers::relay::trigger_test_notification,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::CurrentUser,

            // --- RBAC ---
            models::rbac::Permission,
            models::rbac::AccessCheckPayload,
            models::rbac::AccessCheckResponse,
            models::rbac::CapabilitySetResponse,

            // --- Tenancy / Trial ---
            models::tenancy::Tenant,
            models::tenancy::ExtendTrialPayload,
            models::trial::TrialState,
            models::trial::TrialStatus,
            models::trial::TrialStatusResponse,

            // --- Notifications ---
            models::notifications::Notification,
            models::notifications::SendTestMessagePayload,
            models::notifications::SendTestMessageResponse,
            models::notifications::TriggerTestNotificationPayload,
            models::notifications::TriggerTestNotificationResponse,
        )
    ),
    tags(
        (name = "Users", description = "Dados do usuário autenticado"),
        (name = "RBAC", description = "Capacidades e avaliação de acesso"),
        (name = "Tenancy", description = "Empresa, período de teste e assinatura"),
        (name = "Notifications", description = "Notificações da empresa"),
        (name = "Relay", description = "Funções de teste do canal de mensagens")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_relay_and_trial_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/tenants/current/trial",
            "/api/access/check",
            "/functions/v1/send-test-message",
            "/functions/v1/trigger-test-notification",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path}");
        }
    }
}
