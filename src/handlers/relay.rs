// src/handlers/relay.rs
//
// Funções de relay: validam a entrada e repassam para um único serviço externo.
// Qualquer erro vira `{"error": msg}` com status 400.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    common::error::RelayError,
    config::AppState,
    models::notifications::{
        SendTestMessagePayload, SendTestMessageResponse, TriggerTestNotificationPayload,
        TriggerTestNotificationResponse,
    },
    services::messaging_service::TEST_MESSAGE_BODY,
};

const PHONE_REQUIRED: &str =
    "El campo \"phone\" es requerido. Ingresa un número de WhatsApp con código de país (ej. +5215512345678).";

fn required_phone(phone: Option<String>) -> Result<String, RelayError> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RelayError::Validation(PHONE_REQUIRED.into()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| RelayError::Validation(rejection.body_text()))
}

// POST /functions/v1/send-test-message
#[utoipa::path(
    post,
    path = "/functions/v1/send-test-message",
    tag = "Relay",
    request_body = SendTestMessagePayload,
    responses(
        (status = 200, description = "Mensagem aceita pelo provedor", body = SendTestMessageResponse),
        (status = 400, description = "Erro de validação, configuração ou do provedor")
    )
)]
pub async fn send_test_message(
    State(app_state): State<AppState>,
    payload: Result<Json<SendTestMessagePayload>, JsonRejection>,
) -> Result<Json<SendTestMessageResponse>, RelayError> {
    let payload = json_body(payload)?;
    let phone = required_phone(payload.phone)?;

    let sid = app_state
        .messaging_client
        .send_whatsapp(&phone, TEST_MESSAGE_BODY)
        .await?;

    Ok(Json(SendTestMessageResponse { success: true, sid }))
}

// POST /functions/v1/trigger-test-notification
#[utoipa::path(
    post,
    path = "/functions/v1/trigger-test-notification",
    tag = "Relay",
    request_body = TriggerTestNotificationPayload,
    responses(
        (status = 200, description = "Notificação pendente criada", body = TriggerTestNotificationResponse),
        (status = 400, description = "Erro de validação, resolução ou do banco")
    )
)]
pub async fn trigger_test_notification(
    State(app_state): State<AppState>,
    payload: Result<Json<TriggerTestNotificationPayload>, JsonRejection>,
) -> Result<Json<TriggerTestNotificationResponse>, RelayError> {
    let payload = json_body(payload)?;
    let phone = required_phone(payload.phone)?;

    let notification = app_state
        .notification_service
        .trigger_test(&phone, payload.channel.as_deref())
        .await?;

    Ok(Json(TriggerTestNotificationResponse {
        success: true,
        notification,
    }))
}
