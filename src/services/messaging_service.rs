// src/services/messaging_service.rs

use std::time::Duration;

use serde::Deserialize;

use crate::common::error::RelayError;

const CHANNEL_PREFIX: &str = "whatsapp:";

pub const TEST_MESSAGE_BODY: &str =
    "🚛 Crane Command: este es un mensaje de prueba. Tu integración de WhatsApp funciona correctamente.";

#[derive(Clone, Debug)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

// Resposta de sucesso da API de mensagens (só o que usamos)
#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: String,
}

// Corpo de erro da Twilio: `{ "code": 21211, "message": "...", "status": 400 }`
#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

/// Adiciona o marcador de canal quando ausente (`+52...` -> `whatsapp:+52...`).
pub fn normalize_whatsapp(number: &str) -> String {
    let number = number.trim();
    if number.starts_with(CHANNEL_PREFIX) {
        number.to_string()
    } else {
        format!("{CHANNEL_PREFIX}{number}")
    }
}

/// Cliente do provedor de mensagens. Uma única chamada por envio, sem retry.
#[derive(Clone)]
pub struct MessagingClient {
    http: reqwest::Client,
    api_base: String,
    credentials: Option<TwilioCredentials>,
}

impl MessagingClient {
    pub fn new(api_base: String, credentials: Option<TwilioCredentials>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Envia `body` para `to` e devolve o `sid` da mensagem criada.
    pub async fn send_whatsapp(&self, to: &str, body: &str) -> Result<String, RelayError> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            RelayError::Configuration(
                "Faltan las credenciales de Twilio (TWILIO_ACCOUNT_SID, TWILIO_AUTH_TOKEN, TWILIO_WHATSAPP_FROM).".into(),
            )
        })?;

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, credentials.account_sid
        );

        let to = normalize_whatsapp(to);
        let from = normalize_whatsapp(&credentials.from_number);
        let form = [("To", to.as_str()), ("From", from.as_str()), ("Body", body)];

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(RelayError::upstream)?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ProviderError>()
                .await
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("Twilio respondió con estado {}", status));
            return Err(RelayError::Upstream(message));
        }

        let created = response
            .json::<MessageCreated>()
            .await
            .map_err(RelayError::upstream)?;

        tracing::info!("📨 Mensagem enviada para {} (sid {})", to, created.sid);
        Ok(created.sid)
    }
}
