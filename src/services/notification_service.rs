// src/services/notification_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::{
    common::error::{AppError, RelayError},
    db::NotificationRepository,
    models::notifications::{
        NewNotification, Notification, Recipient, DEFAULT_CHANNEL, STATUS_PENDING,
    },
};

pub const TEST_NOTIFICATION_TITLE: &str = "Notificación de prueba";
pub const TEST_NOTIFICATION_MESSAGE: &str =
    "Esta es una notificación de prueba generada desde Crane Command.";
pub const TEST_SERVICE_ID: &str = "test-service";

/// Armazenamento usado pelo relay `trigger-test-notification`.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_any_profile(&self) -> Result<Option<Recipient>, AppError>;
    async fn find_any_user(&self) -> Result<Option<Recipient>, AppError>;
    async fn insert(&self, new: NewNotification) -> Result<Notification, AppError>;
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn find_any_profile(&self) -> Result<Option<Recipient>, AppError> {
        NotificationRepository::find_any_profile(self).await
    }

    async fn find_any_user(&self) -> Result<Option<Recipient>, AppError> {
        NotificationRepository::find_any_user(self).await
    }

    async fn insert(&self, new: NewNotification) -> Result<Notification, AppError> {
        NotificationRepository::insert(self, new).await
    }
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Perfil primeiro; sem perfis, qualquer conta cadastrada.
    async fn resolve_recipient(&self) -> Result<Recipient, RelayError> {
        if let Some(recipient) = self
            .store
            .find_any_profile()
            .await
            .map_err(RelayError::upstream)?
        {
            return Ok(recipient);
        }

        tracing::debug!("Nenhum perfil encontrado; buscando na lista de usuários");

        self.store
            .find_any_user()
            .await
            .map_err(RelayError::upstream)?
            .ok_or_else(|| {
                RelayError::Resolution(
                    "No user found to assign notification to. Create a user account first.".into(),
                )
            })
    }

    /// Insere uma notificação pendente de teste. Sem chave de idempotência:
    /// chamadas repetidas criam linhas repetidas.
    pub async fn trigger_test(
        &self,
        phone: &str,
        channel: Option<&str>,
    ) -> Result<Notification, RelayError> {
        let recipient = self.resolve_recipient().await?;

        let channel = channel
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CHANNEL);

        let new = NewNotification {
            user_id: recipient.user_id,
            tenant_id: recipient.tenant_id,
            title: TEST_NOTIFICATION_TITLE.to_string(),
            message: TEST_NOTIFICATION_MESSAGE.to_string(),
            channel: channel.to_string(),
            status: STATUS_PENDING.to_string(),
            metadata: json!({
                "test_phone": phone,
                "service_id": TEST_SERVICE_ID,
            }),
        };

        let notification = self.store.insert(new).await.map_err(RelayError::upstream)?;

        tracing::info!(
            "🔔 Notificação de teste {} criada para o usuário {}",
            notification.id,
            notification.user_id
        );
        Ok(notification)
    }
}
