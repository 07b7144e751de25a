// src/db/notification_repo.rs

use sqlx::PgPool;
use uuid::Uuid;
use crate::common::error::AppError;
use crate::models::notifications::{NewNotification, Notification, Recipient};

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, tenant_id, title, message, channel, status, metadata, created_at";

const FEED_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Qualquer perfil serve como destinatário da notificação de teste
    pub async fn find_any_profile(&self) -> Result<Option<Recipient>, AppError> {
        let recipient = sqlx::query_as::<_, Recipient>(
            "SELECT user_id, tenant_id FROM profiles LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipient)
    }

    // Plano B: qualquer conta, com a primeira empresa de que é membro (se houver)
    pub async fn find_any_user(&self) -> Result<Option<Recipient>, AppError> {
        let recipient = sqlx::query_as::<_, Recipient>(
            r#"
            SELECT u.id AS user_id,
                   (SELECT tm.tenant_id FROM tenant_members tm
                     WHERE tm.user_id = u.id
                     ORDER BY tm.created_at
                     LIMIT 1) AS tenant_id
            FROM users u
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(recipient)
    }

    pub async fn insert(&self, new: NewNotification) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (user_id, tenant_id, title, message, channel, status, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.tenant_id)
        .bind(new.title)
        .bind(new.message)
        .bind(new.channel)
        .bind(new.status)
        .bind(new.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    pub async fn list_for_tenant(&self, tenant_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(tenant_id)
        .bind(FEED_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }
}
