// src/db/tenancy_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use crate::common::error::AppError;
use crate::models::tenancy::{Tenant, TrialSnapshot};

const TENANT_COLUMNS: &str =
    "id, name, description, is_trial, trial_ends_at, created_at, updated_at";

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    /// Lê os campos de teste com a data já em texto ISO-8601
    /// (`to_json` produz `2025-01-01T12:00:00+00:00`).
    pub async fn find_trial_snapshot(
        &self,
        tenant_id: Uuid,
    ) -> Result<Option<TrialSnapshot>, AppError> {
        let snapshot = sqlx::query_as::<_, TrialSnapshot>(
            r#"
            SELECT is_trial, to_json(trial_ends_at) #>> '{}' AS trial_ends_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(snapshot)
    }

    /// Coloca a empresa em teste até `ends_at`.
    pub async fn set_trial_end(
        &self,
        tenant_id: Uuid,
        ends_at: DateTime<Utc>,
    ) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"
            UPDATE tenants
            SET is_trial = true, trial_ends_at = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {TENANT_COLUMNS}
            "#
        ))
        .bind(tenant_id)
        .bind(ends_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TenantNotFound)
    }

    /// Assinatura comprada: sai do teste e limpa a data de fim.
    pub async fn end_trial(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        sqlx::query_as::<_, Tenant>(&format!(
            r#"
            UPDATE tenants
            SET is_trial = false, trial_ends_at = NULL, updated_at = NOW()
            WHERE id = $1
            RETURNING {TENANT_COLUMNS}
            "#
        ))
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::TenantNotFound)
    }
}
