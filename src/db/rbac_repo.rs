// src/db/rbac_repo.rs

use std::collections::HashSet;
use sqlx::PgPool;
use uuid::Uuid;
use crate::common::error::AppError;
use crate::models::rbac::Permission;

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Lista todas as capacidades existentes (para o frontend montar a tela)
    pub async fn list_all_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, slug, description, module FROM permissions ORDER BY module, slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    // Conjunto efetivo de capacidades: cargo -> permissões, só membros ativos
    pub async fn find_capability_slugs(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<HashSet<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT p.slug
            FROM tenant_members tm
            JOIN roles r ON tm.role_id = r.id
            JOIN role_permissions rp ON r.id = rp.role_id
            JOIN permissions p ON rp.permission_id = p.id
            WHERE tm.user_id = $1
              AND tm.tenant_id = $2
              AND tm.is_active = true
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs.into_iter().collect())
    }
}
