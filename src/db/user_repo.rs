use sqlx::PgPool;
use uuid::Uuid;
use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários: tabelas `users`, `profiles` e `tenant_members`
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, is_super_admin FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Empresa do perfil do usuário (nula enquanto o cadastro não termina)
    pub async fn find_profile_tenant(&self, user_id: Uuid) -> Result<Option<Uuid>, AppError> {
        let tenant_id = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT tenant_id FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant_id.flatten())
    }

    // Cargos ativos do usuário na empresa, na ordem em que foram atribuídos
    pub async fn find_role_names(
        &self,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM tenant_members tm
            JOIN roles r ON tm.role_id = r.id
            WHERE tm.user_id = $1
              AND tm.tenant_id = $2
              AND tm.is_active = true
            ORDER BY tm.created_at, r.name
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }
}
