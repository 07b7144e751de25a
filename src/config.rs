// src/config.rs

use crate::{
    db::{NotificationRepository, RbacRepository, TenantRepository, UserRepository},
    services::{
        auth::AuthService,
        messaging_service::{MessagingClient, TwilioCredentials},
        notification_service::NotificationService,
        permission_service::{CachedCapabilitySource, PermissionEvaluator},
        trial_service::{TrialNoticeTracker, TrialService},
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_CAPABILITY_TTL_SECS: u64 = 300;
const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Configuração lida do ambiente (`.env` incluído).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub capability_cache_ttl: Duration,
    pub twilio_api_base: String,
    // Os segredos da Twilio são opcionais no arranque: a ausência vira erro de
    // configuração na própria requisição.
    pub twilio: Option<TwilioCredentials>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET deve ser definido"))?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let ttl_secs = match env::var("CAPABILITY_CACHE_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                anyhow::anyhow!("CAPABILITY_CACHE_TTL_SECS inválido ({}): {}", raw, e)
            })?,
            Err(_) => DEFAULT_CAPABILITY_TTL_SECS,
        };

        let twilio_api_base =
            env::var("TWILIO_API_BASE").unwrap_or_else(|_| DEFAULT_TWILIO_API_BASE.to_string());

        let twilio = match (
            non_empty_var("TWILIO_ACCOUNT_SID"),
            non_empty_var("TWILIO_AUTH_TOKEN"),
            non_empty_var("TWILIO_WHATSAPP_FROM"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                tracing::warn!("⚠️ Credenciais da Twilio incompletas; send-test-message vai responder com erro.");
                None
            }
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr,
            capability_cache_ttl: Duration::from_secs(ttl_secs),
            twilio_api_base,
            twilio,
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenant_repo: TenantRepository,
    pub rbac_repo: RbacRepository,
    pub notification_repo: NotificationRepository,
    pub trial_service: TrialService,
    pub trial_notices: TrialNoticeTracker,
    pub permission_evaluator: PermissionEvaluator,
    pub messaging_client: MessagingClient,
    pub notification_service: NotificationService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::assemble(config, db_pool)
    }

    // --- Monta o gráfico de dependências ---
    pub fn assemble(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, config.jwt_secret.clone());
        let trial_service = TrialService::new(Arc::new(tenant_repo.clone()));

        let capability_source =
            CachedCapabilitySource::new(rbac_repo.clone(), config.capability_cache_ttl);
        let permission_evaluator = PermissionEvaluator::new(Arc::new(capability_source));

        let messaging_client =
            MessagingClient::new(config.twilio_api_base.clone(), config.twilio.clone())?;
        let notification_service = NotificationService::new(Arc::new(notification_repo.clone()));

        Ok(Self {
            db_pool,
            auth_service,
            tenant_repo,
            rbac_repo,
            notification_repo,
            trial_service,
            trial_notices: TrialNoticeTracker::default(),
            permission_evaluator,
            messaging_client,
            notification_service,
        })
    }
}
