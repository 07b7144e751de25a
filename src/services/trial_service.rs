// src/services/trial_service.rs

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::{
        auth::CurrentUser,
        tenancy::{Tenant, TrialSnapshot},
        trial::{TrialState, TrialStatus},
    },
};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Avalia o estado do período de teste a partir da data de fim.
///
/// A decisão usa a duração crua; `days_remaining` é só para exibição.
pub fn evaluate(trial_ends_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> TrialStatus {
    let Some(ends_at) = trial_ends_at else {
        return TrialStatus::none();
    };

    let remaining_ms = (ends_at - now).num_milliseconds();

    let state = if remaining_ms <= 0 {
        TrialState::Expired
    } else if remaining_ms < DAY_MS {
        TrialState::ExpiringSoon
    } else {
        TrialState::Active
    };

    let days_remaining = if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms + DAY_MS - 1) / DAY_MS
    };

    TrialStatus {
        state,
        days_remaining: Some(days_remaining),
        trial_ends_at: Some(ends_at),
    }
}

/// Versão para a data em texto ISO-8601. Data ilegível vira `None`: um dado
/// ruim nunca bloqueia o acesso.
pub fn evaluate_iso(raw: Option<&str>, now: DateTime<Utc>) -> TrialStatus {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return TrialStatus::none();
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => evaluate(Some(parsed.with_timezone(&Utc)), now),
        Err(e) => {
            tracing::warn!("Data de fim de teste ilegível ({:?}): {}", raw, e);
            TrialStatus::none()
        }
    }
}

/// Leitura e escrita dos campos de teste da empresa.
#[async_trait]
pub trait TrialStore: Send + Sync {
    async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError>;
    async fn find_trial_snapshot(&self, tenant_id: Uuid) -> Result<Option<TrialSnapshot>, AppError>;
    async fn set_trial_end(&self, tenant_id: Uuid, ends_at: DateTime<Utc>) -> Result<Tenant, AppError>;
    async fn end_trial(&self, tenant_id: Uuid) -> Result<Tenant, AppError>;
}

#[async_trait]
impl TrialStore for TenantRepository {
    async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        TenantRepository::find_by_id(self, tenant_id).await
    }

    async fn find_trial_snapshot(&self, tenant_id: Uuid) -> Result<Option<TrialSnapshot>, AppError> {
        TenantRepository::find_trial_snapshot(self, tenant_id).await
    }

    async fn set_trial_end(&self, tenant_id: Uuid, ends_at: DateTime<Utc>) -> Result<Tenant, AppError> {
        TenantRepository::set_trial_end(self, tenant_id, ends_at).await
    }

    async fn end_trial(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        TenantRepository::end_trial(self, tenant_id).await
    }
}

#[derive(Clone)]
pub struct TrialService {
    store: Arc<dyn TrialStore>,
}

impl TrialService {
    pub fn new(store: Arc<dyn TrialStore>) -> Self {
        Self { store }
    }

    /// Estado atual da empresa. Qualquer falha de leitura resulta em `None`.
    pub async fn status_for_tenant(&self, tenant_id: Uuid, now: DateTime<Utc>) -> TrialStatus {
        match self.store.find_trial_snapshot(tenant_id).await {
            Ok(Some(snapshot)) if snapshot.is_trial => {
                evaluate_iso(snapshot.trial_ends_at.as_deref(), now)
            }
            Ok(_) => TrialStatus::none(),
            Err(e) => {
                tracing::warn!("Falha ao ler período de teste da empresa {}: {}", tenant_id, e);
                TrialStatus::none()
            }
        }
    }

    /// Estende o teste em `days` dias a partir do maior entre agora e o fim atual.
    pub async fn extend_trial(
        &self,
        tenant_id: Uuid,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Tenant, AppError> {
        let tenant = self
            .store
            .find_by_id(tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        let ends_at = extended_trial_end(&tenant, days, now);
        let updated = self.store.set_trial_end(tenant_id, ends_at).await?;

        tracing::info!("⏳ Teste da empresa {} estendido até {}", tenant_id, ends_at);
        Ok(updated)
    }

    pub async fn activate_subscription(&self, tenant_id: Uuid) -> Result<Tenant, AppError> {
        let updated = self.store.end_trial(tenant_id).await?;
        tracing::info!("💳 Assinatura ativada para a empresa {}", tenant_id);
        Ok(updated)
    }
}

fn extended_trial_end(tenant: &Tenant, days: i64, now: DateTime<Utc>) -> DateTime<Utc> {
    let base = match tenant.trial_ends_at {
        Some(current) if tenant.is_trial && current > now => current,
        _ => now,
    };
    base + Duration::days(days)
}

/// Estado de aviso por sessão: substitui o armazenamento efêmero do navegador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialNoticeState {
    pub last_notified_state: Option<TrialState>,
    pub session_id: String,
    pub session_started_at: DateTime<Utc>,
}

impl TrialNoticeState {
    pub fn new(session_id: &str, session_started_at: DateTime<Utc>) -> Self {
        Self {
            last_notified_state: None,
            session_id: session_id.to_string(),
            session_started_at,
        }
    }

    /// Decide se o estado merece aviso agora e registra o aviso.
    /// Outra sessão zera o estado; a mesma sessão mantém o início original.
    pub fn observe(
        &mut self,
        session_id: &str,
        session_started_at: DateTime<Utc>,
        state: TrialState,
    ) -> bool {
        if session_id != self.session_id {
            *self = Self::new(session_id, session_started_at);
        }

        if !state.is_warning() || self.last_notified_state == Some(state) {
            return false;
        }

        self.last_notified_state = Some(state);
        true
    }
}

/// Estados de aviso por (usuário, empresa).
#[derive(Clone, Default)]
pub struct TrialNoticeTracker {
    states: Arc<RwLock<HashMap<(Uuid, Uuid), TrialNoticeState>>>,
}

impl TrialNoticeTracker {
    pub async fn observe(
        &self,
        user: &CurrentUser,
        tenant_id: Uuid,
        state: TrialState,
    ) -> bool {
        let mut states = self.states.write().await;
        states
            .entry((user.id, tenant_id))
            .or_insert_with(|| TrialNoticeState::new(&user.session_id, user.session_started_at))
            .observe(&user.session_id, user.session_started_at, state)
    }
}

/// Mensagem de apresentação no idioma pedido (`es` por padrão).
pub fn trial_message(status: &TrialStatus, lang: &str) -> Option<String> {
    let days = status.days_remaining.unwrap_or(0);
    let plural = days != 1;

    let message = match (status.state, lang) {
        (TrialState::None, _) => return None,

        (TrialState::Active | TrialState::ExpiringSoon, "en") => format!(
            "Your trial ends in {} day{}.",
            days,
            if plural { "s" } else { "" }
        ),
        (TrialState::Expired, "en") => "Your trial has expired.".to_string(),

        (TrialState::Active | TrialState::ExpiringSoon, "pt") => format!(
            "Seu período de teste termina em {} dia{}.",
            days,
            if plural { "s" } else { "" }
        ),
        (TrialState::Expired, "pt") => "Seu período de teste expirou.".to_string(),

        (TrialState::Active | TrialState::ExpiringSoon, _) => format!(
            "Tu período de prueba vence en {} día{}.",
            days,
            if plural { "s" } else { "" }
        ),
        (TrialState::Expired, _) => "Tu período de prueba ha expirado.".to_string(),
    };

    Some(message)
}


#[cfg(test)]
mod tests {
    use super::testing::InMemoryTrialStore;
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn no_end_date_is_none() {
        assert_eq!(evaluate(None, now()), TrialStatus::none());
    }

    #[test]
    fn past_and_exactly_now_are_expired() {
        for offset in [Duration::zero(), Duration::seconds(1), Duration::days(30)] {
            let status = evaluate(Some(now() - offset), now());
            assert_eq!(status.state, TrialState::Expired);
            assert_eq!(status.days_remaining, Some(0));
        }
    }

    #[test]
    fn more_than_a_day_is_active() {
        let status = evaluate(Some(now() + Duration::hours(25)), now());
        assert_eq!(status.state, TrialState::Active);
        assert_eq!(status.days_remaining, Some(2));
    }

    #[test]
    fn exactly_twenty_four_hours_is_still_active() {
        let status = evaluate(Some(now() + Duration::hours(24)), now());
        assert_eq!(status.state, TrialState::Active);
        assert_eq!(status.days_remaining, Some(1));
    }

    #[test]
    fn just_under_a_day_is_expiring_soon() {
        let status = evaluate(Some(now() + Duration::hours(24) - Duration::milliseconds(1)), now());
        assert_eq!(status.state, TrialState::ExpiringSoon);
    }

    #[test]
    fn two_hours_left_is_expiring_soon_with_one_day_displayed() {
        let status = evaluate(Some(now() + Duration::hours(2)), now());
        assert_eq!(status.state, TrialState::ExpiringSoon);
        assert_eq!(status.days_remaining, Some(1));
    }

    #[test]
    fn iso_timestamps_are_parsed() {
        let status = evaluate_iso(Some("2025-03-10T14:00:00+00:00"), now());
        assert_eq!(status.state, TrialState::ExpiringSoon);

        let status = evaluate_iso(Some("2025-03-20T12:00:00Z"), now());
        assert_eq!(status.state, TrialState::Active);
        assert_eq!(status.days_remaining, Some(10));
    }

    #[test]
    fn malformed_timestamp_fails_open() {
        for raw in ["not-a-date", "2025-13-45", "", "   "] {
            assert_eq!(evaluate_iso(Some(raw), now()).state, TrialState::None);
        }
        assert_eq!(evaluate_iso(None, now()).state, TrialState::None);
    }

    fn tenant(is_trial: bool, trial_ends_at: Option<DateTime<Utc>>) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Grúas del Norte".into(),
            description: None,
            is_trial,
            trial_ends_at,
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn extension_stacks_on_a_running_trial() {
        let t = tenant(true, Some(now() + Duration::days(3)));
        assert_eq!(extended_trial_end(&t, 7, now()), now() + Duration::days(10));
    }

    #[test]
    fn extension_of_an_expired_trial_starts_from_now() {
        let t = tenant(true, Some(now() - Duration::days(3)));
        assert_eq!(extended_trial_end(&t, 7, now()), now() + Duration::days(7));

        let t = tenant(false, Some(now() + Duration::days(3)));
        assert_eq!(extended_trial_end(&t, 7, now()), now() + Duration::days(7));
    }

    #[test]
    fn notice_fires_once_per_warning_state_per_session() {
        let mut notice = TrialNoticeState::new("sess-1", now());

        assert!(!notice.observe("sess-1", now(), TrialState::Active));
        assert!(notice.observe("sess-1", now(), TrialState::ExpiringSoon));
        assert!(!notice.observe("sess-1", now(), TrialState::ExpiringSoon));
        assert!(notice.observe("sess-1", now(), TrialState::Expired));
        assert!(!notice.observe("sess-1", now(), TrialState::Expired));
    }

    #[test]
    fn token_refresh_in_the_same_session_does_not_repeat_the_notice() {
        let mut notice = TrialNoticeState::new("sess-1", now());
        assert!(notice.observe("sess-1", now(), TrialState::Expired));

        let refreshed_iat = now() + Duration::hours(1);
        assert!(!notice.observe("sess-1", refreshed_iat, TrialState::Expired));
        assert_eq!(notice.session_started_at, now());
    }

    #[test]
    fn new_session_resets_the_notice() {
        let mut notice = TrialNoticeState::new("sess-1", now());
        assert!(notice.observe("sess-1", now(), TrialState::Expired));

        let next_session = now() + Duration::hours(5);
        assert!(notice.observe("sess-2", next_session, TrialState::Expired));
        assert_eq!(notice.session_id, "sess-2");
        assert_eq!(notice.session_started_at, next_session);
    }

    fn current_user(session_id: &str) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "despacho@gruas.com".into(),
            roles: vec![],
            tenant_id: None,
            is_super_admin: false,
            session_id: session_id.into(),
            session_started_at: now(),
        }
    }

    #[tokio::test]
    async fn tracker_keeps_state_per_user() {
        let tracker = TrialNoticeTracker::default();
        let (alice, bob) = (current_user("a"), current_user("b"));
        let tenant = Uuid::new_v4();

        assert!(tracker.observe(&alice, tenant, TrialState::ExpiringSoon).await);
        assert!(!tracker.observe(&alice, tenant, TrialState::ExpiringSoon).await);
        assert!(tracker.observe(&bob, tenant, TrialState::ExpiringSoon).await);
    }

    #[tokio::test]
    async fn tracker_keeps_state_per_tenant() {
        let tracker = TrialNoticeTracker::default();
        let admin = current_user("a");
        let (tenant_a, tenant_b) = (Uuid::new_v4(), Uuid::new_v4());

        assert!(tracker.observe(&admin, tenant_a, TrialState::Expired).await);
        assert!(tracker.observe(&admin, tenant_b, TrialState::Expired).await);
        assert!(!tracker.observe(&admin, tenant_a, TrialState::Expired).await);
    }

    fn snapshot(is_trial: bool, trial_ends_at: Option<&str>) -> TrialSnapshot {
        TrialSnapshot {
            is_trial,
            trial_ends_at: trial_ends_at.map(str::to_string),
        }
    }

    fn service(store: InMemoryTrialStore) -> TrialService {
        TrialService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn running_trial_is_evaluated_from_the_store() {
        let svc = service(InMemoryTrialStore::with_snapshot(snapshot(
            true,
            Some("2025-03-10T14:00:00+00:00"),
        )));
        let status = svc.status_for_tenant(Uuid::new_v4(), now()).await;
        assert_eq!(status.state, TrialState::ExpiringSoon);
    }

    #[tokio::test]
    async fn subscribed_tenant_is_none_even_with_an_end_date() {
        for ends_at in ["2025-04-10T12:00:00+00:00", "2025-01-01T00:00:00+00:00"] {
            let svc = service(InMemoryTrialStore::with_snapshot(snapshot(false, Some(ends_at))));
            let status = svc.status_for_tenant(Uuid::new_v4(), now()).await;
            assert_eq!(status, TrialStatus::none());
        }
    }

    #[tokio::test]
    async fn missing_tenant_is_none() {
        let svc = service(InMemoryTrialStore::default());
        assert_eq!(svc.status_for_tenant(Uuid::new_v4(), now()).await.state, TrialState::None);
    }

    #[tokio::test]
    async fn store_failure_fails_open() {
        let svc = service(InMemoryTrialStore::failing());
        let status = svc.status_for_tenant(Uuid::new_v4(), now()).await;
        assert_eq!(status, TrialStatus::none());
    }

    #[test]
    fn messages_follow_the_locale() {
        let status = evaluate(Some(now() + Duration::hours(2)), now());
        assert_eq!(
            trial_message(&status, "es").as_deref(),
            Some("Tu período de prueba vence en 1 día.")
        );
        assert_eq!(trial_message(&status, "en").as_deref(), Some("Your trial ends in 1 day."));
        assert_eq!(trial_message(&TrialStatus::none(), "en"), None);
    }
}
