// src/services/permission_service.rs

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{common::error::AppError, db::RbacRepository, models::auth::CurrentUser};

pub type CapabilitySet = Arc<HashSet<String>>;

/// Fonte externa do conjunto de capacidades de um usuário numa empresa.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn capabilities(&self, user_id: Uuid, tenant_id: Uuid) -> Result<CapabilitySet, AppError>;
}

#[async_trait]
impl CapabilitySource for RbacRepository {
    async fn capabilities(&self, user_id: Uuid, tenant_id: Uuid) -> Result<CapabilitySet, AppError> {
        Ok(Arc::new(self.find_capability_slugs(user_id, tenant_id).await?))
    }
}

/// Memoriza o conjunto por (usuário, empresa) durante `ttl`.
/// Falhas não entram no cache; entradas vencidas saem a cada escrita.
pub struct CachedCapabilitySource<S> {
    inner: S,
    ttl: Duration,
    entries: RwLock<HashMap<(Uuid, Uuid), (Instant, CapabilitySet)>>,
}

impl<S> CachedCapabilitySource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<S: CapabilitySource> CapabilitySource for CachedCapabilitySource<S> {
    async fn capabilities(&self, user_id: Uuid, tenant_id: Uuid) -> Result<CapabilitySet, AppError> {
        let key = (user_id, tenant_id);

        if let Some((fetched_at, set)) = self.entries.read().await.get(&key) {
            if fetched_at.elapsed() < self.ttl {
                return Ok(set.clone());
            }
        }

        let set = self.inner.capabilities(user_id, tenant_id).await?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, (fetched_at, _)| fetched_at.elapsed() < self.ttl);
        entries.insert(key, (Instant::now(), set.clone()));

        Ok(set)
    }
}

/// O que se pergunta ao avaliador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityQuery {
    Single(String),
    AnyOf(Vec<String>),
    AllOf(Vec<String>),
}

impl CapabilityQuery {
    pub fn single(capability: impl Into<String>) -> Self {
        CapabilityQuery::Single(capability.into())
    }

    /// Lista de capacidades: `require_all` escolhe entre "todas" e "pelo menos uma".
    pub fn from_list(capabilities: Vec<String>, require_all: bool) -> Self {
        if require_all {
            CapabilityQuery::AllOf(capabilities)
        } else {
            CapabilityQuery::AnyOf(capabilities)
        }
    }

    /// Cada capacidade da lista é avaliada; lista vazia nunca concede acesso.
    pub fn is_satisfied_by(&self, granted: &HashSet<String>) -> bool {
        match self {
            CapabilityQuery::Single(capability) => granted.contains(capability),
            CapabilityQuery::AnyOf(list) => list.iter().any(|c| granted.contains(c)),
            CapabilityQuery::AllOf(list) => {
                !list.is_empty() && list.iter().all(|c| granted.contains(c))
            }
        }
    }
}

#[derive(Clone)]
pub struct PermissionEvaluator {
    source: Arc<dyn CapabilitySource>,
}

impl PermissionEvaluator {
    pub fn new(source: Arc<dyn CapabilitySource>) -> Self {
        Self { source }
    }

    /// Super admin passa sempre; sem usuário (ou sem empresa) nunca passa.
    /// Falha na consulta de capacidades nega o acesso.
    pub async fn can_access(&self, user: Option<&CurrentUser>, query: &CapabilityQuery) -> bool {
        let Some(user) = user else {
            return false;
        };

        if user.is_super_admin {
            return true;
        }

        let Some(tenant_id) = user.tenant_id else {
            return false;
        };

        match self.source.capabilities(user.id, tenant_id).await {
            Ok(granted) => query.is_satisfied_by(&granted),
            Err(e) => {
                tracing::warn!(
                    "Falha ao consultar capacidades do usuário {} (acesso negado): {}",
                    user.id,
                    e
                );
                false
            }
        }
    }

    pub async fn capabilities_of(
        &self,
        user: &CurrentUser,
        tenant_id: Uuid,
    ) -> Result<CapabilitySet, AppError> {
        self.source.capabilities(user.id, tenant_id).await
    }
}
