// src/models/trial.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Estado derivado do período de teste. Nunca é persistido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrialState {
    /// Fora de teste, ou sem data de fim.
    None,
    /// Mais de 24h restantes (exatamente 24h ainda conta como ativo).
    Active,
    /// Menos de 24h restantes.
    ExpiringSoon,
    /// Data de fim igual ou anterior a agora.
    Expired,
}

impl TrialState {
    /// Estados que merecem um aviso ao usuário.
    pub fn is_warning(self) -> bool {
        matches!(self, TrialState::ExpiringSoon | TrialState::Expired)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatus {
    pub state: TrialState,
    // Só para exibição; nunca usado para decidir o estado.
    pub days_remaining: Option<i64>,
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl TrialStatus {
    pub fn none() -> Self {
        Self {
            state: TrialState::None,
            days_remaining: None,
            trial_ends_at: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrialStatusResponse {
    #[serde(flatten)]
    pub status: TrialStatus,

    // Verdadeiro apenas na primeira vez que o estado de aviso aparece na sessão
    pub notify: bool,

    #[schema(example = "Tu período de prueba vence en 1 día.")]
    pub message: Option<String>,
}
