//! Reasoning service port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ImplementationType, PhaseStatus, PredictiveAlert, ProgressUpdateRecord, RecommendationDraft,
    TrackingContext,
};

/// Summary of the phase the session is currently in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase_id: String,
    pub name: String,
    pub status: PhaseStatus,
    pub completion_percentage: f64,
}

/// Serialized view of the context handed to a [`Recommender`].
///
/// Only the parts relevant to scoring suggestions are included; the full
/// checklist content never leaves the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextView {
    pub project_id: String,
    pub session_id: Uuid,
    pub implementation_type: ImplementationType,
    pub current_phase: Option<PhaseSummary>,
    pub recent_updates: Vec<ProgressUpdateRecord>,
    pub open_alerts: Vec<PredictiveAlert>,
}

impl ContextView {
    /// Build a view with at most `update_limit` of the most recent updates.
    pub fn from_context(context: &TrackingContext, update_limit: usize) -> Self {
        let skip = context.recent_updates.len().saturating_sub(update_limit);
        Self {
            project_id: context.project_id.clone(),
            session_id: context.session_id,
            implementation_type: context.implementation_type,
            current_phase: context.current_phase().map(|p| PhaseSummary {
                phase_id: p.id.clone(),
                name: p.name.clone(),
                status: p.status,
                completion_percentage: p.completion_percentage,
            }),
            recent_updates: context.recent_updates.iter().skip(skip).cloned().collect(),
            open_alerts: context.active_alerts().cloned().collect(),
        }
    }
}

/// Capability producing prioritized action suggestions.
///
/// Implementations may fail or hang; callers bound every call with a timeout
/// and treat failure as "no new suggestions".
#[async_trait]
pub trait Recommender: Send + Sync {
    /// Identifier recorded as the source of produced recommendations.
    fn name(&self) -> &'static str;

    async fn recommend(&self, view: &ContextView) -> DomainResult<Vec<RecommendationDraft>>;
}
