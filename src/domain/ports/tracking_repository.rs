//! Tracking session persistence port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::TrackingContext;

/// Keyed snapshot store for tracking contexts.
///
/// Implementations store the whole context under its session id. `save` is an
/// upsert and must be idempotent: saving the same context twice leaves the
/// store in the same state as saving it once.
#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Load the snapshot for a session, `None` if it was never saved.
    async fn load(&self, session_id: Uuid) -> DomainResult<Option<TrackingContext>>;

    /// Insert or replace the snapshot for `context.session_id`.
    async fn save(&self, context: &TrackingContext) -> DomainResult<()>;

    /// All sessions recorded for a project, oldest first. Archived sessions
    /// are included; they are the historical data for forecasting.
    async fn list_for_project(&self, project_id: &str) -> DomainResult<Vec<TrackingContext>>;
}
