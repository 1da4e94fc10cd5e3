//! SQLite implementation of the TrackingRepository.
//!
//! The context is stored as a JSON snapshot; a handful of columns are
//! duplicated out of it for indexing and inspection.

use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::TrackingContext;
use crate::domain::ports::TrackingRepository;

#[derive(Clone)]
pub struct SqliteTrackingRepository {
    pool: SqlitePool,
}

impl SqliteTrackingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackingRepository for SqliteTrackingRepository {
    async fn load(&self, session_id: Uuid) -> DomainResult<Option<TrackingContext>> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT session_id, snapshot FROM tracking_sessions WHERE session_id = ?"
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn save(&self, context: &TrackingContext) -> DomainResult<()> {
        let snapshot = serde_json::to_string(context)?;

        sqlx::query(
            r#"INSERT INTO tracking_sessions (session_id, project_id, implementation_type, current_phase_id, snapshot, created_at, updated_at, archived_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(session_id) DO UPDATE SET
                   current_phase_id = excluded.current_phase_id,
                   snapshot = excluded.snapshot,
                   updated_at = excluded.updated_at,
                   archived_at = excluded.archived_at"#
        )
        .bind(context.session_id.to_string())
        .bind(&context.project_id)
        .bind(context.implementation_type.as_str())
        .bind(&context.current_phase_id)
        .bind(&snapshot)
        .bind(context.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(context.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(context.archived_at.map(|t| t.to_rfc3339_opts(SecondsFormat::Micros, true)))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_project(&self, project_id: &str) -> DomainResult<Vec<TrackingContext>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT session_id, snapshot FROM tracking_sessions WHERE project_id = ? ORDER BY created_at, session_id"
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    snapshot: String,
}

impl TryFrom<SessionRow> for TrackingContext {
    type Error = DomainError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        serde_json::from_str(&row.snapshot).map_err(|e| {
            DomainError::SerializationError(format!(
                "corrupt snapshot for session {}: {e}",
                row.session_id
            ))
        })
    }
}
