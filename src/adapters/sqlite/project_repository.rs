//! SQLite project catalog.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{parse_datetime, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ProjectMetadata;
use crate::domain::ports::ProjectMetadataSource;

#[derive(Clone)]
pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new project. Ids are unique; re-registering is an error.
    pub async fn register(&self, project: &ProjectMetadata) -> DomainResult<()> {
        project.validate().map_err(DomainError::ValidationFailed)?;

        let result = sqlx::query(
            r#"INSERT INTO projects (id, name, description, industry, team_size, planned_start, target_completion, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO NOTHING"#
        )
        .bind(&project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(&project.industry)
        .bind(project.team_size.map(i64::from))
        .bind(project.planned_start.map(|t| t.to_rfc3339()))
        .bind(project.target_completion.map(|t| t.to_rfc3339()))
        .bind(project.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ValidationFailed(format!(
                "project '{}' already exists",
                project.id
            )));
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> DomainResult<Option<ProjectMetadata>> {
        let row: Option<ProjectRow> = sqlx::query_as(
            "SELECT id, name, description, industry, team_size, planned_start, target_completion, created_at FROM projects WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    pub async fn list(&self) -> DomainResult<Vec<ProjectMetadata>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(
            "SELECT id, name, description, industry, team_size, planned_start, target_completion, created_at FROM projects ORDER BY created_at, id"
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl ProjectMetadataSource for SqliteProjectRepository {
    async fn get_project(&self, project_id: &str) -> DomainResult<Option<ProjectMetadata>> {
        self.get(project_id).await
    }
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: String,
    name: String,
    description: Option<String>,
    industry: Option<String>,
    team_size: Option<i64>,
    planned_start: Option<String>,
    target_completion: Option<String>,
    created_at: String,
}

impl TryFrom<ProjectRow> for ProjectMetadata {
    type Error = DomainError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let team_size = row
            .team_size
            .map(u32::try_from)
            .transpose()
            .map_err(|e| DomainError::SerializationError(format!("Invalid team size: {e}")))?;

        Ok(ProjectMetadata {
            id: row.id,
            name: row.name,
            description: row.description,
            industry: row.industry,
            team_size,
            planned_start: parse_optional_datetime(row.planned_start)?,
            target_completion: parse_optional_datetime(row.target_completion)?,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use chrono::{Duration, Utc};

    async fn setup_test_repo() -> SqliteProjectRepository {
        let pool = create_migrated_test_pool().await.unwrap();
        SqliteProjectRepository::new(pool)
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let repo = setup_test_repo().await;
        let start = Utc::now();
        let project = ProjectMetadata::new("proj-1", "Campus Refresh")
            .with_team_size(3)
            .with_industry("education")
            .with_schedule(start, Some(start + Duration::days(60)));

        repo.register(&project).await.unwrap();
        let loaded = repo.get_project("proj-1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Campus Refresh");
        assert_eq!(loaded.team_size, Some(3));
        assert_eq!(loaded.industry.as_deref(), Some("education"));
        assert_eq!(loaded.planned_start, Some(start));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let repo = setup_test_repo().await;
        let project = ProjectMetadata::new("proj-1", "Campus Refresh");
        repo.register(&project).await.unwrap();

        let err = repo.register(&project).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_invalid_project_rejected() {
        let repo = setup_test_repo().await;
        let err = repo
            .register(&ProjectMetadata::new("proj-1", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_project_is_none() {
        let repo = setup_test_repo().await;
        assert!(repo.get_project("nope").await.unwrap().is_none());
    }
}
