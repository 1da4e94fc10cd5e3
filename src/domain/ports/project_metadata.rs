//! Project metadata port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ProjectMetadata;

/// Read-only lookup of project attributes.
#[async_trait]
pub trait ProjectMetadataSource: Send + Sync {
    /// Get a project by id, `None` when it does not exist.
    async fn get_project(&self, project_id: &str) -> DomainResult<Option<ProjectMetadata>>;
}
