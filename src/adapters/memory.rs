//! In-memory adapters for tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ProjectMetadata, TrackingContext};
use crate::domain::ports::{ProjectMetadataSource, TrackingRepository};

/// Snapshot store backed by a map.
#[derive(Default, Clone)]
pub struct InMemoryTrackingRepository {
    sessions: Arc<RwLock<HashMap<Uuid, TrackingContext>>>,
}

impl InMemoryTrackingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrackingRepository for InMemoryTrackingRepository {
    async fn load(&self, session_id: Uuid) -> DomainResult<Option<TrackingContext>> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn save(&self, context: &TrackingContext) -> DomainResult<()> {
        self.sessions
            .write()
            .await
            .insert(context.session_id, context.clone());
        Ok(())
    }

    async fn list_for_project(&self, project_id: &str) -> DomainResult<Vec<TrackingContext>> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<TrackingContext> = sessions
            .values()
            .filter(|c| c.project_id == project_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.session_id.cmp(&b.session_id))
        });
        Ok(matching)
    }
}

/// Project catalog backed by a map.
#[derive(Default, Clone)]
pub struct InMemoryProjectCatalog {
    projects: Arc<RwLock<HashMap<String, ProjectMetadata>>>,
}

impl InMemoryProjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, project: ProjectMetadata) {
        self.projects.write().await.insert(project.id.clone(), project);
    }
}

#[async_trait]
impl ProjectMetadataSource for InMemoryProjectCatalog {
    async fn get_project(&self, project_id: &str) -> DomainResult<Option<ProjectMetadata>> {
        Ok(self.projects.read().await.get(project_id).cloned())
    }
}
