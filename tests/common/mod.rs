//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use deploytrack::adapters::memory::{InMemoryProjectCatalog, InMemoryTrackingRepository};
use deploytrack::adapters::recommenders::MockRecommender;
use deploytrack::domain::models::RecommendationType;
use deploytrack::domain::ports::TrackingRepository;
use deploytrack::{
    Config, DomainError, DomainResult, ProjectMetadata, TrackingContext, TrackingService,
};

pub const PROJECT_ID: &str = "campus-core";
pub const PRE_DEPLOYMENT_PHASE: &str = "phase-pre_deployment";
pub const DEPLOYMENT_PHASE: &str = "phase-deployment";

/// The six pre-deployment items of every session plan.
pub const PRE_DEPLOYMENT_ITEMS: [&str; 6] = ["pre-01", "pre-02", "pre-03", "pre-04", "pre-05", "pre-06"];

pub type MemoryService = TrackingService<InMemoryTrackingRepository, InMemoryProjectCatalog>;

pub async fn catalog() -> Arc<InMemoryProjectCatalog> {
    let catalog = InMemoryProjectCatalog::new();
    catalog
        .insert(ProjectMetadata::new(PROJECT_ID, "Campus core refresh").with_team_size(3))
        .await;
    Arc::new(catalog)
}

pub async fn memory_service() -> (MemoryService, Arc<InMemoryTrackingRepository>) {
    let repository = Arc::new(InMemoryTrackingRepository::new());
    let service = TrackingService::new(repository.clone(), catalog().await, Config::default());
    (service, repository)
}

pub async fn memory_service_with(
    recommender: Arc<MockRecommender>,
) -> (MemoryService, Arc<InMemoryTrackingRepository>) {
    let (service, repository) = memory_service().await;
    (service.with_recommender(recommender), repository)
}

pub fn draft(title: &str) -> deploytrack::domain::models::RecommendationDraft {
    deploytrack::domain::models::RecommendationDraft {
        recommendation_type: RecommendationType::Process,
        title: title.to_string(),
        description: format!("{title} to keep the rollout moving"),
        confidence: 0.7,
        estimated_impact: Default::default(),
        priority: Default::default(),
        applicability: Default::default(),
    }
}

/// Repository whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyRepository {
    inner: InMemoryTrackingRepository,
    fail_saves: AtomicBool,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl TrackingRepository for FlakyRepository {
    async fn load(&self, session_id: Uuid) -> DomainResult<Option<TrackingContext>> {
        self.inner.load(session_id).await
    }

    async fn save(&self, context: &TrackingContext) -> DomainResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DomainError::DatabaseError("disk I/O error".to_string()));
        }
        self.inner.save(context).await
    }

    async fn list_for_project(&self, project_id: &str) -> DomainResult<Vec<TrackingContext>> {
        self.inner.list_for_project(project_id).await
    }
}
