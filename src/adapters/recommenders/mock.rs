//! Mock recommender for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::RecommendationDraft;
use crate::domain::ports::{ContextView, Recommender};

/// Scripted behaviour of the mock.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond(Vec<RecommendationDraft>),
    Fail(String),
    /// Never completes; exercises caller timeouts.
    Hang,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::Respond(Vec::new())
    }
}

/// Recommender whose answers are set by the test.
#[derive(Default)]
pub struct MockRecommender {
    behavior: Arc<RwLock<MockBehavior>>,
    views: Arc<RwLock<Vec<ContextView>>>,
}

impl MockRecommender {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn respond(&self, drafts: Vec<RecommendationDraft>) {
        *self.behavior.write().await = MockBehavior::Respond(drafts);
    }

    pub async fn fail(&self, message: impl Into<String>) {
        *self.behavior.write().await = MockBehavior::Fail(message.into());
    }

    pub async fn hang(&self) {
        *self.behavior.write().await = MockBehavior::Hang;
    }

    pub async fn call_count(&self) -> usize {
        self.views.read().await.len()
    }

    /// Views received so far, oldest first.
    pub async fn received(&self) -> Vec<ContextView> {
        self.views.read().await.clone()
    }
}

#[async_trait]
impl Recommender for MockRecommender {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn recommend(&self, view: &ContextView) -> DomainResult<Vec<RecommendationDraft>> {
        self.views.write().await.push(view.clone());
        let behavior = self.behavior.read().await.clone();

        match behavior {
            MockBehavior::Respond(drafts) => Ok(drafts),
            MockBehavior::Fail(message) => Err(DomainError::external("mock", message)),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                Ok(Vec::new())
            }
        }
    }
}
