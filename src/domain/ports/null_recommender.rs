//! Null recommender implementation.
//!
//! Used when no reasoning service is configured but the engine still
//! requires a Recommender implementation.

use async_trait::async_trait;

use super::recommender::{ContextView, Recommender};
use crate::domain::errors::DomainResult;
use crate::domain::models::RecommendationDraft;

/// A no-op recommender that never suggests anything.
#[derive(Debug, Clone, Default)]
pub struct NullRecommender;

impl NullRecommender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Recommender for NullRecommender {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn recommend(&self, _view: &ContextView) -> DomainResult<Vec<RecommendationDraft>> {
        Ok(Vec::new())
    }
}
