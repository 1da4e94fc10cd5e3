//! Bounded delegation to the reasoning service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::models::{RecommendationDraft, TrackingContext, TrackingRecommendation};
use crate::domain::ports::{ContextView, NullRecommender, Recommender};

/// Wraps a [`Recommender`] so that it can never fail or stall an update.
///
/// Successful responses are normalized and merged into the context's
/// existing recommendations. A failed or timed-out call leaves the existing
/// list untouched.
#[derive(Clone)]
pub struct RecommendationGenerator {
    recommender: Arc<dyn Recommender>,
    timeout: Duration,
    update_limit: usize,
}

impl std::fmt::Debug for RecommendationGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationGenerator")
            .field("recommender", &self.recommender.name())
            .field("timeout", &self.timeout)
            .field("update_limit", &self.update_limit)
            .finish()
    }
}

impl Default for RecommendationGenerator {
    fn default() -> Self {
        Self::new(Arc::new(NullRecommender), Duration::from_millis(5000), 20)
    }
}

impl RecommendationGenerator {
    pub fn new(recommender: Arc<dyn Recommender>, timeout: Duration, update_limit: usize) -> Self {
        Self {
            recommender,
            timeout,
            update_limit,
        }
    }

    pub fn recommender_name(&self) -> &'static str {
        self.recommender.name()
    }

    pub async fn generate(&self, context: &TrackingContext) -> Vec<TrackingRecommendation> {
        let view = ContextView::from_context(context, self.update_limit);

        let drafts = match tokio::time::timeout(self.timeout, self.recommender.recommend(&view)).await
        {
            Ok(Ok(drafts)) => drafts,
            Ok(Err(e)) => {
                warn!(
                    recommender = self.recommender.name(),
                    session_id = %context.session_id,
                    error = %e,
                    "recommender failed, keeping previous recommendations"
                );
                return context.recommendations.clone();
            }
            Err(_) => {
                warn!(
                    recommender = self.recommender.name(),
                    session_id = %context.session_id,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "recommender timed out, keeping previous recommendations"
                );
                return context.recommendations.clone();
            }
        };

        debug!(
            recommender = self.recommender.name(),
            count = drafts.len(),
            "received recommendations"
        );
        merge(
            context.recommendations.clone(),
            drafts,
            self.recommender.name(),
        )
    }
}

/// Clamp into `[0, 1]`; non-finite values become `0`.
pub fn normalize_confidence(confidence: f64) -> f64 {
    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Merge drafts into an existing list, deduplicating on `(type, title)`.
///
/// A later entry replaces an earlier one in place, so the list keeps the
/// position of the first occurrence.
pub fn merge(
    mut existing: Vec<TrackingRecommendation>,
    drafts: Vec<RecommendationDraft>,
    source: &str,
) -> Vec<TrackingRecommendation> {
    let now = Utc::now();

    for draft in drafts {
        let recommendation = TrackingRecommendation {
            id: Uuid::new_v4(),
            recommendation_type: draft.recommendation_type,
            title: draft.title,
            description: draft.description,
            confidence: normalize_confidence(draft.confidence),
            estimated_impact: draft.estimated_impact,
            priority: draft.priority,
            applicability: draft.applicability,
            source: source.to_string(),
            generated_at: now,
        };

        match existing.iter_mut().find(|r| r.key() == recommendation.key()) {
            Some(slot) => *slot = recommendation,
            None => existing.push(recommendation),
        }
    }

    existing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::recommenders::MockRecommender;
    use crate::domain::models::{ItemPriority, RecommendationType};
    use crate::services::test_support::sample_context;

    fn draft(title: &str, confidence: f64) -> RecommendationDraft {
        RecommendationDraft {
            recommendation_type: RecommendationType::Timeline,
            title: title.to_string(),
            description: format!("{title} description"),
            confidence,
            estimated_impact: Default::default(),
            priority: ItemPriority::High,
            applicability: Default::default(),
        }
    }

    #[test]
    fn test_normalize_confidence() {
        assert!((normalize_confidence(1.7) - 1.0).abs() < f64::EPSILON);
        assert!(normalize_confidence(-0.2).abs() < f64::EPSILON);
        assert!(normalize_confidence(f64::NAN).abs() < f64::EPSILON);
        assert!(normalize_confidence(f64::INFINITY).abs() < f64::EPSILON);
        assert!((normalize_confidence(0.4) - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_later_entry_wins() {
        let merged = merge(
            Vec::new(),
            vec![draft("Add crew", 0.3), draft("Add crew", 0.9), draft("Reorder", 0.5)],
            "mock",
        );
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].title, "Add crew");
        assert!((merged[0].confidence - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_generate_merges_into_existing() {
        let recommender = Arc::new(MockRecommender::new());
        recommender.respond(vec![draft("Add crew", 0.8)]).await;
        let generator = RecommendationGenerator::new(recommender.clone(), Duration::from_secs(1), 20);

        let mut context = sample_context();
        context.recommendations = merge(Vec::new(), vec![draft("Reorder", 0.5)], "previous");

        let recommendations = generator.generate(&context).await;
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[1].source, "mock");
        assert_eq!(recommender.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_list() {
        let recommender = Arc::new(MockRecommender::new());
        recommender.fail("service unavailable").await;
        let generator = RecommendationGenerator::new(recommender, Duration::from_secs(1), 20);

        let mut context = sample_context();
        context.recommendations = merge(Vec::new(), vec![draft("Reorder", 0.5)], "previous");

        let recommendations = generator.generate(&context).await;
        assert_eq!(recommendations, context.recommendations);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_previous_list() {
        let recommender = Arc::new(MockRecommender::new());
        recommender.hang().await;
        let generator = RecommendationGenerator::new(recommender, Duration::from_millis(50), 20);

        let context = sample_context();
        let recommendations = generator.generate(&context).await;
        assert!(recommendations.is_empty());
    }
}
