//! Recommendations sourced from the reasoning collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checklist::ItemPriority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Timeline,
    Resource,
    Quality,
    Risk,
    Process,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeline => "timeline",
            Self::Resource => "resource",
            Self::Quality => "quality",
            Self::Risk => "risk",
            Self::Process => "process",
        }
    }
}

/// Expected effect of following a recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedImpact {
    /// Days gained (positive) or lost (negative).
    #[serde(default)]
    pub timeline_days: f64,
    /// Relative cost change, e.g. `-0.1` for ten percent cheaper.
    #[serde(default)]
    pub cost_delta: f64,
    #[serde(default)]
    pub quality_delta: f64,
    #[serde(default)]
    pub risk_delta: f64,
}

/// Time span during which a recommendation is worth acting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicabilityWindow {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

/// A suggestion as returned by a [`Recommender`](crate::domain::ports::Recommender).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationDraft {
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    #[serde(default)]
    pub estimated_impact: EstimatedImpact,
    #[serde(default)]
    pub priority: ItemPriority,
    #[serde(default)]
    pub applicability: ApplicabilityWindow,
}

/// A recommendation merged into a tracking context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecommendation {
    pub id: Uuid,
    pub recommendation_type: RecommendationType,
    pub title: String,
    pub description: String,
    /// Normalized into `[0, 1]`.
    pub confidence: f64,
    pub estimated_impact: EstimatedImpact,
    pub priority: ItemPriority,
    pub applicability: ApplicabilityWindow,
    /// Name of the recommender that produced it.
    pub source: String,
    pub generated_at: DateTime<Utc>,
}

impl TrackingRecommendation {
    /// Deduplication key.
    pub fn key(&self) -> (RecommendationType, &str) {
        (self.recommendation_type, self.title.as_str())
    }
}
