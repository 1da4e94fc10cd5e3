//! Domain models for deploytrack.
//!
//! - [`TrackingContext`]: root aggregate of a tracking session
//! - [`SmartChecklist`] / [`SmartChecklistItem`]: phase work breakdown
//! - [`RealTimeMetric`] / [`PredictiveAlert`]: derived health signals
//! - [`TrackingRecommendation`]: suggestions from the reasoning service
//! - [`IntelligentReport`], [`TimelinePrediction`], [`ResourceOptimization`]: read models

pub mod checklist;
pub mod config;
pub mod metric;
pub mod project;
pub mod recommendation;
pub mod report;
pub mod tracking;

pub use checklist::{ItemPriority, ItemStatus, SmartChecklist, SmartChecklistItem};
pub use config::{
    AlertingConfig, Config, DatabaseConfig, LoggingConfig, RecommenderConfig, SchedulingConfig,
    TrackingConfig,
};
pub use metric::{
    AlertSeverity, AlertStatus, AlertThresholds, AlertType, MetricTrend, MetricType,
    PredictiveAlert, RealTimeMetric, ThresholdDirection,
};
pub use project::ProjectMetadata;
pub use recommendation::{
    ApplicabilityWindow, EstimatedImpact, RecommendationDraft, RecommendationType,
    TrackingRecommendation,
};
pub use report::{
    ChecklistProgress, ExecutiveSummary, IntelligentReport, PhaseForecast, PhaseProgress,
    ProgressAnalysis, ProjectHealth, Reallocation, ResourceAnalysis, ResourceOptimization,
    RiskAnalysis, RiskSummary, TimelineForecast, TimelinePrediction,
};
pub use tracking::{
    CriteriaStatus, ImplementationType, MilestoneState, MilestoneStatus, PhaseStatus, PhaseType,
    ProgressUpdateRecord, ProjectPhase, ResourceUtilization, RiskFactor, RiskStatus,
    SuccessCriteria, TrackingContext, UtilizationStatus,
};
