//! Report and analysis snapshots.
//!
//! These are immutable read models compiled from a [`TrackingContext`]; none of
//! them feed back into tracking state.
//!
//! [`TrackingContext`]: super::TrackingContext

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::metric::{PredictiveAlert, RealTimeMetric};
use super::recommendation::TrackingRecommendation;
use super::tracking::{ImplementationType, MilestoneStatus, PhaseStatus, ResourceUtilization};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectHealth {
    OnTrack,
    AtRisk,
    Critical,
}

impl ProjectHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::AtRisk => "at_risk",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub project_name: String,
    pub implementation_type: ImplementationType,
    pub current_phase: String,
    pub overall_progress: f64,
    pub cross_phase_progress: f64,
    pub health: ProjectHealth,
    pub active_alerts: usize,
    pub critical_alerts: usize,
    pub headline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseProgress {
    pub phase_id: String,
    pub name: String,
    pub status: PhaseStatus,
    pub completion_percentage: f64,
    pub items_total: usize,
    pub items_completed: usize,
    pub items_blocked: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub checklist_id: String,
    pub phase_id: String,
    pub title: String,
    pub completion_percentage: f64,
    pub priority_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressAnalysis {
    pub phases: Vec<PhaseProgress>,
    /// Ordered by priority score, highest first.
    pub checklists: Vec<ChecklistProgress>,
    pub blocked_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub risk_id: String,
    pub phase_id: String,
    pub description: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub active_alerts: Vec<PredictiveAlert>,
    /// Open risks, highest score first.
    pub top_risks: Vec<RiskSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAnalysis {
    pub estimated_hours: f64,
    pub actual_hours: f64,
    pub earned_hours: f64,
    /// Earned over consumed hours; `None` until effort is reported.
    pub efficiency: Option<f64>,
    pub utilization: Vec<ResourceUtilization>,
}

/// Relative forecast; carries no absolute dates so that it depends only on
/// tracking state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineForecast {
    pub remaining_hours: f64,
    pub effort_ratio: f64,
    pub projected_working_days: f64,
    pub target_completion: Option<DateTime<Utc>>,
}

/// Immutable status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelligentReport {
    pub session_id: Uuid,
    pub project_id: String,
    pub executive_summary: ExecutiveSummary,
    pub progress_analysis: ProgressAnalysis,
    pub risk_analysis: RiskAnalysis,
    pub resource_analysis: ResourceAnalysis,
    pub timeline_forecast: TimelineForecast,
    pub recommendations: Vec<TrackingRecommendation>,
    pub key_metrics: Vec<RealTimeMetric>,
    pub milestone_status: Vec<MilestoneStatus>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseForecast {
    pub phase_id: String,
    pub remaining_hours: f64,
    pub predicted_completion: DateTime<Utc>,
}

/// Forecast of the session's completion date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePrediction {
    pub session_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub remaining_effort_hours: f64,
    /// Actual over estimated hours, learned from completed work.
    pub effort_ratio: f64,
    /// Completed items the ratio was learned from.
    pub sample_size: usize,
    pub predicted_completion: DateTime<Utc>,
    pub target_completion: Option<DateTime<Utc>>,
    /// Positive when the prediction lands after the target.
    pub variance_days: Option<i64>,
    pub on_track: bool,
    pub confidence: f64,
    pub phase_forecasts: Vec<PhaseForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reallocation {
    pub from_category: String,
    pub to_category: String,
    pub hours: f64,
}

/// Suggested rebalancing of effort across item categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceOptimization {
    pub session_id: Uuid,
    pub total_allocated_hours: f64,
    pub total_consumed_hours: f64,
    pub efficiency: Option<f64>,
    /// Efficiency across the project's earlier sessions.
    pub historical_efficiency: Option<f64>,
    pub bottlenecks: Vec<String>,
    pub reallocations: Vec<Reallocation>,
}
