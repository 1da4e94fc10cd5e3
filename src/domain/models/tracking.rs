//! Tracking context domain model.
//!
//! A [`TrackingContext`] is the root aggregate of one tracking session. It is
//! treated as a value: every engine operation produces a new context rather
//! than patching the stored one, and every derived field (completion
//! percentages, phase status, metrics, alerts) is recomputed from the item
//! states on each mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checklist::{ItemStatus, SmartChecklist, SmartChecklistItem};
use super::metric::{PredictiveAlert, RealTimeMetric};
use super::recommendation::TrackingRecommendation;

/// Kind of deployment being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationType {
    Poc,
    Pilot,
    FullDeployment,
    Migration,
}

impl ImplementationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poc => "poc",
            Self::Pilot => "pilot",
            Self::FullDeployment => "full_deployment",
            Self::Migration => "migration",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "poc" => Some(Self::Poc),
            "pilot" => Some(Self::Pilot),
            "full_deployment" | "full-deployment" => Some(Self::FullDeployment),
            "migration" => Some(Self::Migration),
            _ => None,
        }
    }

    /// Multiplier applied to template effort estimates.
    pub const fn effort_factor(&self) -> f64 {
        match self {
            Self::Poc => 0.5,
            Self::Pilot => 0.75,
            Self::FullDeployment => 1.0,
            Self::Migration => 1.25,
        }
    }

    /// Ordered phases a session of this type walks through.
    pub const fn phase_plan(&self) -> &'static [PhaseType] {
        &[
            PhaseType::PreDeployment,
            PhaseType::Deployment,
            PhaseType::Validation,
            PhaseType::Optimization,
        ]
    }
}

impl std::fmt::Display for ImplementationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of an implementation project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    PreDeployment,
    Deployment,
    Validation,
    Optimization,
    Handover,
}

impl PhaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreDeployment => "pre_deployment",
            Self::Deployment => "deployment",
            Self::Validation => "validation",
            Self::Optimization => "optimization",
            Self::Handover => "handover",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pre_deployment" => Some(Self::PreDeployment),
            "deployment" => Some(Self::Deployment),
            "validation" => Some(Self::Validation),
            "optimization" => Some(Self::Optimization),
            "handover" => Some(Self::Handover),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PreDeployment => "Pre-Deployment",
            Self::Deployment => "Deployment",
            Self::Validation => "Validation",
            Self::Optimization => "Optimization",
            Self::Handover => "Handover",
        }
    }

    /// Short prefix used to build item ids (`pre-01`, `dep-03`, ...).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::PreDeployment => "pre",
            Self::Deployment => "dep",
            Self::Validation => "val",
            Self::Optimization => "opt",
            Self::Handover => "hnd",
        }
    }

    pub fn phase_id(&self) -> String {
        format!("phase-{}", self.as_str())
    }

    pub fn checklist_id(&self) -> String {
        format!("checklist-{}", self.as_str())
    }
}

/// Status of a project phase.
///
/// `NotStarted`, `InProgress` and `Completed` are derived from item state.
/// `Blocked` and `Delayed` are side-states set only by the caller; they stick
/// until cleared or until the phase completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    NotStarted,
    InProgress,
    Completed,
    Blocked,
    Delayed,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Delayed => "delayed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            "delayed" => Some(Self::Delayed),
            _ => None,
        }
    }

    pub fn is_side_state(&self) -> bool {
        matches!(self, Self::Blocked | Self::Delayed)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriteriaStatus {
    Pending,
    Met,
    NotMet,
}

/// A condition a phase must satisfy to be considered successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessCriteria {
    pub id: String,
    pub description: String,
    /// Measurable target, e.g. `100% checklist completion`.
    pub target: String,
    pub status: CriteriaStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Open,
    Mitigated,
    Occurred,
    Closed,
}

impl RiskStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// A declared risk attached to a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub id: String,
    pub description: String,
    /// Baseline likelihood in `[0, 1]`.
    pub probability: f64,
    /// Consequence weight in `[0, 1]`.
    pub impact: f64,
    pub mitigation: String,
    pub status: RiskStatus,
}

impl RiskFactor {
    pub fn score(&self) -> f64 {
        self.probability * self.impact
    }
}

/// A named stage of the project owning one or more checklists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPhase {
    pub id: String,
    pub name: String,
    pub phase_type: PhaseType,
    pub status: PhaseStatus,
    pub completion_percentage: f64,
    /// Ids of phases that must complete before this one.
    pub dependencies: Vec<String>,
    pub success_criteria: Vec<SuccessCriteria>,
    pub risk_factors: Vec<RiskFactor>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    Pending,
    InProgress,
    Achieved,
    Missed,
}

impl MilestoneState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Achieved => "achieved",
            Self::Missed => "missed",
        }
    }
}

/// Completion milestone of a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneStatus {
    pub id: String,
    pub phase_id: String,
    pub name: String,
    pub target_date: Option<DateTime<Utc>>,
    pub status: MilestoneState,
    pub achieved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationStatus {
    UnderUtilized,
    OnTrack,
    OverBudget,
}

impl UtilizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnderUtilized => "under_utilized",
            Self::OnTrack => "on_track",
            Self::OverBudget => "over_budget",
        }
    }
}

/// Effort consumption for one item category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUtilization {
    pub category: String,
    /// Sum of estimated hours of all items in the category.
    pub allocated_hours: f64,
    /// Sum of reported actual hours.
    pub consumed_hours: f64,
    /// Estimated hours of completed items.
    pub earned_hours: f64,
    pub utilization_percentage: f64,
    pub status: UtilizationStatus,
}

/// One applied `update_progress` call, kept in a bounded log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdateRecord {
    pub item_id: String,
    pub checklist_id: String,
    pub previous_status: ItemStatus,
    pub status: ItemStatus,
    pub actual_hours: Option<f64>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Root aggregate of a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingContext {
    pub project_id: String,
    pub session_id: Uuid,
    pub project_name: String,
    pub current_phase_id: String,
    pub implementation_type: ImplementationType,
    pub phases: Vec<ProjectPhase>,
    pub checklists: Vec<SmartChecklist>,
    pub metrics: Vec<RealTimeMetric>,
    pub alerts: Vec<PredictiveAlert>,
    pub recommendations: Vec<TrackingRecommendation>,
    pub milestones: Vec<MilestoneStatus>,
    pub resource_utilization: Vec<ResourceUtilization>,
    #[serde(default)]
    pub recent_updates: Vec<ProgressUpdateRecord>,
    /// Team capacity in hours per working day.
    pub daily_capacity_hours: f64,
    pub target_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl TrackingContext {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn phase(&self, phase_id: &str) -> Option<&ProjectPhase> {
        self.phases.iter().find(|p| p.id == phase_id)
    }

    pub fn current_phase(&self) -> Option<&ProjectPhase> {
        self.phase(&self.current_phase_id)
    }

    /// The last phase of the session plan.
    pub fn final_phase(&self) -> Option<&ProjectPhase> {
        self.phases.last()
    }

    pub fn checklists_for_phase<'a>(
        &'a self,
        phase_id: &'a str,
    ) -> impl Iterator<Item = &'a SmartChecklist> + 'a {
        self.checklists.iter().filter(move |c| c.phase_id == phase_id)
    }

    pub fn items(&self) -> impl Iterator<Item = &SmartChecklistItem> {
        self.checklists.iter().flat_map(|c| c.items.iter())
    }

    pub fn active_alerts(&self) -> impl Iterator<Item = &PredictiveAlert> {
        self.alerts.iter().filter(|a| a.status.is_active())
    }

    pub fn metric(&self, name: &str) -> Option<&RealTimeMetric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_implementation_type_round_trip() {
        for t in [
            ImplementationType::Poc,
            ImplementationType::Pilot,
            ImplementationType::FullDeployment,
            ImplementationType::Migration,
        ] {
            assert_eq!(ImplementationType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(
            ImplementationType::from_str("full-deployment"),
            Some(ImplementationType::FullDeployment)
        );
        assert!(ImplementationType::from_str("greenfield").is_none());
    }

    #[test]
    fn test_phase_ids_are_stable() {
        assert_eq!(PhaseType::Validation.phase_id(), "phase-validation");
        assert_eq!(PhaseType::PreDeployment.checklist_id(), "checklist-pre_deployment");
    }

    #[test]
    fn test_side_states() {
        assert!(PhaseStatus::Blocked.is_side_state());
        assert!(PhaseStatus::Delayed.is_side_state());
        assert!(!PhaseStatus::Completed.is_side_state());
        assert_eq!(PhaseStatus::from_str("IN_PROGRESS"), Some(PhaseStatus::InProgress));
    }

    #[test]
    fn test_risk_score() {
        let risk = RiskFactor {
            id: "r".to_string(),
            description: "d".to_string(),
            probability: 0.5,
            impact: 0.8,
            mitigation: String::new(),
            status: RiskStatus::Open,
        };
        assert!((risk.score() - 0.4).abs() < f64::EPSILON);
    }
}
