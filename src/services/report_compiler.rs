//! Report compilation and read-only analyses.
//!
//! [`ReportCompiler::compile`] is a pure function of the context and the
//! supplied timestamp: compiling the same context twice yields reports that
//! differ only in `generated_at`. The timeline and resource analyses also
//! read historical sessions of the same project.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::models::{
    AlertSeverity, ChecklistProgress, ExecutiveSummary, IntelligentReport, ItemStatus,
    MilestoneState, PhaseForecast, PhaseProgress, PhaseStatus, ProgressAnalysis, ProjectHealth,
    Reallocation, ResourceAnalysis, ResourceOptimization, RiskAnalysis, RiskSummary,
    SmartChecklistItem, TimelineForecast, TimelinePrediction, TrackingContext,
    TrackingRecommendation, UtilizationStatus,
};
use crate::services::alert_analyzer::effective_probability;
use crate::services::checklist_generator::{advance_days, working_days};
use crate::services::progress_aggregator::{resource_utilization, ProgressAggregator, ProgressScope};

const TOP_RISKS: usize = 5;
const MAX_CONFIDENCE: f64 = 0.95;
const BASE_CONFIDENCE: f64 = 0.5;
const CONFIDENCE_PER_SAMPLE: f64 = 0.05;

#[derive(Debug, Clone, Default)]
pub struct ReportCompiler {
    aggregator: ProgressAggregator,
}

impl ReportCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compile(&self, context: &TrackingContext, generated_at: DateTime<Utc>) -> IntelligentReport {
        IntelligentReport {
            session_id: context.session_id,
            project_id: context.project_id.clone(),
            executive_summary: self.executive_summary(context),
            progress_analysis: progress_analysis(context),
            risk_analysis: risk_analysis(context),
            resource_analysis: resource_analysis(context),
            timeline_forecast: timeline_forecast(context),
            recommendations: ordered_recommendations(&context.recommendations),
            key_metrics: context.metrics.clone(),
            milestone_status: context.milestones.clone(),
            generated_at,
        }
    }

    fn executive_summary(&self, context: &TrackingContext) -> ExecutiveSummary {
        let overall = self
            .aggregator
            .overall_progress(context, ProgressScope::CurrentPhase);
        let cross = self.aggregator.overall_progress(context, ProgressScope::CrossPhase);
        let active_alerts = context.active_alerts().count();
        let critical_alerts = context
            .active_alerts()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count();
        let current_phase = context
            .current_phase()
            .map_or_else(String::new, |p| p.name.clone());
        let health = classify_health(context);

        ExecutiveSummary {
            project_name: context.project_name.clone(),
            implementation_type: context.implementation_type,
            headline: format!(
                "{current_phase} at {overall:.0}% ({cross:.0}% across phases), {active_alerts} active alert(s), {}",
                health.as_str()
            ),
            current_phase,
            overall_progress: overall,
            cross_phase_progress: cross,
            health,
            active_alerts,
            critical_alerts,
        }
    }

    /// Forecast completion from remaining effort and the effort ratio learned
    /// from completed work of this and earlier sessions.
    ///
    /// Working days are counted as calendar days.
    pub fn predict_timeline(
        &self,
        context: &TrackingContext,
        history: &[TrackingContext],
        as_of: DateTime<Utc>,
    ) -> TimelinePrediction {
        let (effort_ratio, sample_size) = effort_ratio(
            context.items().chain(
                history
                    .iter()
                    .filter(|h| h.session_id != context.session_id)
                    .flat_map(TrackingContext::items),
            ),
        );
        let capacity = context.daily_capacity_hours;

        let mut cursor = as_of;
        let phase_forecasts: Vec<PhaseForecast> = context
            .phases
            .iter()
            .map(|phase| {
                let remaining = remaining_hours(
                    context
                        .checklists_for_phase(&phase.id)
                        .flat_map(|c| c.items.iter()),
                ) * effort_ratio;
                cursor = advance_days(cursor, working_days(remaining, capacity));
                PhaseForecast {
                    phase_id: phase.id.clone(),
                    remaining_hours: remaining,
                    predicted_completion: cursor,
                }
            })
            .collect();

        let remaining_effort_hours = remaining_hours(context.items()) * effort_ratio;
        let predicted_completion = advance_days(as_of, working_days(remaining_effort_hours, capacity));
        let variance_days = context
            .target_completion
            .map(|target| (predicted_completion - target).num_days());

        TimelinePrediction {
            session_id: context.session_id,
            as_of,
            remaining_effort_hours,
            effort_ratio,
            sample_size,
            predicted_completion,
            target_completion: context.target_completion,
            variance_days,
            on_track: variance_days.map_or(true, |d| d <= 0),
            confidence: prediction_confidence(sample_size),
            phase_forecasts,
        }
    }

    /// Efficiency, bottlenecks and reallocation suggestions across item
    /// categories.
    pub fn optimize_resources(
        &self,
        context: &TrackingContext,
        history: &[TrackingContext],
    ) -> ResourceOptimization {
        let utilization = resource_utilization(context.items());
        let total_allocated_hours: f64 = utilization.iter().map(|u| u.allocated_hours).sum();
        let total_consumed_hours: f64 = utilization.iter().map(|u| u.consumed_hours).sum();
        let earned: f64 = utilization.iter().map(|u| u.earned_hours).sum();

        let historical_efficiency = {
            let past: Vec<_> = history
                .iter()
                .filter(|h| h.session_id != context.session_id)
                .flat_map(|h| resource_utilization(h.items()))
                .collect();
            ratio(
                past.iter().map(|u| u.earned_hours).sum(),
                past.iter().map(|u| u.consumed_hours).sum(),
            )
        };

        let mut bottlenecks: BTreeSet<String> = utilization
            .iter()
            .filter(|u| u.status == UtilizationStatus::OverBudget)
            .map(|u| u.category.clone())
            .collect();
        bottlenecks.extend(
            context
                .items()
                .filter(|i| i.status == ItemStatus::Blocked)
                .map(|i| i.category.clone()),
        );

        let mut donors: Vec<(String, f64)> = utilization
            .iter()
            .filter(|u| u.status == UtilizationStatus::UnderUtilized)
            .map(|u| (u.category.clone(), u.earned_hours - u.consumed_hours))
            .collect();
        let mut receivers: Vec<(String, f64)> = utilization
            .iter()
            .filter(|u| u.status == UtilizationStatus::OverBudget)
            .map(|u| (u.category.clone(), u.consumed_hours - u.allocated_hours))
            .collect();
        donors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        receivers.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ResourceOptimization {
            session_id: context.session_id,
            total_allocated_hours,
            total_consumed_hours,
            efficiency: ratio(earned, total_consumed_hours),
            historical_efficiency,
            bottlenecks: bottlenecks.into_iter().collect(),
            reallocations: plan_reallocations(donors, receivers),
        }
    }
}

fn classify_health(context: &TrackingContext) -> ProjectHealth {
    let critical_alert = context
        .active_alerts()
        .any(|a| a.severity == AlertSeverity::Critical);
    if critical_alert || context.phases.iter().any(|p| p.status == PhaseStatus::Blocked) {
        return ProjectHealth::Critical;
    }

    let missed = context
        .milestones
        .iter()
        .any(|m| m.status == MilestoneState::Missed);
    if context.active_alerts().next().is_some()
        || missed
        || context.phases.iter().any(|p| p.status == PhaseStatus::Delayed)
    {
        ProjectHealth::AtRisk
    } else {
        ProjectHealth::OnTrack
    }
}

fn progress_analysis(context: &TrackingContext) -> ProgressAnalysis {
    let phases = context
        .phases
        .iter()
        .map(|phase| {
            let items: Vec<&SmartChecklistItem> = context
                .checklists_for_phase(&phase.id)
                .flat_map(|c| c.items.iter())
                .collect();
            PhaseProgress {
                phase_id: phase.id.clone(),
                name: phase.name.clone(),
                status: phase.status,
                completion_percentage: phase.completion_percentage,
                items_total: items.len(),
                items_completed: items.iter().filter(|i| i.is_completed()).count(),
                items_blocked: items
                    .iter()
                    .filter(|i| i.status == ItemStatus::Blocked)
                    .count(),
            }
        })
        .collect();

    let mut checklists: Vec<ChecklistProgress> = context
        .checklists
        .iter()
        .map(|c| ChecklistProgress {
            checklist_id: c.id.clone(),
            phase_id: c.phase_id.clone(),
            title: c.title.clone(),
            completion_percentage: c.completion_percentage,
            priority_score: c.priority_score,
        })
        .collect();
    checklists.sort_by(|a, b| {
        b.priority_score
            .total_cmp(&a.priority_score)
            .then_with(|| a.checklist_id.cmp(&b.checklist_id))
    });

    ProgressAnalysis {
        phases,
        checklists,
        blocked_items: context
            .items()
            .filter(|i| i.status == ItemStatus::Blocked)
            .map(|i| i.id.clone())
            .collect(),
    }
}

fn risk_analysis(context: &TrackingContext) -> RiskAnalysis {
    let mut active_alerts: Vec<_> = context.active_alerts().cloned().collect();
    active_alerts.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.raised_at.cmp(&b.raised_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut top_risks: Vec<RiskSummary> = context
        .phases
        .iter()
        .filter(|p| p.status != PhaseStatus::Completed)
        .flat_map(|phase| {
            let blocked = context
                .checklists_for_phase(&phase.id)
                .flat_map(|c| c.items.iter())
                .filter(|i| i.status == ItemStatus::Blocked)
                .count();
            phase
                .risk_factors
                .iter()
                .filter(|r| r.status.is_open())
                .map(move |risk| RiskSummary {
                    risk_id: risk.id.clone(),
                    phase_id: phase.id.clone(),
                    description: risk.description.clone(),
                    score: effective_probability(risk.probability, blocked) * risk.impact,
                })
        })
        .collect();
    top_risks.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.risk_id.cmp(&b.risk_id)));
    top_risks.truncate(TOP_RISKS);

    RiskAnalysis {
        active_alerts,
        top_risks,
    }
}

fn resource_analysis(context: &TrackingContext) -> ResourceAnalysis {
    let estimated_hours = context.items().map(|i| i.estimated_hours).sum();
    let actual_hours: f64 = context.items().filter_map(|i| i.actual_hours).sum();
    let earned_hours: f64 = context
        .items()
        .filter(|i| i.is_completed())
        .map(|i| i.estimated_hours)
        .sum();

    ResourceAnalysis {
        estimated_hours,
        actual_hours,
        earned_hours,
        efficiency: ratio(earned_hours, actual_hours),
        utilization: context.resource_utilization.clone(),
    }
}

fn timeline_forecast(context: &TrackingContext) -> TimelineForecast {
    let (effort_ratio, _) = effort_ratio(context.items());
    let remaining_hours = remaining_hours(context.items());
    let projected_working_days = if context.daily_capacity_hours > 0.0 {
        remaining_hours * effort_ratio / context.daily_capacity_hours
    } else {
        0.0
    };

    TimelineForecast {
        remaining_hours,
        effort_ratio,
        projected_working_days,
        target_completion: context.target_completion,
    }
}

/// Highest priority first, then highest confidence.
fn ordered_recommendations(recommendations: &[TrackingRecommendation]) -> Vec<TrackingRecommendation> {
    let mut ordered = recommendations.to_vec();
    ordered.sort_by(|a, b| match b.priority.cmp(&a.priority) {
        Ordering::Equal => b.confidence.total_cmp(&a.confidence),
        other => other,
    });
    ordered
}

/// Estimated hours of items that are neither completed nor skipped.
fn remaining_hours<'a>(items: impl Iterator<Item = &'a SmartChecklistItem>) -> f64 {
    items
        .filter(|i| !matches!(i.status, ItemStatus::Completed | ItemStatus::Skipped))
        .map(|i| i.estimated_hours)
        .sum()
}

/// Actual over estimated hours across completed items that report effort.
/// Defaults to `1.0` with no samples.
pub fn effort_ratio<'a>(items: impl Iterator<Item = &'a SmartChecklistItem>) -> (f64, usize) {
    let (estimated, actual, samples) = items
        .filter(|i| i.is_completed() && i.estimated_hours > 0.0)
        .filter_map(|i| i.actual_hours.map(|a| (i.estimated_hours, a)))
        .fold((0.0, 0.0, 0), |(e, a, n), (ie, ia)| (e + ie, a + ia, n + 1));

    if samples == 0 || estimated <= 0.0 {
        (1.0, samples)
    } else {
        (actual / estimated, samples)
    }
}

pub fn prediction_confidence(sample_size: usize) -> f64 {
    (BASE_CONFIDENCE + CONFIDENCE_PER_SAMPLE * sample_size as f64).min(MAX_CONFIDENCE)
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    (denominator > 0.0).then(|| numerator / denominator)
}

/// Greedy matching of spare hours to overruns, largest first. Transfers are
/// rounded down to the half hour; anything smaller is dropped.
fn plan_reallocations(mut donors: Vec<(String, f64)>, receivers: Vec<(String, f64)>) -> Vec<Reallocation> {
    let mut plan = Vec::new();

    for (to_category, mut need) in receivers {
        for (from_category, spare) in &mut donors {
            if need < 0.5 {
                break;
            }
            let hours = (need.min(*spare) * 2.0).floor() / 2.0;
            if hours < 0.5 {
                continue;
            }
            *spare -= hours;
            need -= hours;
            plan.push(Reallocation {
                from_category: from_category.clone(),
                to_category: to_category.clone(),
                hours,
            });
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::models::{AlertStatus, AlertType, PredictiveAlert};
    use crate::services::progress_aggregator::ProgressAggregator;
    use crate::services::test_support::{sample_context, set_item, set_phase_items};
    use uuid::Uuid;

    fn recomputed(context: TrackingContext) -> TrackingContext {
        ProgressAggregator::new().recompute(context, Utc::now())
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = ReportCompiler::new();
        let mut context = sample_context();
        set_item(&mut context, "pre-01", ItemStatus::Completed, Some(20.0));
        set_item(&mut context, "pre-02", ItemStatus::Blocked, None);
        let context = recomputed(context);

        let first = compiler.compile(&context, Utc::now());
        let mut second = compiler.compile(&context, Utc::now() + Duration::seconds(5));
        assert_ne!(first.generated_at, second.generated_at);
        second.generated_at = first.generated_at;
        assert_eq!(first, second);
    }

    #[test]
    fn test_health_classification() {
        let compiler = ReportCompiler::new();
        let mut context = recomputed(sample_context());
        assert_eq!(
            compiler.compile(&context, Utc::now()).executive_summary.health,
            ProjectHealth::OnTrack
        );

        context.alerts.push(PredictiveAlert {
            id: Uuid::new_v4(),
            alert_type: AlertType::MetricThreshold,
            severity: AlertSeverity::Medium,
            probability: 0.6,
            trigger_condition: "Blocked Items:warning".to_string(),
            description: String::new(),
            phase_id: None,
            status: AlertStatus::Active,
            raised_at: Utc::now(),
        });
        assert_eq!(
            compiler.compile(&context, Utc::now()).executive_summary.health,
            ProjectHealth::AtRisk
        );

        context.phases[0].status = PhaseStatus::Blocked;
        let report = compiler.compile(&context, Utc::now());
        assert_eq!(report.executive_summary.health, ProjectHealth::Critical);
        assert_eq!(report.executive_summary.active_alerts, 1);
    }

    #[test]
    fn test_checklists_ordered_by_priority() {
        let report = ReportCompiler::new().compile(&recomputed(sample_context()), Utc::now());
        let scores: Vec<f64> = report
            .progress_analysis
            .checklists
            .iter()
            .map(|c| c.priority_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(report.progress_analysis.checklists[0].phase_id, "phase-deployment");
    }

    #[test]
    fn test_effort_ratio_defaults_to_one() {
        let context = sample_context();
        assert_eq!(effort_ratio(context.items()), (1.0, 0));
    }

    #[test]
    fn test_predict_timeline_uses_history() {
        let compiler = ReportCompiler::new();
        let context = recomputed(sample_context());

        // An earlier session that ran 50% over on two items.
        let mut past = sample_context();
        set_item(&mut past, "pre-01", ItemStatus::Completed, Some(24.0));
        set_item(&mut past, "pre-05", ItemStatus::Completed, Some(9.0));

        let as_of = Utc::now();
        let prediction = compiler.predict_timeline(&context, &[past], as_of);
        assert_eq!(prediction.sample_size, 2);
        assert!((prediction.effort_ratio - 1.5).abs() < 1e-9);
        assert!((prediction.confidence - 0.6).abs() < 1e-9);

        let total: f64 = context.items().map(|i| i.estimated_hours).sum();
        assert!((prediction.remaining_effort_hours - total * 1.5).abs() < 1e-9);
        assert_eq!(
            prediction.phase_forecasts.last().map(|p| p.predicted_completion >= as_of),
            Some(true)
        );
        assert!(prediction.on_track);
    }

    #[test]
    fn test_predict_timeline_against_target() {
        let compiler = ReportCompiler::new();
        let as_of = Utc::now();
        let mut context = recomputed(sample_context());
        context.target_completion = Some(as_of + Duration::days(1));

        let prediction = compiler.predict_timeline(&context, &[], as_of);
        assert!(!prediction.on_track);
        assert!(prediction.variance_days.unwrap_or_default() > 0);
    }

    #[test]
    fn test_confidence_capped() {
        assert!((prediction_confidence(0) - 0.5).abs() < f64::EPSILON);
        assert!((prediction_confidence(100) - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn test_optimize_suggests_reallocation() {
        let compiler = ReportCompiler::new();
        let mut context = sample_context();
        // planning (22h allocated) overruns by 18h.
        set_item(&mut context, "pre-01", ItemStatus::Completed, Some(40.0));
        // design (24h) finished with 4h consumed.
        set_item(&mut context, "pre-02", ItemStatus::Completed, Some(4.0));
        let context = recomputed(context);

        let optimization = compiler.optimize_resources(&context, &[]);
        assert_eq!(optimization.bottlenecks, vec!["planning".to_string()]);
        assert_eq!(
            optimization.reallocations,
            vec![Reallocation {
                from_category: "design".to_string(),
                to_category: "planning".to_string(),
                hours: 18.0,
            }]
        );
        assert!(optimization.historical_efficiency.is_none());
    }

    #[test]
    fn test_remaining_hours_skips_skipped_items() {
        let mut context = sample_context();
        set_phase_items(&mut context, "phase-pre_deployment", ItemStatus::Skipped);
        let pre: f64 = context
            .checklists_for_phase("phase-pre_deployment")
            .flat_map(|c| c.items.iter())
            .map(|i| i.estimated_hours)
            .sum();
        let total: f64 = context.items().map(|i| i.estimated_hours).sum();
        assert!((remaining_hours(context.items()) - (total - pre)).abs() < 1e-9);
    }
}
