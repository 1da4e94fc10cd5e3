//! Predictive alert evaluation.
//!
//! Alerts are keyed by `(alert_type, trigger_condition)`. An emission is
//! suppressed while an active alert with the same key exists, including
//! alerts raised earlier in the same pass.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::domain::models::{
    AlertSeverity, AlertStatus, AlertType, AlertingConfig, ItemStatus, MetricTrend, PhaseStatus,
    PredictiveAlert, RealTimeMetric, TrackingContext,
};
use crate::services::metrics_collector::OVERALL_PROGRESS;

/// Probability increase per blocked item in the phase owning a risk.
const BLOCKED_ITEM_RISK_STEP: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct AlertAnalyzer {
    config: AlertingConfig,
}

/// An alert the analyzer wants to raise, before deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertCandidate {
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub probability: f64,
    pub trigger_condition: String,
    pub description: String,
    pub phase_id: Option<String>,
}

impl AlertAnalyzer {
    pub fn new(config: AlertingConfig) -> Self {
        Self { config }
    }

    /// Evaluate the context's metrics and risks and return the alert list
    /// with any new, non-duplicate alerts appended.
    pub fn analyze(&self, context: &TrackingContext, now: DateTime<Utc>) -> Vec<PredictiveAlert> {
        self.evaluate(context, false, now)
    }

    /// [`Self::analyze`] for a context derived from `previous`. When the
    /// current phase moved, the drop in `Overall Progress` is the start of a
    /// new phase, not a regression.
    pub fn analyze_transition(
        &self,
        previous: &TrackingContext,
        context: &TrackingContext,
        now: DateTime<Utc>,
    ) -> Vec<PredictiveAlert> {
        let phase_changed = previous.current_phase_id != context.current_phase_id;
        self.evaluate(context, phase_changed, now)
    }

    fn evaluate(
        &self,
        context: &TrackingContext,
        phase_changed: bool,
        now: DateTime<Utc>,
    ) -> Vec<PredictiveAlert> {
        let mut candidates = self.threshold_candidates(&context.metrics);
        candidates.extend(self.risk_candidates(context));
        if !phase_changed {
            candidates.extend(regression_candidate(context));
        }

        merge_candidates(context.alerts.clone(), candidates, now)
    }

    /// Threshold alerts. Critical is checked first; a metric raises at most
    /// one threshold alert per pass.
    pub fn threshold_candidates(&self, metrics: &[RealTimeMetric]) -> Vec<AlertCandidate> {
        metrics
            .iter()
            .filter_map(|metric| {
                let thresholds = metric.thresholds?;
                let value = metric.current_value;

                let (level, severity, probability, threshold) =
                    if thresholds.crosses(value, thresholds.critical_value) {
                        ("critical", AlertSeverity::Critical, 0.85, thresholds.critical_value)
                    } else if thresholds.crosses(value, thresholds.warning_value) {
                        ("warning", AlertSeverity::Medium, 0.6, thresholds.warning_value)
                    } else {
                        return None;
                    };

                Some(AlertCandidate {
                    alert_type: AlertType::MetricThreshold,
                    severity,
                    probability,
                    trigger_condition: format!("{}:{level}", metric.name),
                    description: format!(
                        "{} is {value:.1}{} (threshold {threshold:.1})",
                        metric.name, metric.unit
                    ),
                    phase_id: None,
                })
            })
            .collect()
    }

    /// Risk alerts for open risks of phases that are not yet completed.
    pub fn risk_candidates(&self, context: &TrackingContext) -> Vec<AlertCandidate> {
        let mut candidates = Vec::new();

        for phase in context
            .phases
            .iter()
            .filter(|p| p.status != PhaseStatus::Completed)
        {
            let blocked = context
                .checklists_for_phase(&phase.id)
                .flat_map(|c| c.items.iter())
                .filter(|i| i.status == ItemStatus::Blocked)
                .count();

            for risk in phase.risk_factors.iter().filter(|r| r.status.is_open()) {
                let probability = effective_probability(risk.probability, blocked);
                let score = probability * risk.impact;
                if score <= self.config.risk_score_threshold {
                    continue;
                }

                let severity = if score >= self.config.critical_risk_score {
                    AlertSeverity::Critical
                } else {
                    AlertSeverity::High
                };

                candidates.push(AlertCandidate {
                    alert_type: AlertType::RiskFactor,
                    severity,
                    probability,
                    trigger_condition: format!("risk:{}", risk.id),
                    description: format!(
                        "{} (score {score:.2}, {blocked} blocked item(s) in {})",
                        risk.description, phase.name
                    ),
                    phase_id: Some(phase.id.clone()),
                });
            }
        }

        candidates
    }
}

/// Baseline probability raised by blocked work, capped at 1.
pub fn effective_probability(probability: f64, blocked_items: usize) -> f64 {
    (probability + BLOCKED_ITEM_RISK_STEP * blocked_items as f64).min(1.0)
}

fn regression_candidate(context: &TrackingContext) -> Option<AlertCandidate> {
    let metric = context.metric(OVERALL_PROGRESS)?;
    if metric.trend != MetricTrend::Declining {
        return None;
    }

    Some(AlertCandidate {
        alert_type: AlertType::ProgressRegression,
        severity: AlertSeverity::High,
        probability: 0.7,
        trigger_condition: format!("regression:{}", context.current_phase_id),
        description: format!(
            "Progress fell from {:.1}% to {:.1}%",
            metric.previous_value.unwrap_or_default(),
            metric.current_value
        ),
        phase_id: Some(context.current_phase_id.clone()),
    })
}

/// Append candidates that do not duplicate an open (active or acknowledged)
/// alert.
pub fn merge_candidates(
    mut alerts: Vec<PredictiveAlert>,
    candidates: Vec<AlertCandidate>,
    now: DateTime<Utc>,
) -> Vec<PredictiveAlert> {
    for candidate in candidates {
        let duplicate = alerts.iter().any(|a| {
            a.status.is_open() && a.same_trigger(candidate.alert_type, &candidate.trigger_condition)
        });
        if duplicate {
            continue;
        }

        info!(
            alert_type = candidate.alert_type.as_str(),
            severity = candidate.severity.as_str(),
            trigger = %candidate.trigger_condition,
            "raising predictive alert"
        );
        alerts.push(PredictiveAlert {
            id: Uuid::new_v4(),
            alert_type: candidate.alert_type,
            severity: candidate.severity,
            probability: candidate.probability,
            trigger_condition: candidate.trigger_condition,
            description: candidate.description,
            phase_id: candidate.phase_id,
            status: AlertStatus::Active,
            raised_at: now,
        });
    }
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ImplementationType;
    use crate::services::metrics_collector::{MetricsCollector, BLOCKED_ITEMS};
    use crate::services::test_support::{context_for, sample_context, set_item};
    use proptest::prelude::*;

    fn with_metrics(mut context: TrackingContext) -> TrackingContext {
        let previous = context.clone();
        context.metrics = MetricsCollector::new(AlertingConfig::default()).collect(&previous, &context);
        context
    }

    #[test]
    fn test_fresh_session_raises_nothing() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let context = with_metrics(sample_context());
        assert!(analyzer.analyze(&context, Utc::now()).is_empty());
    }

    #[test]
    fn test_critical_checked_before_warning() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut context = sample_context();
        for id in ["pre-01", "pre-02", "pre-03"] {
            set_item(&mut context, id, ItemStatus::Blocked, None);
        }
        let context = with_metrics(context);

        let candidates = analyzer.threshold_candidates(&context.metrics);
        let blocked: Vec<_> = candidates
            .iter()
            .filter(|c| c.trigger_condition.starts_with(BLOCKED_ITEMS))
            .collect();
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].severity, AlertSeverity::Critical);
        assert_eq!(blocked[0].trigger_condition, "Blocked Items:critical");
    }

    #[test]
    fn test_blocked_items_raise_risk_score() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut context = context_for(ImplementationType::Migration);
        // Cutover risk: 0.5 * 0.9 = 0.45, below the bound until work blocks.
        assert!(analyzer.risk_candidates(&context).is_empty());

        set_item(&mut context, "dep-01", ItemStatus::Blocked, None);
        let candidates = analyzer.risk_candidates(&context);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].trigger_condition, "risk:dep-r2");
        assert_eq!(candidates[0].severity, AlertSeverity::High);
        assert_eq!(candidates[0].phase_id.as_deref(), Some("phase-deployment"));
    }

    #[test]
    fn test_reanalysis_does_not_duplicate() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut context = sample_context();
        set_item(&mut context, "pre-01", ItemStatus::Blocked, None);
        let mut context = with_metrics(context);

        context.alerts = analyzer.analyze(&context, Utc::now());
        let first = context.alerts.len();
        assert!(first > 0);

        context.alerts = analyzer.analyze(&context, Utc::now());
        assert_eq!(context.alerts.len(), first);
    }

    #[test]
    fn test_resolved_alert_can_be_raised_again() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut context = sample_context();
        set_item(&mut context, "pre-01", ItemStatus::Blocked, None);
        let mut context = with_metrics(context);

        context.alerts = analyzer.analyze(&context, Utc::now());
        let first = context.alerts.len();
        for alert in &mut context.alerts {
            alert.transition_to(AlertStatus::Resolved).unwrap();
        }

        context.alerts = analyzer.analyze(&context, Utc::now());
        assert_eq!(context.alerts.len(), first * 2);
    }

    #[test]
    fn test_declining_progress_raises_regression() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut previous = sample_context();
        set_item(&mut previous, "pre-01", ItemStatus::Completed, None);
        let previous = with_metrics(previous);

        let mut context = previous.clone();
        set_item(&mut context, "pre-01", ItemStatus::InProgress, None);
        context.metrics = MetricsCollector::new(AlertingConfig::default()).collect(&previous, &context);

        let alerts = analyzer.analyze(&context, Utc::now());
        assert!(alerts
            .iter()
            .any(|a| a.alert_type == AlertType::ProgressRegression
                && a.trigger_condition == "regression:phase-pre_deployment"));
    }

    #[test]
    fn test_phase_change_is_not_a_regression() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut previous = sample_context();
        set_item(&mut previous, "pre-01", ItemStatus::Completed, None);
        let previous = with_metrics(previous);

        let mut context = previous.clone();
        context.current_phase_id = "phase-deployment".to_string();
        context.metrics = MetricsCollector::new(AlertingConfig::default()).collect(&previous, &context);
        assert_eq!(
            context.metric(OVERALL_PROGRESS).unwrap().trend,
            MetricTrend::Declining
        );

        let alerts = analyzer.analyze_transition(&previous, &context, Utc::now());
        assert!(!alerts
            .iter()
            .any(|a| a.alert_type == AlertType::ProgressRegression));
    }

    #[test]
    fn test_acknowledged_alert_is_not_raised_again() {
        let analyzer = AlertAnalyzer::new(AlertingConfig::default());
        let mut context = sample_context();
        set_item(&mut context, "pre-01", ItemStatus::Blocked, None);
        let mut context = with_metrics(context);

        context.alerts = analyzer.analyze(&context, Utc::now());
        let first = context.alerts.len();
        for alert in &mut context.alerts {
            alert.transition_to(AlertStatus::Acknowledged).unwrap();
        }

        context.alerts = analyzer.analyze(&context, Utc::now());
        assert_eq!(context.alerts.len(), first);
    }

    #[test]
    fn test_effective_probability_capped() {
        assert!((effective_probability(0.3, 2) - 0.5).abs() < 1e-9);
        assert!((effective_probability(0.9, 5) - 1.0).abs() < f64::EPSILON);
    }

    fn candidate_strategy() -> impl Strategy<Value = AlertCandidate> {
        (0..3usize, 0..4usize).prop_map(|(kind, key)| AlertCandidate {
            alert_type: [
                AlertType::MetricThreshold,
                AlertType::RiskFactor,
                AlertType::ProgressRegression,
            ][kind],
            severity: AlertSeverity::Medium,
            probability: 0.5,
            trigger_condition: format!("key-{key}"),
            description: String::new(),
            phase_id: None,
        })
    }

    proptest! {
        #[test]
        fn prop_no_duplicate_active_alerts(
            first in prop::collection::vec(candidate_strategy(), 0..20),
            second in prop::collection::vec(candidate_strategy(), 0..20),
        ) {
            let now = Utc::now();
            let alerts = merge_candidates(Vec::new(), first, now);
            let alerts = merge_candidates(alerts, second, now);

            let active: Vec<_> = alerts.iter().filter(|a| a.status.is_active()).collect();
            for (i, a) in active.iter().enumerate() {
                for b in &active[i + 1..] {
                    prop_assert!(!b.same_trigger(a.alert_type, &a.trigger_condition));
                }
            }
        }
    }
}
