//! Derivation of named real-time metrics from aggregated state.

use crate::domain::models::{
    AlertThresholds, AlertingConfig, ItemStatus, MetricTrend, MetricType, RealTimeMetric,
    TrackingContext,
};
use crate::services::progress_aggregator::{ProgressAggregator, ProgressScope};

pub const OVERALL_PROGRESS: &str = "Overall Progress";
pub const CROSS_PHASE_PROGRESS: &str = "Cross-Phase Progress";
pub const COMPLETED_ITEMS: &str = "Completed Items";
pub const BLOCKED_ITEMS: &str = "Blocked Items";
pub const EFFORT_VARIANCE: &str = "Effort Variance";

/// Changes smaller than this are reported as stable.
const TREND_EPSILON: f64 = 1e-9;

/// Builds the metric set of a context.
///
/// Trends compare against the value stored under the same name in the
/// context being replaced. `Overall Progress` tracks the current phase, so
/// it drops when the current phase advances; the alert analyzer does not
/// treat that drop as a regression.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    thresholds: AlertingConfig,
    aggregator: ProgressAggregator,
}

impl MetricsCollector {
    pub fn new(thresholds: AlertingConfig) -> Self {
        Self {
            thresholds,
            aggregator: ProgressAggregator::new(),
        }
    }

    pub fn collect(
        &self,
        previous: &TrackingContext,
        context: &TrackingContext,
    ) -> Vec<RealTimeMetric> {
        let total = context.items().count();
        let completed = context.items().filter(|i| i.is_completed()).count();
        let blocked = context
            .items()
            .filter(|i| i.status == ItemStatus::Blocked)
            .count();

        let definitions = [
            MetricDefinition {
                name: OVERALL_PROGRESS,
                metric_type: MetricType::Progress,
                value: self.aggregator.overall_progress(context, ProgressScope::CurrentPhase),
                target: 100.0,
                unit: "%",
                higher_is_better: true,
                thresholds: None,
            },
            MetricDefinition {
                name: CROSS_PHASE_PROGRESS,
                metric_type: MetricType::Progress,
                value: self.aggregator.overall_progress(context, ProgressScope::CrossPhase),
                target: 100.0,
                unit: "%",
                higher_is_better: true,
                thresholds: None,
            },
            MetricDefinition {
                name: COMPLETED_ITEMS,
                metric_type: MetricType::Count,
                value: completed as f64,
                target: total as f64,
                unit: "items",
                higher_is_better: true,
                thresholds: None,
            },
            MetricDefinition {
                name: BLOCKED_ITEMS,
                metric_type: MetricType::Count,
                value: blocked as f64,
                target: 0.0,
                unit: "items",
                higher_is_better: false,
                thresholds: Some(AlertThresholds::above(
                    self.thresholds.blocked_items_warning,
                    self.thresholds.blocked_items_critical,
                )),
            },
            MetricDefinition {
                name: EFFORT_VARIANCE,
                metric_type: MetricType::Variance,
                value: effort_variance(context),
                target: 0.0,
                unit: "%",
                higher_is_better: false,
                thresholds: Some(AlertThresholds::above(
                    self.thresholds.effort_variance_warning_pct,
                    self.thresholds.effort_variance_critical_pct,
                )),
            },
        ];

        definitions
            .into_iter()
            .map(|def| {
                let previous_value = previous.metric(def.name).map(|m| m.current_value);
                RealTimeMetric {
                    name: def.name.to_string(),
                    metric_type: def.metric_type,
                    current_value: def.value,
                    target_value: def.target,
                    previous_value,
                    unit: def.unit.to_string(),
                    trend: trend(previous_value, def.value, def.higher_is_better),
                    thresholds: def.thresholds,
                }
            })
            .collect()
    }
}

struct MetricDefinition {
    name: &'static str,
    metric_type: MetricType,
    value: f64,
    target: f64,
    unit: &'static str,
    higher_is_better: bool,
    thresholds: Option<AlertThresholds>,
}

/// Direction of change. For metrics where lower is better (blocked items,
/// effort overrun) a falling value is improving.
pub fn trend(previous: Option<f64>, current: f64, higher_is_better: bool) -> MetricTrend {
    let Some(previous) = previous else {
        return MetricTrend::Unknown;
    };
    let delta = current - previous;
    if delta.abs() < TREND_EPSILON {
        MetricTrend::Stable
    } else if (delta > 0.0) == higher_is_better {
        MetricTrend::Improving
    } else {
        MetricTrend::Declining
    }
}

/// Percentage by which reported hours exceed estimates on completed items
/// that carry an actual. Negative when under estimate.
pub fn effort_variance(context: &TrackingContext) -> f64 {
    let (estimated, actual) = context
        .items()
        .filter(|i| i.is_completed())
        .filter_map(|i| i.actual_hours.map(|a| (i.estimated_hours, a)))
        .fold((0.0, 0.0), |(e, a), (ie, ia)| (e + ie, a + ia));

    if estimated > 0.0 {
        100.0 * (actual - estimated) / estimated
    } else {
        0.0
    }
}
