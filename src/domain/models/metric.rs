//! Real-time metrics and predictive alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Progress,
    Count,
    Variance,
}

/// Direction of change relative to the previously stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricTrend {
    Improving,
    Stable,
    Declining,
    Unknown,
}

impl MetricTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
            Self::Unknown => "unknown",
        }
    }
}

/// Which side of a threshold is bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdDirection {
    /// Values at or above the threshold trigger.
    Above,
    /// Values at or below the threshold trigger.
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub warning_value: f64,
    pub critical_value: f64,
    pub direction: ThresholdDirection,
}

impl AlertThresholds {
    pub const fn above(warning_value: f64, critical_value: f64) -> Self {
        Self {
            warning_value,
            critical_value,
            direction: ThresholdDirection::Above,
        }
    }

    pub fn crosses(&self, value: f64, threshold: f64) -> bool {
        match self.direction {
            ThresholdDirection::Above => value >= threshold,
            ThresholdDirection::Below => value <= threshold,
        }
    }
}

/// Named metric derived from aggregated state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealTimeMetric {
    pub name: String,
    pub metric_type: MetricType,
    pub current_value: f64,
    pub target_value: f64,
    pub previous_value: Option<f64>,
    pub unit: String,
    pub trend: MetricTrend,
    pub thresholds: Option<AlertThresholds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    MetricThreshold,
    RiskFactor,
    ProgressRegression,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetricThreshold => "metric_threshold",
            Self::RiskFactor => "risk_factor",
            Self::ProgressRegression => "progress_regression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "acknowledged" => Some(Self::Acknowledged),
            "resolved" => Some(Self::Resolved),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Still owned by someone: active or acknowledged.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Active | Self::Acknowledged)
    }

    /// Alerts only move forward; `Resolved` and `Dismissed` are terminal.
    pub fn can_transition_to(&self, new_status: Self) -> bool {
        matches!(
            (self, new_status),
            (Self::Active, Self::Acknowledged)
                | (Self::Active, Self::Resolved)
                | (Self::Active, Self::Dismissed)
                | (Self::Acknowledged, Self::Resolved)
                | (Self::Acknowledged, Self::Dismissed)
        )
    }
}

/// System-raised warning that a metric or risk is likely to cause a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveAlert {
    pub id: Uuid,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    /// Likelihood in `[0, 1]`.
    pub probability: f64,
    /// Stable key identifying the condition; used for deduplication.
    pub trigger_condition: String,
    pub description: String,
    pub phase_id: Option<String>,
    pub status: AlertStatus,
    pub raised_at: DateTime<Utc>,
}

impl PredictiveAlert {
    /// Whether this alert shares the deduplication key with `other`.
    pub fn same_trigger(&self, alert_type: AlertType, trigger_condition: &str) -> bool {
        self.alert_type == alert_type && self.trigger_condition == trigger_condition
    }

    pub fn transition_to(&mut self, new_status: AlertStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(DomainError::ValidationFailed(format!(
                "alert {} cannot move from {} to {}",
                self.id,
                self.status.as_str(),
                new_status.as_str()
            )));
        }
        self.status = new_status;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_direction() {
        let above = AlertThresholds::above(1.0, 3.0);
        assert!(above.crosses(3.0, above.critical_value));
        assert!(!above.crosses(2.0, above.critical_value));

        let below = AlertThresholds {
            warning_value: 50.0,
            critical_value: 20.0,
            direction: ThresholdDirection::Below,
        };
        assert!(below.crosses(10.0, below.critical_value));
        assert!(!below.crosses(30.0, below.critical_value));
        assert!(below.crosses(30.0, below.warning_value));
    }

    #[test]
    fn test_alert_transitions() {
        let mut alert = PredictiveAlert {
            id: Uuid::new_v4(),
            alert_type: AlertType::RiskFactor,
            severity: AlertSeverity::High,
            probability: 0.6,
            trigger_condition: "risk:dep-r1".to_string(),
            description: "test".to_string(),
            phase_id: None,
            status: AlertStatus::Active,
            raised_at: Utc::now(),
        };

        alert.transition_to(AlertStatus::Acknowledged).unwrap();
        alert.transition_to(AlertStatus::Resolved).unwrap();
        assert!(alert.transition_to(AlertStatus::Active).is_err());
        assert_eq!(alert.status, AlertStatus::Resolved);
    }
}
