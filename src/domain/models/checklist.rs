//! Checklist domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tracking::PhaseType;
use crate::domain::errors::{DomainError, DomainResult};

/// Priority of a checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemPriority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Default for ItemPriority {
    fn default() -> Self {
        Self::Medium
    }
}

impl ItemPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// Execution status of a checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Completed,
    Blocked,
    Skipped,
}

impl Default for ItemStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "blocked" => Some(Self::Blocked),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// Parse a caller-supplied status. Only the exact snake_case names are
    /// accepted.
    pub fn parse(s: &str) -> DomainResult<Self> {
        Self::from_str(s).filter(|status| status.as_str() == s).ok_or_else(|| {
            DomainError::ValidationFailed(format!(
                "invalid item status '{s}': expected one of not_started, in_progress, completed, blocked, skipped"
            ))
        })
    }

    /// Whether work has begun on the item.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::InProgress | Self::Completed)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic unit of tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartChecklistItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub priority: ItemPriority,
    pub status: ItemStatus,
    pub estimated_hours: f64,
    pub actual_hours: Option<f64>,
    /// Ids of items in the same checklist that must complete first.
    pub dependencies: Vec<String>,
    pub completion_criteria: Vec<String>,
    pub automated: bool,
    #[serde(default)]
    pub notes: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SmartChecklistItem {
    pub fn is_completed(&self) -> bool {
        self.status == ItemStatus::Completed
    }
}

/// Ordered set of items generated for one phase.
///
/// `completion_percentage` is derived by the aggregator and never set by
/// callers directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartChecklist {
    pub id: String,
    /// Weak reference to the owning phase.
    pub phase_id: String,
    pub phase_type: PhaseType,
    pub title: String,
    pub items: Vec<SmartChecklistItem>,
    pub completion_percentage: f64,
    /// Static ordering weight; higher sorts first.
    pub priority_score: f64,
}

impl SmartChecklist {
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_completed()).count()
    }

    pub fn item(&self, id: &str) -> Option<&SmartChecklistItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_rejects_unknown() {
        assert_eq!(ItemStatus::parse("completed").unwrap(), ItemStatus::Completed);
        assert!(ItemStatus::parse("COMPLETED").is_err());
        assert!(ItemStatus::parse(" completed").is_err());
        let err = ItemStatus::parse("done").unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn test_started_statuses() {
        assert!(ItemStatus::InProgress.is_started());
        assert!(ItemStatus::Completed.is_started());
        assert!(!ItemStatus::Blocked.is_started());
        assert!(!ItemStatus::Skipped.is_started());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(ItemPriority::Critical > ItemPriority::High);
        assert!(ItemPriority::Low < ItemPriority::Medium);
        assert_eq!(ItemPriority::default(), ItemPriority::Medium);
    }
}
