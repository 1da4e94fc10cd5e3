//! Project metadata used to seed a tracking session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only project attributes supplied by the project metadata source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    /// Number of engineers assigned; `None` falls back to the configured default.
    pub team_size: Option<u32>,
    pub planned_start: Option<DateTime<Utc>>,
    pub target_completion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ProjectMetadata {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            industry: None,
            team_size: None,
            planned_start: None,
            target_completion: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_team_size(mut self, team_size: u32) -> Self {
        self.team_size = Some(team_size);
        self
    }

    pub fn with_schedule(
        mut self,
        planned_start: DateTime<Utc>,
        target_completion: Option<DateTime<Utc>>,
    ) -> Self {
        self.planned_start = Some(planned_start);
        self.target_completion = target_completion;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("project id cannot be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("project name cannot be empty".to_string());
        }
        if self.team_size == Some(0) {
            return Err("team size must be at least 1".to_string());
        }
        if let (Some(start), Some(target)) = (self.planned_start, self.target_completion) {
            if target < start {
                return Err("target completion precedes planned start".to_string());
            }
        }
        Ok(())
    }
}
