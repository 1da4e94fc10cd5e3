use serde::{Deserialize, Serialize};

/// Main configuration structure for deploytrack
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Predictive alert thresholds
    #[serde(default)]
    pub alerting: AlertingConfig,

    /// Reasoning service (recommender) configuration
    #[serde(default)]
    pub recommender: RecommenderConfig,

    /// Capacity assumptions for forecasting
    #[serde(default)]
    pub scheduling: SchedulingConfig,

    /// Tracking session behaviour
    #[serde(default)]
    pub tracking: TrackingConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".deploytrack/deploytrack.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("sqlite:{}", self.path)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Number of days to retain logs
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

const fn default_retention_days() -> u32 {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            retention_days: default_retention_days(),
        }
    }
}

/// Thresholds used by the predictive alert analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertingConfig {
    /// Risk score (probability x impact) above which a risk alert is raised
    #[serde(default = "default_risk_score_threshold")]
    pub risk_score_threshold: f64,

    /// Risk score at or above which the alert is critical
    #[serde(default = "default_critical_risk_score")]
    pub critical_risk_score: f64,

    /// Blocked item count raising a warning
    #[serde(default = "default_blocked_items_warning")]
    pub blocked_items_warning: f64,

    /// Blocked item count raising a critical alert
    #[serde(default = "default_blocked_items_critical")]
    pub blocked_items_critical: f64,

    /// Effort overrun percentage raising a warning
    #[serde(default = "default_effort_variance_warning")]
    pub effort_variance_warning_pct: f64,

    /// Effort overrun percentage raising a critical alert
    #[serde(default = "default_effort_variance_critical")]
    pub effort_variance_critical_pct: f64,
}

const fn default_risk_score_threshold() -> f64 {
    0.5
}

const fn default_critical_risk_score() -> f64 {
    0.75
}

const fn default_blocked_items_warning() -> f64 {
    1.0
}

const fn default_blocked_items_critical() -> f64 {
    3.0
}

const fn default_effort_variance_warning() -> f64 {
    20.0
}

const fn default_effort_variance_critical() -> f64 {
    50.0
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            risk_score_threshold: default_risk_score_threshold(),
            critical_risk_score: default_critical_risk_score(),
            blocked_items_warning: default_blocked_items_warning(),
            blocked_items_critical: default_blocked_items_critical(),
            effort_variance_warning_pct: default_effort_variance_warning(),
            effort_variance_critical_pct: default_effort_variance_critical(),
        }
    }
}

/// Reasoning service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecommenderConfig {
    /// Whether to call the reasoning service at all
    #[serde(default)]
    pub enabled: bool,

    /// Endpoint accepting a JSON context view and returning recommendations
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token. Falls back to `DEPLOYTRACK_RECOMMENDER_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound on a single recommendation request
    #[serde(default = "default_recommender_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_recommender_timeout_ms() -> u64 {
    5000
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            api_key: None,
            timeout_ms: default_recommender_timeout_ms(),
        }
    }
}

/// Capacity assumptions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulingConfig {
    /// Productive hours per engineer per working day
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,

    /// Team size used when the project does not declare one
    #[serde(default = "default_team_size")]
    pub default_team_size: u32,
}

const fn default_hours_per_day() -> f64 {
    8.0
}

const fn default_team_size() -> u32 {
    4
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            hours_per_day: default_hours_per_day(),
            default_team_size: default_team_size(),
        }
    }
}

/// Tracking session behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrackingConfig {
    /// Number of progress updates kept on the context and sent to the recommender
    #[serde(default = "default_recent_updates_limit")]
    pub recent_updates_limit: usize,
}

const fn default_recent_updates_limit() -> usize {
    20
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            recent_updates_limit: default_recent_updates_limit(),
        }
    }
}
