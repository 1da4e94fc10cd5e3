use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid risk score bounds: threshold {0} must be below critical {1}, both within (0, 1]")]
    InvalidRiskScores(f64, f64),

    #[error("Invalid {name} thresholds: warning {warning} must be positive and below critical {critical}")]
    InvalidThresholdPair {
        name: &'static str,
        warning: f64,
        critical: f64,
    },

    #[error("Invalid hours_per_day: {0}. Must be within (0, 24]")]
    InvalidHoursPerDay(f64),

    #[error("Invalid default_team_size: {0}. Must be at least 1")]
    InvalidTeamSize(u32),

    #[error("Invalid recommender timeout_ms: {0}. Must be at least 1")]
    InvalidRecommenderTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .deploytrack/config.yaml (project config, created by init)
    /// 3. .deploytrack/local.yaml (local overrides, optional)
    /// 4. Environment variables (DEPLOYTRACK_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment(".deploytrack/config.yaml")
            .merge(Yaml::file(".deploytrack/local.yaml"))
            .merge(Env::prefixed("DEPLOYTRACK_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Self::figment(path.as_ref())
            .merge(Env::prefixed("DEPLOYTRACK_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(path: impl AsRef<std::path::Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let alerting = &config.alerting;
        let in_unit = |v: f64| v > 0.0 && v <= 1.0;
        if !in_unit(alerting.risk_score_threshold)
            || !in_unit(alerting.critical_risk_score)
            || alerting.risk_score_threshold >= alerting.critical_risk_score
        {
            return Err(ConfigError::InvalidRiskScores(
                alerting.risk_score_threshold,
                alerting.critical_risk_score,
            ));
        }

        Self::validate_pair(
            "blocked_items",
            alerting.blocked_items_warning,
            alerting.blocked_items_critical,
        )?;
        Self::validate_pair(
            "effort_variance",
            alerting.effort_variance_warning_pct,
            alerting.effort_variance_critical_pct,
        )?;

        let hours = config.scheduling.hours_per_day;
        if !hours.is_finite() || hours <= 0.0 || hours > 24.0 {
            return Err(ConfigError::InvalidHoursPerDay(hours));
        }

        if config.scheduling.default_team_size == 0 {
            return Err(ConfigError::InvalidTeamSize(0));
        }

        if config.recommender.timeout_ms == 0 {
            return Err(ConfigError::InvalidRecommenderTimeout(0));
        }

        if config.recommender.enabled
            && config
                .recommender
                .endpoint
                .as_deref()
                .is_some_and(|e| !e.starts_with("http://") && !e.starts_with("https://"))
        {
            return Err(ConfigError::ValidationFailed(
                "recommender endpoint must be an http(s) URL".to_string(),
            ));
        }

        if config.tracking.recent_updates_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "tracking.recent_updates_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_pair(name: &'static str, warning: f64, critical: f64) -> Result<(), ConfigError> {
        if warning <= 0.0 || warning >= critical {
            return Err(ConfigError::InvalidThresholdPair {
                name,
                warning,
                critical,
            });
        }
        Ok(())
    }
}
