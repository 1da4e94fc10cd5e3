//! Wiring shared by commands: config, database and the tracking service.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::recommenders;
use crate::adapters::sqlite::{initialize_database, SqliteProjectRepository, SqliteTrackingRepository};
use crate::domain::models::Config;
use crate::services::TrackingService;

pub type CliTrackingService = TrackingService<SqliteTrackingRepository, SqliteProjectRepository>;

/// Opened project workspace.
pub struct Workspace {
    pub config: Config,
    pub pool: SqlitePool,
}

impl Workspace {
    pub async fn open(config: Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context("Failed to open database. Run 'deploytrack init' first.")?;
        Ok(Self { config, pool })
    }

    pub fn projects(&self) -> SqliteProjectRepository {
        SqliteProjectRepository::new(self.pool.clone())
    }

    pub fn tracking_service(&self) -> Result<CliTrackingService> {
        let recommender = recommenders::from_config(&self.config.recommender)
            .context("Failed to configure recommender")?;

        Ok(TrackingService::new(
            Arc::new(SqliteTrackingRepository::new(self.pool.clone())),
            Arc::new(self.projects()),
            self.config.clone(),
        )
        .with_recommender(recommender))
    }
}
