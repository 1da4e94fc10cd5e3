//! Implementation of the `deploytrack init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tokio::fs;

use crate::adapters::sqlite::initialize_database;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, DatabaseConfig};

pub const WORKSPACE_DIR: &str = ".deploytrack";

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub initialized_path: PathBuf,
    pub directories_created: Vec<String>,
    pub config_written: bool,
    pub database_path: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.config_written {
            lines.push(format!("\nWrote {WORKSPACE_DIR}/config.yaml"));
        }
        lines.push(format!("Database ready at {}", self.database_path.display()));
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let workspace_dir = target_path.join(WORKSPACE_DIR);
    let config_path = workspace_dir.join("config.yaml");
    let already_initialized = config_path.exists();

    let mut directories_created = vec![];
    for dir in [workspace_dir.clone(), workspace_dir.join("logs")] {
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let relative = dir
                .strip_prefix(&target_path)
                .unwrap_or(&dir)
                .to_string_lossy()
                .to_string();
            directories_created.push(relative);
        }
    }

    let config_written = !already_initialized || args.force;
    if config_written {
        let yaml = serde_yaml::to_string(&Config::default()).context("Failed to render default config")?;
        fs::write(&config_path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
    }

    let database_path = workspace_dir.join("deploytrack.db");
    let database = DatabaseConfig {
        path: database_path.to_string_lossy().to_string(),
        ..DatabaseConfig::default()
    };
    initialize_database(&database)
        .await
        .context("Failed to initialize database")?;

    let message = match (already_initialized, args.force) {
        (false, _) => "Project initialized successfully.",
        (true, true) => "Project reinitialized; config reset to defaults.",
        (true, false) => "Project already initialized; database migrations are up to date.",
    };

    output(
        &InitOutput {
            success: true,
            message: message.to_string(),
            initialized_path: target_path,
            directories_created,
            config_written,
            database_path,
        },
        json_mode,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::ConfigLoader;

    #[tokio::test]
    async fn test_init_creates_workspace() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = InitArgs {
            force: false,
            path: dir.path().to_path_buf(),
        };
        execute(args, true).await.unwrap();

        let workspace = dir.path().join(WORKSPACE_DIR);
        assert!(workspace.join("logs").is_dir());
        assert!(workspace.join("deploytrack.db").exists());

        let content = std::fs::read_to_string(workspace.join("config.yaml")).unwrap();
        let config: Config = serde_yaml::from_str(&content).unwrap();
        assert_eq!(config.tracking.recent_updates_limit, 20);
        ConfigLoader::validate(&config).unwrap();
    }

    #[tokio::test]
    async fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::TempDir::new().unwrap();
        let workspace = dir.path().join(WORKSPACE_DIR);
        std::fs::create_dir_all(&workspace).unwrap();
        std::fs::write(workspace.join("config.yaml"), "logging:\n  level: debug\n").unwrap();

        let args = InitArgs {
            force: false,
            path: dir.path().to_path_buf(),
        };
        execute(args, true).await.unwrap();

        let content = std::fs::read_to_string(workspace.join("config.yaml")).unwrap();
        assert_eq!(content, "logging:\n  level: debug\n");
    }
}
