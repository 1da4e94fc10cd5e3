//! deploytrack CLI entry point.

use std::path::Path;

use clap::Parser;
use tracing::warn;

use deploytrack::cli::commands::{alert, analysis, init, project, track};
use deploytrack::cli::{handle_error, Cli, Commands};
use deploytrack::infrastructure::config::ConfigLoader;
use deploytrack::infrastructure::logging::{LogConfig, LogRetention, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let log_dir = Path::new(init::WORKSPACE_DIR).join("logs");
    let mut log_config = LogConfig::from(&config.logging);
    if log_dir.is_dir() {
        log_config = log_config.with_log_dir(&log_dir);
    }
    let _logger = match LoggerImpl::init(&log_config) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };
    if log_dir.is_dir() {
        if let Err(err) = LogRetention::new(log_config.retention_days)
            .cleanup_old_logs(&log_dir)
            .await
        {
            warn!(error = %err, "log retention cleanup failed");
        }
    }

    let result = match cli.command {
        Commands::Init(args) => init::execute(args, cli.json).await,
        Commands::Project(args) => project::execute(args, config, cli.json).await,
        Commands::Track(args) => track::execute(args, config, cli.json).await,
        Commands::Report(args) => analysis::report(args, config, cli.json).await,
        Commands::Timeline(args) => analysis::timeline(args, config, cli.json).await,
        Commands::Resources(args) => analysis::resources(args, config, cli.json).await,
        Commands::Alert(args) => alert::execute(args, config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
