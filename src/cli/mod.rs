//! Command-line interface.

pub mod commands;
pub mod output;
pub mod workspace;

use clap::{Parser, Subcommand};

use crate::domain::errors::{DomainError, ErrorKind};

use commands::alert::AlertArgs;
use commands::analysis::{ReportArgs, ResourcesArgs, TimelineArgs};
use commands::init::InitArgs;
use commands::project::ProjectArgs;
use commands::track::TrackArgs;

#[derive(Parser, Debug)]
#[command(name = "deploytrack")]
#[command(about = "Implementation tracking for multi-phase network deployments", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the .deploytrack directory, config and database
    Init(InitArgs),
    /// Register and inspect projects
    Project(ProjectArgs),
    /// Start and update tracking sessions
    Track(TrackArgs),
    /// Compile a status report for a session
    Report(ReportArgs),
    /// Forecast a session's completion date
    Timeline(TimelineArgs),
    /// Suggest effort rebalancing across item categories
    Resources(ResourcesArgs),
    /// Acknowledge, resolve or dismiss alerts
    Alert(AlertArgs),
}

/// Process exit code for an error, by domain error kind.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<DomainError>().map(DomainError::kind) {
        Some(ErrorKind::NotFound) => 3,
        Some(ErrorKind::Validation | ErrorKind::Cycle) => 4,
        Some(ErrorKind::ExternalService) => 5,
        Some(ErrorKind::Internal) | None => 1,
    }
}

/// Print the error to stderr and exit.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    let code = exit_code(&err);
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use uuid::Uuid;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_track_update() {
        let session = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "deploytrack",
            "--json",
            "track",
            "update",
            &session.to_string(),
            "pre-01",
            "completed",
            "--hours",
            "6.5",
        ])
        .unwrap();

        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Track(_)));
    }

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let not_found = anyhow::Error::new(DomainError::ItemNotFound("x".into()));
        assert_eq!(exit_code(&not_found), 3);

        let invalid = anyhow::Error::new(DomainError::ValidationFailed("bad".into()));
        assert_eq!(exit_code(&invalid), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("plain")), 1);
    }
}
