//! Alert lifecycle commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::output::{output, CommandOutput};
use crate::cli::workspace::Workspace;
use crate::domain::models::{AlertStatus, Config, PredictiveAlert};

#[derive(Args, Debug)]
pub struct AlertArgs {
    #[command(subcommand)]
    pub command: AlertCommands,
}

#[derive(Subcommand, Debug)]
pub enum AlertCommands {
    /// Acknowledge an active alert
    Ack { session_id: Uuid, alert_id: Uuid },
    /// Mark an alert resolved
    Resolve { session_id: Uuid, alert_id: Uuid },
    /// Dismiss an alert
    Dismiss { session_id: Uuid, alert_id: Uuid },
}

impl AlertCommands {
    fn parts(&self) -> (Uuid, Uuid, AlertStatus) {
        match *self {
            Self::Ack { session_id, alert_id } => (session_id, alert_id, AlertStatus::Acknowledged),
            Self::Resolve { session_id, alert_id } => (session_id, alert_id, AlertStatus::Resolved),
            Self::Dismiss { session_id, alert_id } => (session_id, alert_id, AlertStatus::Dismissed),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AlertActionOutput {
    pub success: bool,
    pub message: String,
    pub alert: Option<PredictiveAlert>,
}

impl CommandOutput for AlertActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: AlertArgs, config: Config, json_mode: bool) -> Result<()> {
    let service = Workspace::open(config).await?.tracking_service()?;
    let (session_id, alert_id, status) = args.command.parts();

    let context = service
        .update_alert_status(session_id, alert_id, status)
        .await?;
    let alert = context.alerts.into_iter().find(|a| a.id == alert_id);

    output(
        &AlertActionOutput {
            success: true,
            message: format!("Alert {alert_id} {}", status.as_str()),
            alert,
        },
        json_mode,
    );
    Ok(())
}
