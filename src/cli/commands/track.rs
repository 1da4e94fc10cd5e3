//! Tracking session CLI commands.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::output::{date, heading, hours, list_table, output, percent, render_list, truncate, CommandOutput};
use crate::cli::workspace::Workspace;
use crate::domain::models::{Config, ImplementationType, PhaseStatus, TrackingContext};

#[derive(Args, Debug)]
pub struct TrackArgs {
    #[command(subcommand)]
    pub command: TrackCommands,
}

#[derive(Subcommand, Debug)]
pub enum TrackCommands {
    /// Start a tracking session for a project
    Start {
        project_id: String,
        /// poc, pilot, full_deployment or migration
        #[arg(short = 't', long = "type", default_value = "full_deployment")]
        implementation_type: String,
    },
    /// Record progress on a checklist item
    Update {
        session_id: Uuid,
        item_id: String,
        /// not_started, in_progress, completed, blocked or skipped
        status: String,
        /// Actual hours spent on the item
        #[arg(long)]
        hours: Option<f64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Mark a phase blocked or delayed, or clear it with in_progress
    Phase {
        session_id: Uuid,
        phase_id: String,
        status: String,
    },
    /// Show a session with its checklists
    Show {
        session_id: Uuid,
        /// Include every checklist item
        #[arg(long)]
        items: bool,
    },
    /// List sessions for a project
    List {
        project_id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub project_id: String,
    pub implementation_type: ImplementationType,
    pub current_phase_id: String,
    pub current_phase_completion: f64,
    pub active_alerts: usize,
    pub created_at: DateTime<Utc>,
    pub archived: bool,
}

impl From<&TrackingContext> for SessionSummary {
    fn from(context: &TrackingContext) -> Self {
        Self {
            session_id: context.session_id,
            project_id: context.project_id.clone(),
            implementation_type: context.implementation_type,
            current_phase_id: context.current_phase_id.clone(),
            current_phase_completion: context
                .current_phase()
                .map_or(0.0, |p| p.completion_percentage),
            active_alerts: context.active_alerts().count(),
            created_at: context.created_at,
            archived: context.is_archived(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct SessionListOutput {
    pub sessions: Vec<SessionSummary>,
    pub total: usize,
}

impl CommandOutput for SessionListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["session", "type", "phase", "progress", "alerts", "started", "state"]);
        for s in &self.sessions {
            table.add_row(vec![
                s.session_id.to_string(),
                s.implementation_type.to_string(),
                s.current_phase_id.clone(),
                percent(s.current_phase_completion),
                s.active_alerts.to_string(),
                date(Some(s.created_at)),
                if s.archived { "archived" } else { "active" }.to_string(),
            ]);
        }
        render_list("session", &table, self.total)
    }
}

/// Full session view; JSON output is the context itself.
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct SessionDetailOutput {
    pub context: TrackingContext,
    #[serde(skip)]
    pub show_items: bool,
}

impl CommandOutput for SessionDetailOutput {
    fn to_human(&self) -> String {
        let ctx = &self.context;
        let mut lines = vec![
            format!("Session: {}", ctx.session_id),
            format!("Project: {} ({})", ctx.project_name, ctx.project_id),
            format!("Type: {}", ctx.implementation_type),
            format!("Current phase: {}", ctx.current_phase_id),
        ];
        if ctx.is_archived() {
            lines.push(format!("Archived: {}", date(ctx.archived_at)));
        }

        lines.push(format!("\n{}", heading("Phases")));
        let mut phases = list_table(&["phase", "status", "progress", "milestone", "target"]);
        for phase in &ctx.phases {
            let milestone = ctx.milestones.iter().find(|m| m.phase_id == phase.id);
            phases.add_row(vec![
                phase.id.clone(),
                phase.status.to_string(),
                percent(phase.completion_percentage),
                milestone.map_or_else(|| "-".to_string(), |m| m.status.as_str().to_string()),
                date(milestone.and_then(|m| m.target_date)),
            ]);
        }
        lines.push(phases.to_string());

        if self.show_items {
            for checklist in &ctx.checklists {
                lines.push(format!(
                    "\n{} {}",
                    heading(&checklist.title),
                    percent(checklist.completion_percentage)
                ));
                let mut items = list_table(&["item", "title", "status", "est", "actual"]);
                for item in &checklist.items {
                    items.add_row(vec![
                        item.id.clone(),
                        truncate(&item.title, 40),
                        item.status.to_string(),
                        hours(item.estimated_hours),
                        item.actual_hours.map_or_else(|| "-".to_string(), hours),
                    ]);
                }
                lines.push(items.to_string());
            }
        }

        let alerts: Vec<_> = ctx.active_alerts().collect();
        if !alerts.is_empty() {
            lines.push(format!("\n{}", heading("Active alerts")));
            for alert in alerts {
                lines.push(format!(
                    "  [{}] {} ({})",
                    alert.severity.as_str(),
                    alert.description,
                    alert.id
                ));
            }
        }

        if !ctx.recommendations.is_empty() {
            lines.push(format!("\n{}", heading("Recommendations")));
            for rec in &ctx.recommendations {
                lines.push(format!(
                    "  [{}] {} ({:.0}% confidence)",
                    rec.priority.as_str(),
                    rec.title,
                    rec.confidence * 100.0
                ));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.context).unwrap_or_default()
    }
}

pub async fn execute(args: TrackArgs, config: Config, json_mode: bool) -> Result<()> {
    let workspace = Workspace::open(config).await?;
    let service = workspace.tracking_service()?;

    match args.command {
        TrackCommands::Start {
            project_id,
            implementation_type,
        } => {
            let implementation_type = ImplementationType::from_str(&implementation_type)
                .ok_or_else(|| anyhow!("Invalid implementation type: {implementation_type}"))?;
            let context = service
                .initialize_tracking(&project_id, implementation_type)
                .await?;
            output(
                &SessionDetailOutput {
                    context,
                    show_items: false,
                },
                json_mode,
            );
        }
        TrackCommands::Update {
            session_id,
            item_id,
            status,
            hours,
            notes,
        } => {
            let context = service
                .update_progress(session_id, &item_id, &status, hours, notes)
                .await?;
            output(
                &SessionDetailOutput {
                    context,
                    show_items: false,
                },
                json_mode,
            );
        }
        TrackCommands::Phase {
            session_id,
            phase_id,
            status,
        } => {
            let status = PhaseStatus::from_str(&status)
                .ok_or_else(|| anyhow!("Invalid phase status: {status}"))?;
            let context = service
                .set_phase_status(session_id, &phase_id, status)
                .await?;
            output(
                &SessionDetailOutput {
                    context,
                    show_items: false,
                },
                json_mode,
            );
        }
        TrackCommands::Show { session_id, items } => {
            let context = service.get_context(session_id).await?;
            output(
                &SessionDetailOutput {
                    context,
                    show_items: items,
                },
                json_mode,
            );
        }
        TrackCommands::List { project_id } => {
            let sessions = service.list_sessions(&project_id).await?;
            output(
                &SessionListOutput {
                    total: sessions.len(),
                    sessions: sessions.iter().map(SessionSummary::from).collect(),
                },
                json_mode,
            );
        }
    }

    Ok(())
}
