//! Project CLI commands.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Subcommand};

use crate::cli::output::{date, list_table, output, render_list, truncate, CommandOutput};
use crate::cli::workspace::Workspace;
use crate::domain::errors::DomainError;
use crate::domain::models::{Config, ProjectMetadata};

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Register a project
    Add {
        /// Project id (used by `track start`)
        id: String,
        /// Display name
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        industry: Option<String>,
        /// Engineers assigned to the deployment
        #[arg(short, long)]
        team_size: Option<u32>,
        /// Planned start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,
        /// Target completion date (YYYY-MM-DD)
        #[arg(long)]
        target: Option<String>,
    },
    /// List registered projects
    List,
    /// Show a project
    Show {
        id: String,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct ProjectOutput {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub industry: Option<String>,
    pub team_size: Option<u32>,
    pub planned_start: Option<DateTime<Utc>>,
    pub target_completion: Option<DateTime<Utc>>,
}

impl From<&ProjectMetadata> for ProjectOutput {
    fn from(project: &ProjectMetadata) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone(),
            industry: project.industry.clone(),
            team_size: project.team_size,
            planned_start: project.planned_start,
            target_completion: project.target_completion,
        }
    }
}

impl CommandOutput for ProjectOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Project: {}", self.name),
            format!("ID: {}", self.id),
        ];
        if let Some(description) = &self.description {
            lines.push(format!("Description: {description}"));
        }
        if let Some(industry) = &self.industry {
            lines.push(format!("Industry: {industry}"));
        }
        lines.push(format!(
            "Team size: {}",
            self.team_size.map_or_else(|| "default".to_string(), |n| n.to_string())
        ));
        lines.push(format!("Planned start: {}", date(self.planned_start)));
        lines.push(format!("Target completion: {}", date(self.target_completion)));
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ProjectListOutput {
    pub projects: Vec<ProjectOutput>,
    pub total: usize,
}

impl CommandOutput for ProjectListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "team", "start", "target"]);
        for p in &self.projects {
            table.add_row(vec![
                p.id.clone(),
                truncate(&p.name, 32),
                p.team_size.map_or_else(|| "-".to_string(), |n| n.to_string()),
                date(p.planned_start),
                date(p.target_completion),
            ]);
        }
        render_list("project", &table, self.total)
    }
}

/// Parse a `YYYY-MM-DD` date as midnight UTC.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?;
    day.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| anyhow::anyhow!("Invalid date '{s}'"))
}

pub async fn execute(args: ProjectArgs, config: Config, json_mode: bool) -> Result<()> {
    let workspace = Workspace::open(config).await?;
    let projects = workspace.projects();

    match args.command {
        ProjectCommands::Add {
            id,
            name,
            description,
            industry,
            team_size,
            start,
            target,
        } => {
            let mut project = ProjectMetadata::new(id, name);
            project.description = description;
            project.industry = industry;
            project.team_size = team_size;
            project.planned_start = start.as_deref().map(parse_date).transpose()?;
            project.target_completion = target.as_deref().map(parse_date).transpose()?;

            projects.register(&project).await?;
            output(&ProjectOutput::from(&project), json_mode);
        }
        ProjectCommands::List => {
            let all = projects.list().await?;
            output(
                &ProjectListOutput {
                    total: all.len(),
                    projects: all.iter().map(ProjectOutput::from).collect(),
                },
                json_mode,
            );
        }
        ProjectCommands::Show { id } => {
            let project = projects
                .get(&id)
                .await?
                .ok_or(DomainError::ProjectNotFound(id))?;
            output(&ProjectOutput::from(&project), json_mode);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let d = parse_date("2026-03-15").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2026, 3, 15));
        assert!(parse_date("15/03/2026").is_err());
    }
}
