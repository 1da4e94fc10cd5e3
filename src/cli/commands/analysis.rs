//! Read-only analysis commands: report, timeline and resources.

use anyhow::Result;
use clap::Args;
use uuid::Uuid;

use crate::cli::output::{date, heading, hours, list_table, output, percent, truncate, CommandOutput};
use crate::cli::workspace::Workspace;
use crate::domain::models::{Config, IntelligentReport, ResourceOptimization, TimelinePrediction};

#[derive(Args, Debug)]
pub struct ReportArgs {
    pub session_id: Uuid,
}

#[derive(Args, Debug)]
pub struct TimelineArgs {
    pub session_id: Uuid,
}

#[derive(Args, Debug)]
pub struct ResourcesArgs {
    pub session_id: Uuid,
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct ReportOutput(pub IntelligentReport);

impl CommandOutput for ReportOutput {
    fn to_human(&self) -> String {
        let report = &self.0;
        let summary = &report.executive_summary;
        let mut lines = vec![
            heading(&format!("{} status report", summary.project_name)),
            summary.headline.clone(),
            format!("Health: {}", summary.health.as_str()),
            format!(
                "Progress: {} current phase, {} overall",
                percent(summary.overall_progress),
                percent(summary.cross_phase_progress)
            ),
            format!(
                "Alerts: {} active, {} critical",
                summary.active_alerts, summary.critical_alerts
            ),
        ];

        lines.push(format!("\n{}", heading("Phases")));
        let mut phases = list_table(&["phase", "status", "progress", "done", "blocked"]);
        for p in &report.progress_analysis.phases {
            phases.add_row(vec![
                p.name.clone(),
                p.status.to_string(),
                percent(p.completion_percentage),
                format!("{}/{}", p.items_completed, p.items_total),
                p.items_blocked.to_string(),
            ]);
        }
        lines.push(phases.to_string());

        if !report.risk_analysis.top_risks.is_empty() {
            lines.push(format!("\n{}", heading("Top risks")));
            for risk in &report.risk_analysis.top_risks {
                lines.push(format!(
                    "  {:.2}  {} ({})",
                    risk.score,
                    truncate(&risk.description, 60),
                    risk.phase_id
                ));
            }
        }

        let resources = &report.resource_analysis;
        lines.push(format!("\n{}", heading("Effort")));
        lines.push(format!(
            "  estimated {}, actual {}, earned {}, efficiency {}",
            hours(resources.estimated_hours),
            hours(resources.actual_hours),
            hours(resources.earned_hours),
            resources
                .efficiency
                .map_or_else(|| "-".to_string(), |e| format!("{e:.2}"))
        ));

        let forecast = &report.timeline_forecast;
        lines.push(format!(
            "  {} remaining, about {:.1} working days at ratio {:.2}",
            hours(forecast.remaining_hours),
            forecast.projected_working_days,
            forecast.effort_ratio
        ));

        if !report.recommendations.is_empty() {
            lines.push(format!("\n{}", heading("Recommendations")));
            for rec in &report.recommendations {
                lines.push(format!("  [{}] {}", rec.priority.as_str(), rec.title));
            }
        }

        lines.push(format!("\nGenerated {}", report.generated_at.to_rfc3339()));
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct TimelineOutput(pub TimelinePrediction);

impl CommandOutput for TimelineOutput {
    fn to_human(&self) -> String {
        let prediction = &self.0;
        let mut lines = vec![
            format!("Predicted completion: {}", date(Some(prediction.predicted_completion))),
            format!("Target completion: {}", date(prediction.target_completion)),
            format!(
                "Remaining effort: {} (ratio {:.2} from {} completed item(s))",
                hours(prediction.remaining_effort_hours),
                prediction.effort_ratio,
                prediction.sample_size
            ),
            format!(
                "On track: {}{}",
                if prediction.on_track { "yes" } else { "no" },
                prediction
                    .variance_days
                    .map_or_else(String::new, |d| format!(" ({d:+} days)"))
            ),
            format!("Confidence: {}", percent(prediction.confidence * 100.0)),
        ];

        let mut table = list_table(&["phase", "remaining", "predicted"]);
        for f in &prediction.phase_forecasts {
            table.add_row(vec![
                f.phase_id.clone(),
                hours(f.remaining_hours),
                date(Some(f.predicted_completion)),
            ]);
        }
        lines.push(format!("\n{table}"));
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct ResourcesOutput(pub ResourceOptimization);

impl CommandOutput for ResourcesOutput {
    fn to_human(&self) -> String {
        let opt = &self.0;
        let efficiency = |e: Option<f64>| e.map_or_else(|| "-".to_string(), |e| format!("{e:.2}"));
        let mut lines = vec![
            format!(
                "Allocated {}, consumed {}",
                hours(opt.total_allocated_hours),
                hours(opt.total_consumed_hours)
            ),
            format!(
                "Efficiency: {} (historical {})",
                efficiency(opt.efficiency),
                efficiency(opt.historical_efficiency)
            ),
        ];

        if opt.bottlenecks.is_empty() {
            lines.push("No bottlenecks.".to_string());
        } else {
            lines.push(format!("Bottlenecks: {}", opt.bottlenecks.join(", ")));
        }

        if !opt.reallocations.is_empty() {
            let mut table = list_table(&["from", "to", "hours"]);
            for r in &opt.reallocations {
                table.add_row(vec![r.from_category.clone(), r.to_category.clone(), hours(r.hours)]);
            }
            lines.push(format!("\n{}\n{table}", heading("Suggested reallocations")));
        }
        lines.join("\n")
    }
}

pub async fn report(args: ReportArgs, config: Config, json_mode: bool) -> Result<()> {
    let service = Workspace::open(config).await?.tracking_service()?;
    let report = service.generate_intelligent_report(args.session_id).await?;
    output(&ReportOutput(report), json_mode);
    Ok(())
}

pub async fn timeline(args: TimelineArgs, config: Config, json_mode: bool) -> Result<()> {
    let service = Workspace::open(config).await?.tracking_service()?;
    let prediction = service.analyze_predictive_timeline(args.session_id).await?;
    output(&TimelineOutput(prediction), json_mode);
    Ok(())
}

pub async fn resources(args: ResourcesArgs, config: Config, json_mode: bool) -> Result<()> {
    let service = Workspace::open(config).await?.tracking_service()?;
    let optimization = service.optimize_resource_allocation(args.session_id).await?;
    output(&ResourcesOutput(optimization), json_mode);
    Ok(())
}
