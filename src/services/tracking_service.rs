//! Tracking service: the engine wiring generation, aggregation, alerting
//! and recommendations to the persistence and metadata ports.
//!
//! Every mutating operation loads the stored context, builds a new value
//! with all derived state recomputed, persists it and only then returns it.
//! A persistence failure therefore leaves the stored snapshot unchanged and
//! the caller receives the error instead of the new context.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AlertStatus, Config, ImplementationType, IntelligentReport, ItemStatus, PhaseStatus,
    ProgressUpdateRecord, ResourceOptimization, TimelinePrediction, TrackingContext,
};
use crate::domain::ports::{ProjectMetadataSource, Recommender, TrackingRepository};
use crate::services::alert_analyzer::AlertAnalyzer;
use crate::services::checklist_generator::ChecklistGenerator;
use crate::services::entity_index::EntityIndex;
use crate::services::metrics_collector::MetricsCollector;
use crate::services::progress_aggregator::ProgressAggregator;
use crate::services::recommendation_generator::RecommendationGenerator;
use crate::services::report_compiler::ReportCompiler;

/// Upper bound on hours booked against one checklist item (five working
/// years at eight hours a day). Larger values are treated as input errors.
pub const MAX_ACTUAL_HOURS: f64 = 10_000.0;

pub struct TrackingService<R: TrackingRepository, P: ProjectMetadataSource> {
    repository: Arc<R>,
    projects: Arc<P>,
    generator: ChecklistGenerator,
    aggregator: ProgressAggregator,
    metrics: MetricsCollector,
    alerts: AlertAnalyzer,
    recommendations: RecommendationGenerator,
    reports: ReportCompiler,
    config: Config,
}

impl<R: TrackingRepository, P: ProjectMetadataSource> TrackingService<R, P> {
    /// Create a service with the no-op recommender.
    pub fn new(repository: Arc<R>, projects: Arc<P>, config: Config) -> Self {
        let recommendations = RecommendationGenerator::new(
            Arc::new(crate::domain::ports::NullRecommender),
            Duration::from_millis(config.recommender.timeout_ms),
            config.tracking.recent_updates_limit,
        );

        Self {
            repository,
            projects,
            generator: ChecklistGenerator::new(),
            aggregator: ProgressAggregator::new(),
            metrics: MetricsCollector::new(config.alerting.clone()),
            alerts: AlertAnalyzer::new(config.alerting.clone()),
            recommendations,
            reports: ReportCompiler::new(),
            config,
        }
    }

    /// Replace the reasoning collaborator.
    pub fn with_recommender(mut self, recommender: Arc<dyn Recommender>) -> Self {
        self.recommendations = RecommendationGenerator::new(
            recommender,
            Duration::from_millis(self.config.recommender.timeout_ms),
            self.config.tracking.recent_updates_limit,
        );
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start a tracking session for a project.
    ///
    /// Nothing is persisted when the project does not resolve or checklist
    /// generation fails.
    #[instrument(skip(self))]
    pub async fn initialize_tracking(
        &self,
        project_id: &str,
        implementation_type: ImplementationType,
    ) -> DomainResult<TrackingContext> {
        let project = self
            .projects
            .get_project(project_id)
            .await?
            .ok_or_else(|| DomainError::ProjectNotFound(project_id.to_string()))?;

        let now = Utc::now();
        let team_size = project
            .team_size
            .unwrap_or(self.config.scheduling.default_team_size);
        let daily_capacity_hours = f64::from(team_size) * self.config.scheduling.hours_per_day;

        let checklists = self.generator.generate_all(implementation_type)?;
        let phases = self.generator.plan_phases(implementation_type);
        let milestones = self.generator.plan_milestones(
            &phases,
            &checklists,
            project.planned_start,
            daily_capacity_hours,
        );

        let seed = TrackingContext {
            project_id: project.id.clone(),
            session_id: Uuid::new_v4(),
            project_name: project.name.clone(),
            current_phase_id: phases.first().map(|p| p.id.clone()).unwrap_or_default(),
            implementation_type,
            phases,
            checklists,
            metrics: Vec::new(),
            alerts: Vec::new(),
            recommendations: Vec::new(),
            milestones,
            resource_utilization: Vec::new(),
            recent_updates: Vec::new(),
            daily_capacity_hours,
            target_completion: project.target_completion,
            created_at: now,
            updated_at: now,
            archived_at: None,
        };

        let mut context = self.derive(&seed, seed.clone(), now);
        context.recommendations = self.recommendations.generate(&context).await;

        self.repository.save(&context).await?;
        info!(
            session_id = %context.session_id,
            project_id = %context.project_id,
            items = context.items().count(),
            "tracking session initialized"
        );
        Ok(context)
    }

    /// Apply a status change to one checklist item and recompute the session.
    #[instrument(skip(self, notes))]
    pub async fn update_progress(
        &self,
        session_id: Uuid,
        item_id: &str,
        status: &str,
        actual_hours: Option<f64>,
        notes: Option<String>,
    ) -> DomainResult<TrackingContext> {
        let status = ItemStatus::parse(status)?;
        if let Some(hours) = actual_hours {
            if !hours.is_finite() || !(0.0..=MAX_ACTUAL_HOURS).contains(&hours) {
                return Err(DomainError::ValidationFailed(format!(
                    "actual hours must be between 0 and {MAX_ACTUAL_HOURS}, got {hours}"
                )));
            }
        }

        let current = self.load_mutable(session_id).await?;
        let location = EntityIndex::build(&current.checklists)?.require(item_id)?;

        let now = Utc::now();
        let mut next = current.clone();
        let checklist = &mut next.checklists[location.checklist_index];
        let checklist_id = checklist.id.clone();
        let item = &mut checklist.items[location.item_index];

        let previous_status = item.status;
        item.status = status;
        if actual_hours.is_some() {
            item.actual_hours = actual_hours;
        }
        if let Some(note) = notes.as_ref().filter(|n| !n.trim().is_empty()) {
            item.notes.push(note.clone());
        }
        item.completed_at = if status == ItemStatus::Completed {
            item.completed_at.or(Some(now))
        } else {
            None
        };

        next.recent_updates.push(ProgressUpdateRecord {
            item_id: item_id.to_string(),
            checklist_id,
            previous_status,
            status,
            actual_hours,
            notes,
            recorded_at: now,
        });
        let overflow = next
            .recent_updates
            .len()
            .saturating_sub(self.config.tracking.recent_updates_limit);
        next.recent_updates.drain(..overflow);
        next.updated_at = now;

        let mut next = self.derive(&current, next, now);
        next.recommendations = self.recommendations.generate(&next).await;

        if next
            .final_phase()
            .is_some_and(|p| p.status == PhaseStatus::Completed)
        {
            next.archived_at = Some(now);
            info!(session_id = %session_id, "final phase completed, session archived");
        }

        self.repository.save(&next).await?;
        info!(
            session_id = %session_id,
            item_id,
            from = %previous_status,
            to = %status,
            "progress updated"
        );
        Ok(next)
    }

    /// Set or clear a caller-controlled phase side-state.
    ///
    /// `blocked` and `delayed` may be set on a phase that is in progress (or
    /// already in the other side-state). Setting `in_progress` clears a
    /// side-state; the status is then re-derived from item state.
    #[instrument(skip(self))]
    pub async fn set_phase_status(
        &self,
        session_id: Uuid,
        phase_id: &str,
        status: PhaseStatus,
    ) -> DomainResult<TrackingContext> {
        let current = self.load_mutable(session_id).await?;
        let phase = current
            .phase(phase_id)
            .ok_or_else(|| DomainError::PhaseNotFound(phase_id.to_string()))?;

        let allowed = match status {
            PhaseStatus::Blocked | PhaseStatus::Delayed => {
                phase.status == PhaseStatus::InProgress || phase.status.is_side_state()
            }
            PhaseStatus::InProgress => phase.status.is_side_state(),
            PhaseStatus::NotStarted | PhaseStatus::Completed => false,
        };
        if !allowed {
            return Err(DomainError::ValidationFailed(format!(
                "phase {phase_id} cannot move from {} to {status}",
                phase.status
            )));
        }

        let now = Utc::now();
        let mut next = current.clone();
        if let Some(phase) = next.phases.iter_mut().find(|p| p.id == phase_id) {
            phase.status = status;
        }
        next.updated_at = now;
        let next = self.derive(&current, next, now);

        self.repository.save(&next).await?;
        info!(session_id = %session_id, phase_id, status = %status, "phase status set");
        Ok(next)
    }

    /// Move an alert through its lifecycle.
    #[instrument(skip(self))]
    pub async fn update_alert_status(
        &self,
        session_id: Uuid,
        alert_id: Uuid,
        status: AlertStatus,
    ) -> DomainResult<TrackingContext> {
        let mut next = self.load_mutable(session_id).await?;
        let alert = next
            .alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or(DomainError::AlertNotFound(alert_id))?;
        alert.transition_to(status)?;
        next.updated_at = Utc::now();

        self.repository.save(&next).await?;
        info!(session_id = %session_id, alert_id = %alert_id, status = status.as_str(), "alert status updated");
        Ok(next)
    }

    pub async fn get_context(&self, session_id: Uuid) -> DomainResult<TrackingContext> {
        self.repository
            .load(session_id)
            .await?
            .ok_or(DomainError::SessionNotFound(session_id))
    }

    pub async fn list_sessions(&self, project_id: &str) -> DomainResult<Vec<TrackingContext>> {
        self.repository.list_for_project(project_id).await
    }

    pub async fn generate_intelligent_report(
        &self,
        session_id: Uuid,
    ) -> DomainResult<IntelligentReport> {
        let context = self.get_context(session_id).await?;
        Ok(self.reports.compile(&context, Utc::now()))
    }

    pub async fn analyze_predictive_timeline(
        &self,
        session_id: Uuid,
    ) -> DomainResult<TimelinePrediction> {
        let context = self.get_context(session_id).await?;
        let history = self.repository.list_for_project(&context.project_id).await?;
        Ok(self.reports.predict_timeline(&context, &history, Utc::now()))
    }

    pub async fn optimize_resource_allocation(
        &self,
        session_id: Uuid,
    ) -> DomainResult<ResourceOptimization> {
        let context = self.get_context(session_id).await?;
        let history = self.repository.list_for_project(&context.project_id).await?;
        Ok(self.reports.optimize_resources(&context, &history))
    }

    async fn load_mutable(&self, session_id: Uuid) -> DomainResult<TrackingContext> {
        let context = self.get_context(session_id).await?;
        if context.is_archived() {
            return Err(DomainError::ValidationFailed(format!(
                "tracking session {session_id} is archived"
            )));
        }
        Ok(context)
    }

    /// Aggregate, collect metrics and evaluate alerts for `next`, using
    /// `previous` as the baseline for metric trends.
    fn derive(
        &self,
        previous: &TrackingContext,
        next: TrackingContext,
        now: DateTime<Utc>,
    ) -> TrackingContext {
        let mut next = self.aggregator.recompute(next, now);
        next.metrics = self.metrics.collect(previous, &next);
        next.alerts = self.alerts.analyze_transition(previous, &next, now);
        debug!(
            session_id = %next.session_id,
            current_phase = %next.current_phase_id,
            active_alerts = next.active_alerts().count(),
            "derived state recomputed"
        );
        next
    }
}
