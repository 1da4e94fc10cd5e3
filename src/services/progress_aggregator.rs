//! Bottom-up completion aggregation and derived-state recompute.
//!
//! Everything here is a pure function of item state (plus the clock for
//! milestone deadlines). [`ProgressAggregator::recompute`] rebuilds every
//! derived field from scratch; nothing is patched incrementally.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::models::{
    CriteriaStatus, ItemStatus, MilestoneState, PhaseStatus, ResourceUtilization, SmartChecklist,
    SmartChecklistItem, TrackingContext, UtilizationStatus,
};

/// How overall progress is rolled up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressScope {
    /// Completion of the current phase.
    #[default]
    CurrentPhase,
    /// Mean completion across all phases.
    CrossPhase,
}

/// `100 * completed / total`, defined as `0` for an empty set.
pub fn completion_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * completed as f64 / total as f64
    }
}

/// Consumption lagging earned progress by more than this many points marks a
/// category as under-utilized.
const UNDER_UTILIZATION_GAP: f64 = 25.0;

#[derive(Debug, Clone, Default)]
pub struct ProgressAggregator;

impl ProgressAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn checklist_completion(&self, checklist: &SmartChecklist) -> f64 {
        completion_percentage(checklist.completed_count(), checklist.items.len())
    }

    /// Completion over the union of items of every checklist owned by the phase.
    pub fn phase_completion(&self, context: &TrackingContext, phase_id: &str) -> f64 {
        let (completed, total) = context
            .checklists_for_phase(phase_id)
            .flat_map(|c| c.items.iter())
            .fold((0, 0), |(done, total), item| {
                (done + usize::from(item.is_completed()), total + 1)
            });
        completion_percentage(completed, total)
    }

    pub fn overall_progress(&self, context: &TrackingContext, scope: ProgressScope) -> f64 {
        match scope {
            ProgressScope::CurrentPhase => context
                .current_phase()
                .map_or(0.0, |p| self.phase_completion(context, &p.id)),
            ProgressScope::CrossPhase => {
                if context.phases.is_empty() {
                    return 0.0;
                }
                let sum: f64 = context
                    .phases
                    .iter()
                    .map(|p| self.phase_completion(context, &p.id))
                    .sum();
                sum / context.phases.len() as f64
            }
        }
    }

    /// Rebuild all derived fields of the context.
    pub fn recompute(&self, mut context: TrackingContext, now: DateTime<Utc>) -> TrackingContext {
        for checklist in &mut context.checklists {
            checklist.completion_percentage = self.checklist_completion(checklist);
        }

        self.recompute_phases(&mut context, now);
        context.current_phase_id = select_current_phase(&context);
        recompute_milestones(&mut context, now);
        recompute_success_criteria(&mut context);
        context.resource_utilization = resource_utilization(context.items());

        context
    }

    fn recompute_phases(&self, context: &mut TrackingContext, now: DateTime<Utc>) {
        let derived: Vec<(f64, bool, bool)> = context
            .phases
            .iter()
            .map(|phase| {
                let owned: Vec<&SmartChecklist> = context.checklists_for_phase(&phase.id).collect();
                let all_complete = !owned.is_empty()
                    && owned
                        .iter()
                        .all(|c| !c.items.is_empty() && c.completed_count() == c.items.len());
                let any_started = owned
                    .iter()
                    .flat_map(|c| c.items.iter())
                    .any(|i| i.status.is_started());
                (self.phase_completion(context, &phase.id), all_complete, any_started)
            })
            .collect();

        for (phase, (completion, all_complete, any_started)) in
            context.phases.iter_mut().zip(derived)
        {
            phase.completion_percentage = completion;

            let next = if all_complete {
                PhaseStatus::Completed
            } else if phase.status == PhaseStatus::Completed {
                warn!(phase_id = %phase.id, completion, "completed phase regressed to in_progress");
                PhaseStatus::InProgress
            } else if phase.status.is_side_state() {
                phase.status
            } else if any_started {
                PhaseStatus::InProgress
            } else {
                PhaseStatus::NotStarted
            };

            if next != PhaseStatus::NotStarted && phase.started_at.is_none() {
                phase.started_at = Some(now);
            }
            phase.completed_at = if next == PhaseStatus::Completed {
                phase.completed_at.or(Some(now))
            } else {
                None
            };
            phase.status = next;
        }
    }
}

/// First phase in plan order that is not completed; the last phase once all are.
fn select_current_phase(context: &TrackingContext) -> String {
    context
        .phases
        .iter()
        .find(|p| p.status != PhaseStatus::Completed)
        .or_else(|| context.phases.last())
        .map(|p| p.id.clone())
        .unwrap_or_default()
}

fn recompute_milestones(context: &mut TrackingContext, now: DateTime<Utc>) {
    let statuses: BTreeMap<String, PhaseStatus> = context
        .phases
        .iter()
        .map(|p| (p.id.clone(), p.status))
        .collect();

    for milestone in &mut context.milestones {
        let Some(phase_status) = statuses.get(&milestone.phase_id) else {
            continue;
        };

        milestone.status = match phase_status {
            PhaseStatus::Completed => MilestoneState::Achieved,
            _ if milestone.target_date.is_some_and(|t| t < now) => MilestoneState::Missed,
            PhaseStatus::NotStarted => MilestoneState::Pending,
            _ => MilestoneState::InProgress,
        };
        milestone.achieved_at = if milestone.status == MilestoneState::Achieved {
            milestone.achieved_at.or(Some(now))
        } else {
            None
        };
    }
}

fn recompute_success_criteria(context: &mut TrackingContext) {
    let missed: Vec<String> = context
        .milestones
        .iter()
        .filter(|m| m.status == MilestoneState::Missed)
        .map(|m| m.phase_id.clone())
        .collect();

    for phase in &mut context.phases {
        let status = if phase.status == PhaseStatus::Completed {
            CriteriaStatus::Met
        } else if missed.contains(&phase.id) {
            CriteriaStatus::NotMet
        } else {
            CriteriaStatus::Pending
        };
        for criteria in &mut phase.success_criteria {
            criteria.status = status;
        }
    }
}

/// Per-category effort consumption, ordered by category name.
pub fn resource_utilization<'a>(
    items: impl Iterator<Item = &'a SmartChecklistItem>,
) -> Vec<ResourceUtilization> {
    let mut by_category: BTreeMap<&str, (f64, f64, f64)> = BTreeMap::new();
    for item in items {
        let entry = by_category.entry(item.category.as_str()).or_default();
        entry.0 += item.estimated_hours;
        entry.1 += item.actual_hours.unwrap_or(0.0);
        if item.status == ItemStatus::Completed {
            entry.2 += item.estimated_hours;
        }
    }

    by_category
        .into_iter()
        .map(|(category, (allocated, consumed, earned))| {
            let utilization = if allocated > 0.0 {
                100.0 * consumed / allocated
            } else {
                0.0
            };
            let progress = if allocated > 0.0 {
                100.0 * earned / allocated
            } else {
                0.0
            };
            let status = if consumed > allocated {
                UtilizationStatus::OverBudget
            } else if utilization + UNDER_UTILIZATION_GAP < progress {
                UtilizationStatus::UnderUtilized
            } else {
                UtilizationStatus::OnTrack
            };

            ResourceUtilization {
                category: category.to_string(),
                allocated_hours: allocated,
                consumed_hours: consumed,
                earned_hours: earned,
                utilization_percentage: utilization,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{sample_context, set_item, set_phase_items};
    use chrono::Duration;

    fn set_status(context: &mut TrackingContext, item_id: &str, status: ItemStatus) {
        set_item(context, item_id, status, None);
    }

    fn complete_phase(context: &mut TrackingContext, phase_id: &str) {
        set_phase_items(context, phase_id, ItemStatus::Completed);
    }

    #[test]
    fn test_completion_percentage_zero_items() {
        assert!((completion_percentage(0, 0)).abs() < f64::EPSILON);
        assert!((completion_percentage(1, 4) - 25.0).abs() < f64::EPSILON);
        assert!((completion_percentage(3, 3) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_started_item_moves_phase_in_progress() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        set_status(&mut context, "pre-01", ItemStatus::InProgress);

        let now = Utc::now();
        let context = aggregator.recompute(context, now);
        let phase = context.phase("phase-pre_deployment").unwrap();
        assert_eq!(phase.status, PhaseStatus::InProgress);
        assert_eq!(phase.started_at, Some(now));
        assert!(phase.completion_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn test_blocked_item_does_not_start_phase() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        set_status(&mut context, "pre-01", ItemStatus::Blocked);

        let context = aggregator.recompute(context, Utc::now());
        assert_eq!(
            context.phase("phase-pre_deployment").unwrap().status,
            PhaseStatus::NotStarted
        );
    }

    #[test]
    fn test_completed_phase_advances_current_phase() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        complete_phase(&mut context, "phase-pre_deployment");

        let context = aggregator.recompute(context, Utc::now());
        let phase = context.phase("phase-pre_deployment").unwrap();
        assert_eq!(phase.status, PhaseStatus::Completed);
        assert!((phase.completion_percentage - 100.0).abs() < f64::EPSILON);
        assert_eq!(context.current_phase_id, "phase-deployment");
        assert!(phase.success_criteria.iter().all(|c| c.status == CriteriaStatus::Met));
    }

    #[test]
    fn test_reopened_item_regresses_phase() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        complete_phase(&mut context, "phase-pre_deployment");
        let mut context = aggregator.recompute(context, Utc::now());

        set_status(&mut context, "pre-02", ItemStatus::InProgress);
        let context = aggregator.recompute(context, Utc::now());
        let phase = context.phase("phase-pre_deployment").unwrap();
        assert_eq!(phase.status, PhaseStatus::InProgress);
        assert!(phase.completed_at.is_none());
        assert_eq!(context.current_phase_id, "phase-pre_deployment");
    }

    #[test]
    fn test_side_state_sticks_until_completion() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        context.phases[0].status = PhaseStatus::Blocked;
        set_status(&mut context, "pre-01", ItemStatus::Completed);

        let mut context = aggregator.recompute(context, Utc::now());
        assert_eq!(context.phases[0].status, PhaseStatus::Blocked);
        assert!(context.phases[0].completion_percentage > 0.0);

        complete_phase(&mut context, "phase-pre_deployment");
        let context = aggregator.recompute(context, Utc::now());
        assert_eq!(context.phases[0].status, PhaseStatus::Completed);
    }

    #[test]
    fn test_overall_progress_scopes() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        complete_phase(&mut context, "phase-pre_deployment");
        let context = aggregator.recompute(context, Utc::now());

        // Current phase is deployment, untouched.
        assert!(aggregator.overall_progress(&context, ProgressScope::CurrentPhase).abs() < f64::EPSILON);
        let cross = aggregator.overall_progress(&context, ProgressScope::CrossPhase);
        assert!((cross - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_milestone_missed_after_target() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        let now = Utc::now();
        context.milestones[0].target_date = Some(now - Duration::days(1));

        let context = aggregator.recompute(context, now);
        assert_eq!(context.milestones[0].status, MilestoneState::Missed);
        assert!(context.phases[0]
            .success_criteria
            .iter()
            .all(|c| c.status == CriteriaStatus::NotMet));
    }

    #[test]
    fn test_resource_utilization_by_category() {
        let aggregator = ProgressAggregator::new();
        let mut context = sample_context();
        set_item(&mut context, "pre-01", ItemStatus::Completed, Some(40.0));

        let context = aggregator.recompute(context, Utc::now());
        let planning = context
            .resource_utilization
            .iter()
            .find(|r| r.category == "planning")
            .unwrap();
        // pre-01 (16h) and pre-05 (6h) are planning items.
        assert!((planning.allocated_hours - 22.0).abs() < f64::EPSILON);
        assert!((planning.consumed_hours - 40.0).abs() < f64::EPSILON);
        assert_eq!(planning.status, UtilizationStatus::OverBudget);

        let names: Vec<&str> = context.resource_utilization.iter().map(|r| r.category.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
