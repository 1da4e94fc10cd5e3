//! Fixtures shared by service unit tests.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::models::{ImplementationType, TrackingContext};
use crate::services::checklist_generator::ChecklistGenerator;

/// A freshly initialized full-deployment session starting in 30 days.
pub fn sample_context() -> TrackingContext {
    context_for(ImplementationType::FullDeployment)
}

pub fn context_for(implementation_type: ImplementationType) -> TrackingContext {
    let generator = ChecklistGenerator::new();
    let now = Utc::now();
    let phases = generator.plan_phases(implementation_type);
    let checklists = generator
        .generate_all(implementation_type)
        .expect("templates are valid");
    let milestones =
        generator.plan_milestones(&phases, &checklists, Some(now + Duration::days(30)), 32.0);

    TrackingContext {
        project_id: "proj-1".to_string(),
        session_id: Uuid::new_v4(),
        project_name: "Campus Refresh".to_string(),
        current_phase_id: phases[0].id.clone(),
        implementation_type,
        phases,
        checklists,
        metrics: Vec::new(),
        alerts: Vec::new(),
        recommendations: Vec::new(),
        milestones,
        resource_utilization: Vec::new(),
        recent_updates: Vec::new(),
        daily_capacity_hours: 32.0,
        target_completion: None,
        created_at: now,
        updated_at: now,
        archived_at: None,
    }
}

/// Set the status of every item of a phase.
pub fn set_phase_items(
    context: &mut TrackingContext,
    phase_id: &str,
    status: crate::domain::models::ItemStatus,
) {
    for checklist in &mut context.checklists {
        if checklist.phase_id == phase_id {
            for item in &mut checklist.items {
                item.status = status;
            }
        }
    }
}

pub fn set_item(
    context: &mut TrackingContext,
    item_id: &str,
    status: crate::domain::models::ItemStatus,
    actual_hours: Option<f64>,
) {
    for checklist in &mut context.checklists {
        for item in &mut checklist.items {
            if item.id == item_id {
                item.status = status;
                if actual_hours.is_some() {
                    item.actual_hours = actual_hours;
                }
            }
        }
    }
}
