use chrono::Utc;
use proptest::prelude::*;

use deploytrack::domain::models::{ItemStatus, SmartChecklist, TrackingContext};
use deploytrack::services::{completion_percentage, ChecklistGenerator, ProgressAggregator};
use deploytrack::ImplementationType;

fn status_strategy() -> impl Strategy<Value = ItemStatus> {
    prop_oneof![
        Just(ItemStatus::NotStarted),
        Just(ItemStatus::InProgress),
        Just(ItemStatus::Completed),
        Just(ItemStatus::Blocked),
        Just(ItemStatus::Skipped),
    ]
}

fn implementation_strategy() -> impl Strategy<Value = ImplementationType> {
    prop_oneof![
        Just(ImplementationType::Poc),
        Just(ImplementationType::Pilot),
        Just(ImplementationType::FullDeployment),
        Just(ImplementationType::Migration),
    ]
}

fn context_with_statuses(implementation_type: ImplementationType, statuses: &[ItemStatus]) -> TrackingContext {
    let generator = ChecklistGenerator::new();
    let mut checklists: Vec<SmartChecklist> = generator.generate_all(implementation_type).unwrap();
    for (item, status) in checklists
        .iter_mut()
        .flat_map(|c| c.items.iter_mut())
        .zip(statuses.iter().cycle())
    {
        item.status = *status;
    }

    let phases = generator.plan_phases(implementation_type);
    let now = Utc::now();
    TrackingContext {
        project_id: "prop".to_string(),
        session_id: uuid::Uuid::new_v4(),
        project_name: "Property".to_string(),
        current_phase_id: phases[0].id.clone(),
        implementation_type,
        milestones: generator.plan_milestones(&phases, &checklists, None, 32.0),
        phases,
        checklists,
        metrics: Vec::new(),
        alerts: Vec::new(),
        recommendations: Vec::new(),
        resource_utilization: Vec::new(),
        recent_updates: Vec::new(),
        daily_capacity_hours: 32.0,
        target_completion: None,
        created_at: now,
        updated_at: now,
        archived_at: None,
    }
}

proptest! {
    /// Property: completion is 100·m/n, 0 for an empty set, always in [0, 100]
    #[test]
    fn prop_completion_formula(total in 0usize..500, completed_seed in 0usize..500) {
        let completed = if total == 0 { 0 } else { completed_seed % (total + 1) };
        let pct = completion_percentage(completed, total);

        if total == 0 {
            prop_assert_eq!(pct, 0.0);
        } else {
            prop_assert!((pct - 100.0 * completed as f64 / total as f64).abs() < 1e-9);
        }
        prop_assert!((0.0..=100.0).contains(&pct));
    }

    /// Property: recompute derives every checklist and phase percentage from
    /// item state, counting only completed items
    #[test]
    fn prop_recompute_matches_item_counts(
        implementation_type in implementation_strategy(),
        statuses in prop::collection::vec(status_strategy(), 1..30),
    ) {
        let context = context_with_statuses(implementation_type, &statuses);
        let derived = ProgressAggregator::new().recompute(context, Utc::now());

        for checklist in &derived.checklists {
            let expected = completion_percentage(checklist.completed_count(), checklist.items.len());
            prop_assert!((checklist.completion_percentage - expected).abs() < 1e-9);
        }

        for phase in &derived.phases {
            let items: Vec<_> = derived
                .checklists_for_phase(&phase.id)
                .flat_map(|c| c.items.iter())
                .collect();
            let done = items.iter().filter(|i| i.status == ItemStatus::Completed).count();
            prop_assert!((phase.completion_percentage - completion_percentage(done, items.len())).abs() < 1e-9);
        }
    }

    /// Property: recompute is a pure function of the context
    #[test]
    fn prop_recompute_is_idempotent(
        implementation_type in implementation_strategy(),
        statuses in prop::collection::vec(status_strategy(), 1..30),
    ) {
        let aggregator = ProgressAggregator::new();
        let now = Utc::now();
        let once = aggregator.recompute(context_with_statuses(implementation_type, &statuses), now);
        let twice = aggregator.recompute(once.clone(), now);
        prop_assert_eq!(once, twice);
    }
}
