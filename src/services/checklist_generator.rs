//! Template-driven generation of phase checklists and phase plans.
//!
//! Generation is deterministic and makes no external calls: the same
//! implementation type always yields the same ids, estimates and dependency
//! graph. Every generated checklist has its dependency graph validated before
//! it is returned.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    CriteriaStatus, ImplementationType, ItemPriority, ItemStatus, MilestoneState, MilestoneStatus,
    PhaseStatus, PhaseType, ProjectPhase, RiskFactor, RiskStatus, SmartChecklist,
    SmartChecklistItem, SuccessCriteria,
};

struct ItemTemplate {
    key: &'static str,
    title: &'static str,
    category: &'static str,
    priority: ItemPriority,
    hours: f64,
    depends_on: &'static [&'static str],
    criteria: &'static [&'static str],
    automated: bool,
}

#[allow(clippy::too_many_arguments)]
const fn item(
    key: &'static str,
    title: &'static str,
    category: &'static str,
    priority: ItemPriority,
    hours: f64,
    depends_on: &'static [&'static str],
    criteria: &'static [&'static str],
    automated: bool,
) -> ItemTemplate {
    ItemTemplate {
        key,
        title,
        category,
        priority,
        hours,
        depends_on,
        criteria,
        automated,
    }
}

use ItemPriority::{Critical, High, Low, Medium};

const PRE_DEPLOYMENT: &[ItemTemplate] = &[
    item("site_survey", "Complete site survey and capacity assessment", "planning", High, 16.0, &[], &["Survey report signed off"], false),
    item("network_design", "Finalize network design and addressing plan", "design", Critical, 24.0, &["site_survey"], &["Design reviewed by architecture board"], false),
    item("procurement", "Confirm hardware and licence procurement", "procurement", High, 8.0, &["network_design"], &["Purchase orders confirmed"], false),
    item("change_approval", "Obtain change management approval", "governance", High, 4.0, &["network_design"], &["Change ticket approved"], false),
    item("rollback_plan", "Document rollback plan", "planning", Medium, 6.0, &["network_design"], &["Rollback steps rehearsed"], false),
    item("staging", "Prepare staging environment", "infrastructure", Medium, 12.0, &["procurement"], &["Staging mirrors target topology"], true),
];

const DEPLOYMENT: &[ItemTemplate] = &[
    item("install", "Install and cable network hardware", "infrastructure", Critical, 24.0, &[], &["All devices powered and cabled"], false),
    item("base_config", "Apply baseline device configuration", "configuration", Critical, 16.0, &["install"], &["Baseline pushed to every device"], true),
    item("routing", "Configure routing and switching", "configuration", High, 20.0, &["base_config"], &["Routing tables converge"], false),
    item("security", "Deploy security policies and access control", "security", Critical, 16.0, &["base_config"], &["Policies enforced on all edges"], false),
    item("telemetry", "Enable monitoring and telemetry", "monitoring", Medium, 8.0, &["base_config"], &["Telemetry visible in dashboards"], true),
];

const DEPLOYMENT_MIGRATION: &[ItemTemplate] = &[
    item("legacy_export", "Freeze and export legacy configuration", "migration", Critical, 12.0, &[], &["Legacy config archived"], false),
    item("cutover", "Execute traffic cutover from legacy network", "migration", Critical, 16.0, &["legacy_export", "routing"], &["Traffic flowing on new network"], false),
];

const VALIDATION: &[ItemTemplate] = &[
    item("connectivity", "Run end-to-end connectivity tests", "testing", Critical, 12.0, &[], &["All paths reachable"], true),
    item("performance", "Run throughput and latency benchmarks", "testing", High, 16.0, &["connectivity"], &["Benchmarks within SLA"], true),
    item("failover", "Verify failover and redundancy", "testing", High, 12.0, &["connectivity"], &["Failover under target time"], false),
    item("security_audit", "Complete security audit", "security", High, 10.0, &[], &["No open critical findings"], false),
    item("acceptance", "Obtain user acceptance sign-off", "governance", Critical, 4.0, &["performance", "failover", "security_audit"], &["Acceptance recorded"], false),
];

const VALIDATION_MIGRATION: &[ItemTemplate] = &[
    item("legacy_parity", "Verify parity with legacy service levels", "migration", High, 10.0, &["connectivity"], &["Service levels match legacy"], false),
];

const OPTIMIZATION: &[ItemTemplate] = &[
    item("baseline_review", "Review post-deployment performance baseline", "monitoring", Medium, 8.0, &[], &["Baseline documented"], false),
    item("tuning", "Tune QoS and capacity settings", "configuration", Medium, 12.0, &["baseline_review"], &["Tuning changes applied"], false),
    item("alert_calibration", "Calibrate monitoring alert thresholds", "monitoring", Low, 6.0, &["baseline_review"], &["False positive rate acceptable"], true),
    item("as_built", "Update as-built documentation", "documentation", Medium, 8.0, &[], &["Documentation published"], false),
    item("lessons_learned", "Run lessons-learned review", "governance", Low, 4.0, &["tuning", "as_built"], &["Review notes shared"], false),
];

const HANDOVER: &[ItemTemplate] = &[
    item("runbooks", "Deliver operational runbooks", "documentation", High, 8.0, &[], &["Runbooks accepted by operations"], false),
    item("training", "Train operations staff", "training", High, 12.0, &["runbooks"], &["Training attendance recorded"], false),
    item("support_transition", "Transfer service ownership to support", "governance", Critical, 4.0, &["training"], &["Support team on call"], false),
];

/// Generator for phase checklists and the session phase plan.
#[derive(Debug, Clone, Default)]
pub struct ChecklistGenerator;

impl ChecklistGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate the checklist for one phase of an implementation type.
    pub fn generate(
        &self,
        implementation_type: ImplementationType,
        phase_type: PhaseType,
    ) -> DomainResult<SmartChecklist> {
        let factor = implementation_type.effort_factor();
        let prefix = phase_type.id_prefix();

        let templates: Vec<&ItemTemplate> = base_templates(phase_type)
            .iter()
            .chain(migration_templates(implementation_type, phase_type))
            .collect();

        let ids: HashMap<&str, String> = templates
            .iter()
            .enumerate()
            .map(|(i, t)| (t.key, format!("{prefix}-{:02}", i + 1)))
            .collect();

        let items = templates
            .iter()
            .map(|t| -> DomainResult<SmartChecklistItem> {
                let dependencies = t
                    .depends_on
                    .iter()
                    .map(|key| {
                        ids.get(key).cloned().ok_or_else(|| {
                            DomainError::ValidationFailed(format!(
                                "template item '{}' depends on unknown item '{key}'",
                                t.key
                            ))
                        })
                    })
                    .collect::<DomainResult<Vec<_>>>()?;

                Ok(SmartChecklistItem {
                    id: ids[t.key].clone(),
                    title: t.title.to_string(),
                    category: t.category.to_string(),
                    priority: t.priority,
                    status: ItemStatus::NotStarted,
                    estimated_hours: scale_hours(t.hours, factor),
                    actual_hours: None,
                    dependencies,
                    completion_criteria: t.criteria.iter().map(|c| (*c).to_string()).collect(),
                    automated: t.automated,
                    notes: Vec::new(),
                    completed_at: None,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        validate_dependencies(&items)?;

        Ok(SmartChecklist {
            id: phase_type.checklist_id(),
            phase_id: phase_type.phase_id(),
            phase_type,
            title: format!("{} Checklist", phase_type.display_name()),
            items,
            completion_percentage: 0.0,
            priority_score: priority_score(phase_type),
        })
    }

    /// Generate one checklist per phase of the implementation type's plan.
    pub fn generate_all(
        &self,
        implementation_type: ImplementationType,
    ) -> DomainResult<Vec<SmartChecklist>> {
        implementation_type
            .phase_plan()
            .iter()
            .map(|phase_type| self.generate(implementation_type, *phase_type))
            .collect()
    }

    /// Build the phase records for the implementation type's plan.
    ///
    /// Each phase depends on its predecessor; the first phase is the initial
    /// current phase.
    pub fn plan_phases(&self, implementation_type: ImplementationType) -> Vec<ProjectPhase> {
        let plan = implementation_type.phase_plan();
        plan.iter()
            .enumerate()
            .map(|(i, phase_type)| ProjectPhase {
                id: phase_type.phase_id(),
                name: phase_type.display_name().to_string(),
                phase_type: *phase_type,
                status: PhaseStatus::NotStarted,
                completion_percentage: 0.0,
                dependencies: if i == 0 {
                    Vec::new()
                } else {
                    vec![plan[i - 1].phase_id()]
                },
                success_criteria: success_criteria(*phase_type),
                risk_factors: risk_factors(implementation_type, *phase_type),
                started_at: None,
                completed_at: None,
            })
            .collect()
    }

    /// One completion milestone per phase.
    ///
    /// Targets are laid out back to back from `start`, each phase taking
    /// `ceil(estimated hours / daily capacity)` days. Without a start date or
    /// a positive capacity milestones carry no target.
    pub fn plan_milestones(
        &self,
        phases: &[ProjectPhase],
        checklists: &[SmartChecklist],
        start: Option<DateTime<Utc>>,
        daily_capacity_hours: f64,
    ) -> Vec<MilestoneStatus> {
        let mut cursor = start.filter(|_| daily_capacity_hours > 0.0);

        phases
            .iter()
            .map(|phase| {
                let hours: f64 = checklists
                    .iter()
                    .filter(|c| c.phase_id == phase.id)
                    .flat_map(|c| c.items.iter())
                    .map(|i| i.estimated_hours)
                    .sum();
                cursor = cursor.map(|at| advance_days(at, working_days(hours, daily_capacity_hours)));

                MilestoneStatus {
                    id: format!("ms-{}", phase.phase_type.id_prefix()),
                    phase_id: phase.id.clone(),
                    name: format!("{} complete", phase.name),
                    target_date: cursor,
                    status: MilestoneState::Pending,
                    achieved_at: None,
                }
            })
            .collect()
    }
}

/// Forecast horizon; longer schedules are reported at this length.
pub const MAX_FORECAST_DAYS: i64 = 36_500;

/// Whole days needed to burn `hours` at `daily_capacity_hours`, capped at
/// [`MAX_FORECAST_DAYS`].
#[allow(clippy::cast_possible_truncation)]
pub fn working_days(hours: f64, daily_capacity_hours: f64) -> i64 {
    if hours.is_nan() || hours <= 0.0 || daily_capacity_hours <= 0.0 {
        return 0;
    }
    let days = (hours / daily_capacity_hours).ceil();
    if days >= MAX_FORECAST_DAYS as f64 {
        MAX_FORECAST_DAYS
    } else {
        days as i64
    }
}

/// `at` moved forward by `days`, saturating at the latest representable instant.
pub fn advance_days(at: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    TimeDelta::try_days(days)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn base_templates(phase_type: PhaseType) -> &'static [ItemTemplate] {
    match phase_type {
        PhaseType::PreDeployment => PRE_DEPLOYMENT,
        PhaseType::Deployment => DEPLOYMENT,
        PhaseType::Validation => VALIDATION,
        PhaseType::Optimization => OPTIMIZATION,
        PhaseType::Handover => HANDOVER,
    }
}

fn migration_templates(
    implementation_type: ImplementationType,
    phase_type: PhaseType,
) -> &'static [ItemTemplate] {
    match (implementation_type, phase_type) {
        (ImplementationType::Migration, PhaseType::Deployment) => DEPLOYMENT_MIGRATION,
        (ImplementationType::Migration, PhaseType::Validation) => VALIDATION_MIGRATION,
        _ => &[],
    }
}

const fn priority_score(phase_type: PhaseType) -> f64 {
    match phase_type {
        PhaseType::PreDeployment => 0.9,
        PhaseType::Deployment => 1.0,
        PhaseType::Validation => 0.8,
        PhaseType::Optimization => 0.6,
        PhaseType::Handover => 0.5,
    }
}

/// Scale template hours, rounded to the nearest half hour.
fn scale_hours(hours: f64, factor: f64) -> f64 {
    (hours * factor * 2.0).round() / 2.0
}

fn success_criteria(phase_type: PhaseType) -> Vec<SuccessCriteria> {
    let prefix = phase_type.id_prefix();
    let specific = match phase_type {
        PhaseType::PreDeployment => ("Design approved by stakeholders", "Design sign-off recorded"),
        PhaseType::Deployment => ("All devices reachable and configured", "100% device reachability"),
        PhaseType::Validation => ("Acceptance sign-off recorded", "Acceptance item completed"),
        PhaseType::Optimization => ("Performance within target baseline", "Baseline met for 7 days"),
        PhaseType::Handover => ("Support team owns the service", "Ownership transferred"),
    };

    vec![
        SuccessCriteria {
            id: format!("{prefix}-sc1"),
            description: "All checklist items completed".to_string(),
            target: "100% checklist completion".to_string(),
            status: CriteriaStatus::Pending,
        },
        SuccessCriteria {
            id: format!("{prefix}-sc2"),
            description: specific.0.to_string(),
            target: specific.1.to_string(),
            status: CriteriaStatus::Pending,
        },
    ]
}

fn risk_factors(implementation_type: ImplementationType, phase_type: PhaseType) -> Vec<RiskFactor> {
    let mut risks: Vec<(&str, f64, f64, &str)> = match phase_type {
        PhaseType::PreDeployment => vec![
            ("Hardware delivery delays", 0.4, 0.7, "Order long-lead items first"),
            ("Incomplete site documentation", 0.3, 0.5, "Schedule follow-up surveys"),
        ],
        PhaseType::Deployment => vec![(
            "Configuration errors during rollout",
            0.35,
            0.8,
            "Push configuration from reviewed templates",
        )],
        PhaseType::Validation => vec![(
            "Performance below SLA targets",
            0.3,
            0.7,
            "Reserve tuning capacity before acceptance",
        )],
        PhaseType::Optimization => vec![(
            "Capacity growth exceeds design",
            0.2,
            0.6,
            "Review growth forecasts quarterly",
        )],
        PhaseType::Handover => vec![(
            "Operations team not ready",
            0.3,
            0.6,
            "Start training during validation",
        )],
    };

    if implementation_type == ImplementationType::Migration && phase_type == PhaseType::Deployment {
        risks.push((
            "Service outage during cutover",
            0.5,
            0.9,
            "Cut over in a maintenance window with rollback ready",
        ));
    }

    let prefix = phase_type.id_prefix();
    risks
        .into_iter()
        .enumerate()
        .map(|(i, (description, probability, impact, mitigation))| RiskFactor {
            id: format!("{prefix}-r{}", i + 1),
            description: description.to_string(),
            probability,
            impact,
            mitigation: mitigation.to_string(),
            status: RiskStatus::Open,
        })
        .collect()
}

// Standalone helper for cycle detection (no self needed)
fn detect_cycle_util<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> bool {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if detect_cycle_util(neighbor, graph, visited, rec_stack, path) {
                    return true;
                }
            } else if rec_stack.contains(neighbor) {
                if let Some(cycle_start) = path.iter().position(|&id| id == neighbor) {
                    path.drain(0..cycle_start);
                    path.push(neighbor);
                    return true;
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    false
}

/// Validate an item dependency graph.
///
/// Dependencies must name items of the same list; the graph must be acyclic.
/// A cycle is reported as the closed path, e.g. `a -> b -> a`.
pub fn validate_dependencies(items: &[SmartChecklistItem]) -> DomainResult<()> {
    let known: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

    for item in items {
        if let Some(missing) = item.dependencies.iter().find(|d| !known.contains(d.as_str())) {
            return Err(DomainError::ValidationFailed(format!(
                "item '{}' depends on '{missing}' which is not in the same checklist",
                item.id
            )));
        }
    }

    let graph: HashMap<&str, Vec<&str>> = items
        .iter()
        .map(|i| (i.id.as_str(), i.dependencies.iter().map(String::as_str).collect()))
        .collect();

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    // Walk in item order so the reported cycle is deterministic.
    for item in items {
        if !visited.contains(item.id.as_str())
            && detect_cycle_util(&item.id, &graph, &mut visited, &mut rec_stack, &mut path)
        {
            return Err(DomainError::DependencyCycle(
                path.into_iter().map(str::to_string).collect(),
            ));
        }
    }

    Ok(())
}
