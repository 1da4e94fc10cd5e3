//! Tracking engine services.
//!
//! Leaves first: entity index, checklist generator, progress aggregator,
//! metrics collector, alert analyzer, recommendation generator, report
//! compiler. [`TrackingService`] wires them to the ports.

pub mod alert_analyzer;
pub mod checklist_generator;
pub mod entity_index;
pub mod metrics_collector;
pub mod progress_aggregator;
pub mod recommendation_generator;
pub mod report_compiler;
pub mod tracking_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use alert_analyzer::AlertAnalyzer;
pub use checklist_generator::ChecklistGenerator;
pub use entity_index::{EntityIndex, ItemLocation};
pub use metrics_collector::MetricsCollector;
pub use progress_aggregator::{completion_percentage, ProgressAggregator, ProgressScope};
pub use recommendation_generator::RecommendationGenerator;
pub use report_compiler::ReportCompiler;
pub use tracking_service::{TrackingService, MAX_ACTUAL_HOURS};
