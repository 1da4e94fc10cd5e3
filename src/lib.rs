//! deploytrack - implementation tracking for multi-phase network deployments
//!
//! A tracking session walks a project through pre-deployment, deployment,
//! validation and optimization. Each phase owns generated checklists; every
//! progress update re-derives completion, metrics, predictive alerts and
//! recommendations, and the whole session is persisted as one snapshot.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): the tracking engine
//! - **Adapters** (`adapters`): SQLite, in-memory and recommender backends
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deploytrack::adapters::memory::{InMemoryProjectCatalog, InMemoryTrackingRepository};
//! use deploytrack::{Config, ImplementationType, ProjectMetadata, TrackingService};
//!
//! let projects = InMemoryProjectCatalog::new();
//! projects.insert(ProjectMetadata::new("campus", "Campus refresh")).await;
//! let service = TrackingService::new(
//!     Arc::new(InMemoryTrackingRepository::new()),
//!     Arc::new(projects),
//!     Config::default(),
//! );
//! let ctx = service.initialize_tracking("campus", ImplementationType::Pilot).await?;
//! let ctx = service.update_progress(ctx.session_id, "pre-01", "completed", Some(6.0), None).await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult, ErrorKind};
pub use domain::models::{
    Config, ImplementationType, IntelligentReport, ItemStatus, PhaseStatus, ProjectMetadata,
    ResourceOptimization, TimelinePrediction, TrackingContext,
};
pub use domain::ports::{ProjectMetadataSource, Recommender, TrackingRepository};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::TrackingService;
