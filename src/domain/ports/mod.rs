//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - TrackingRepository: snapshot persistence for tracking sessions
//! - ProjectMetadataSource: read-only project lookup
//! - Recommender: the reasoning service producing recommendations
//!
//! These traits keep the tracking engine independent of storage and of the
//! reasoning backend.

pub mod null_recommender;
pub mod project_metadata;
pub mod recommender;
pub mod tracking_repository;

pub use null_recommender::NullRecommender;
pub use project_metadata::ProjectMetadataSource;
pub use recommender::{ContextView, PhaseSummary, Recommender};
pub use tracking_repository::TrackingRepository;
