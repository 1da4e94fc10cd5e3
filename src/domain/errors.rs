//! Domain errors for the deploytrack tracking engine.

use thiserror::Error;
use uuid::Uuid;

/// Format a cycle path as a human-readable string: `A -> B -> C -> A`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Coarse classification of a [`DomainError`].
///
/// Callers use the kind to decide whether to retry (external service),
/// fix their input (validation, not found) or give up (cycle, internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    ExternalService,
    Cycle,
    Internal,
}

/// Domain-level errors that can occur in the tracking engine.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Tracking session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Checklist item not found: {0}")]
    ItemNotFound(String),

    #[error("Phase not found: {0}")]
    PhaseNotFound(String),

    #[error("Alert not found: {0}")]
    AlertNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Checklist dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<String>),

    #[error("External service '{service}' failed: {message}")]
    ExternalService { service: String, message: String },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn external(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ProjectNotFound(_)
            | Self::SessionNotFound(_)
            | Self::ItemNotFound(_)
            | Self::PhaseNotFound(_)
            | Self::AlertNotFound(_) => ErrorKind::NotFound,
            Self::ValidationFailed(_) => ErrorKind::Validation,
            Self::DependencyCycle(_) => ErrorKind::Cycle,
            Self::ExternalService { .. } | Self::DatabaseError(_) => ErrorKind::ExternalService,
            Self::SerializationError(_) => ErrorKind::Internal,
        }
    }

    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound)
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = DomainError::DependencyCycle(vec![
            "dep-01".to_string(),
            "dep-02".to_string(),
            "dep-01".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Checklist dependency cycle detected: dep-01 -> dep-02 -> dep-01"
        );
        assert_eq!(err.kind(), ErrorKind::Cycle);
    }

    #[test]
    fn test_kind_classification() {
        assert!(DomainError::ItemNotFound("x".into()).is_not_found());
        assert!(DomainError::ProjectNotFound("p".into()).is_not_found());
        assert_eq!(
            DomainError::ValidationFailed("bad".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            DomainError::DatabaseError("locked".into()).kind(),
            ErrorKind::ExternalService
        );
        assert_eq!(
            DomainError::external("recommender", "timeout").kind(),
            ErrorKind::ExternalService
        );
    }
}
