//! Error types for lifecycle and retention operations.

use thiserror::Error;

use quarry_core::{ProjectCoordinates, VersionId};

/// Result type alias for lifecycle operations.
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Errors that can occur during lifecycle and retention operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A single-target operation addressed a version or project that does
    /// not exist.
    #[error("not found: {resource_type} {id}")]
    NotFound {
        /// The type of resource that was not found.
        resource_type: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// An artifact handler failed while deleting content.
    #[error("artifact handler '{content_type}' failed: {message}")]
    Handler {
        /// Content type of the failing handler.
        content_type: String,
        /// Description of the handler failure.
        message: String,
    },

    /// A collaborator (store, metrics, reconciliation) failed.
    #[error("store error: {message}")]
    Store {
        /// Description of the collaborator failure.
        message: String,
    },

    /// A retention policy configuration is invalid.
    #[error("invalid retention policy: {message}")]
    Policy {
        /// Description of the configuration problem.
        message: String,
    },
}

impl LifecycleError {
    /// Creates a not-found error for a version.
    #[must_use]
    pub fn version_not_found(coordinates: &ProjectCoordinates, version: &VersionId) -> Self {
        Self::NotFound {
            resource_type: "version",
            id: format!("{coordinates}:{version}"),
        }
    }

    /// Creates a not-found error for a project.
    #[must_use]
    pub fn project_not_found(coordinates: &ProjectCoordinates) -> Self {
        Self::NotFound {
            resource_type: "project",
            id: coordinates.to_string(),
        }
    }

    /// Creates a handler failure error.
    #[must_use]
    pub fn handler(content_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            content_type: content_type.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<quarry_core::Error> for LifecycleError {
    fn from(err: quarry_core::Error) -> Self {
        match err {
            quarry_core::Error::ResourceNotFound { resource_type, id } => {
                Self::NotFound { resource_type, id }
            }
            other => Self::Store {
                message: other.to_string(),
            },
        }
    }
}
