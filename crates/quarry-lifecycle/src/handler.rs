//! Artifact content handlers and their registry.
//!
//! What content constitutes a version is delegated to per-type handlers:
//! the engine itself never touches artifact bytes. Every destructive
//! operation fans out to **every** registered handler unconditionally;
//! handlers must treat a missing-content deletion as a no-op, not an error.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use quarry_core::{ProjectCoordinates, VersionId};

use crate::error::Result;

/// Deletes one content type's artifacts for a version.
///
/// Implementations must be safe to call for versions whose content does not
/// exist (no-op, not an error), since the registry dispatches without any
/// existence check.
#[async_trait]
pub trait ArtifactHandler: Send + Sync + 'static {
    /// The artifact content type this handler manages (e.g. `"jar"`,
    /// `"container-image"`).
    fn content_type(&self) -> &str;

    /// Removes this content type's artifacts for the named version.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Handler` if deletion fails. Missing content
    /// is not a failure.
    async fn delete_content(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<()>;
}

/// Registry of artifact handlers, keyed by content type.
///
/// An injectable instance owned by the composition root, not process-global
/// state, so tests stay deterministic and isolated. Registration order is
/// preserved; registering a handler for an already-known content type
/// replaces the previous handler in place.
///
/// # Example
///
/// ```rust,ignore
/// let registry = HandlerRegistry::new();
/// registry.register(Arc::new(JarHandler::new(storage)));
/// registry.register(Arc::new(PomHandler::new(storage)));
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Vec<Arc<dyn ArtifactHandler>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs or replaces the handler for its content type.
    pub fn register(&self, handler: Arc<dyn ArtifactHandler>) {
        // A panicked registrant cannot leave the handler set half-updated.
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handlers
            .iter_mut()
            .find(|h| h.content_type() == handler.content_type())
        {
            *existing = handler;
        } else {
            handlers.push(handler);
        }
    }

    /// Returns all registered handlers in first-registration order.
    ///
    /// The returned set is a snapshot; callers iterate it without holding
    /// the registry lock.
    #[must_use]
    pub fn all_handlers(&self) -> Vec<Arc<dyn ArtifactHandler>> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content_types: Vec<String> = self
            .all_handlers()
            .iter()
            .map(|h| h.content_type().to_string())
            .collect();
        f.debug_struct("HandlerRegistry")
            .field("content_types", &content_types)
            .finish()
    }
}
