//! # quarry-lifecycle
//!
//! Version lifecycle & retention engine for the Quarry artifact metadata
//! repository.
//!
//! This crate decides which versions of a project remain fully materialized,
//! which are soft-removed ("evicted"), which are hard-removed ("deleted"),
//! and which are marked obsolete ("deprecated"):
//!
//! - **Handler Registry**: Per-content-type deletion handlers every
//!   destructive operation fans out to
//! - **Lifecycle Operations**: Atomic-per-target delete, evict, and
//!   deprecate with defined side effects on content and state
//! - **Retention Policies**: Batch selection by count, age/usage, never-used
//!   detection, and reconciliation against the source-of-truth repository
//! - **Outcome Aggregation**: Uniform success/error accumulation so partial
//!   failure never silently aborts a batch
//!
//! ## State machine
//!
//! ```text
//! ACTIVE ──evict──▶ EVICTED          (content gone, record remains)
//! ACTIVE|EVICTED ──deprecate──▶ flag (orthogonal, never auto-cleared)
//! ACTIVE|EVICTED ──delete──▶ removed (record gone)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use quarry_lifecycle::prelude::*;
//!
//! let registry = Arc::new(HandlerRegistry::new());
//! registry.register(Arc::new(JarHandler::new(storage)));
//!
//! let lifecycle = Lifecycle::new(store, usage, registry);
//! let engine = RetentionEngine::new(lifecycle, reconciliation, RetentionPolicy::default());
//!
//! let outcome = engine.sweep().await?;
//! if outcome.has_errors() {
//!     // partial success: inspect outcome.errors()
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod handler;
pub mod metrics;
pub mod ops;
pub mod outcome;
pub mod policy;
pub mod retention;

// Re-export main types at crate root
pub use error::{LifecycleError, Result};
pub use handler::{ArtifactHandler, HandlerRegistry};
pub use ops::Lifecycle;
pub use outcome::OperationOutcome;
pub use policy::RetentionPolicy;
pub use retention::RetentionEngine;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{LifecycleError, Result};
    pub use crate::handler::{ArtifactHandler, HandlerRegistry};
    pub use crate::ops::Lifecycle;
    pub use crate::outcome::OperationOutcome;
    pub use crate::policy::RetentionPolicy;
    pub use crate::retention::RetentionEngine;
}
