//! # quarry-core
//!
//! Core abstractions for Quarry, a metadata repository for versioned
//! software artifacts.
//!
//! This crate provides the foundational types and traits used across all
//! Quarry components:
//!
//! - **Identifiers**: Validated coordinate newtypes and ULID record IDs
//! - **Version Policy**: Snapshot/release classification and the precedence
//!   comparator ranking a project's versions oldest-first
//! - **Records**: Version lifecycle records, usage telemetry, reconciliation
//!   mismatches
//! - **Collaborator Traits**: The metadata store, usage metrics, and
//!   reconciliation interfaces the lifecycle engine is built against
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Crate Boundary
//!
//! `quarry-core` is the **only** crate allowed to define shared primitives.
//! The lifecycle engine and any outer surfaces consume them from here.
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::prelude::*;
//!
//! let coords = ProjectCoordinates::new("org.example", "server").unwrap();
//! let project = Project::new(coords, "master");
//! assert_eq!(project.default_snapshot().as_str(), "master-SNAPSHOT");
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod memory;
pub mod observability;
pub mod project;
pub mod record;
pub mod store;
pub mod version;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use quarry_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::id::ProjectId;
    pub use crate::memory::{MemoryMetadataStore, MemoryReconciliation, MemoryUsageMetrics};
    pub use crate::project::{ArtifactId, GroupId, Project, ProjectCoordinates};
    pub use crate::record::{UsageMetric, VersionData, VersionMismatch, VersionRecord};
    pub use crate::store::{MetadataStore, ReconciliationSource, UsageMetricsStore};
    pub use crate::version::{
        compare_precedence, ReleaseVersion, VersionId, VersionKind, SNAPSHOT_SUFFIX,
    };
}

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use id::ProjectId;
pub use observability::{init_logging, LogFormat};
pub use project::{ArtifactId, GroupId, Project, ProjectCoordinates};
pub use record::{UsageMetric, VersionData, VersionMismatch, VersionRecord};
pub use store::{MetadataStore, ReconciliationSource, UsageMetricsStore};
pub use version::{compare_precedence, ReleaseVersion, VersionId, VersionKind, SNAPSHOT_SUFFIX};
