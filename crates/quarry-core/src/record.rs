//! Version lifecycle records.
//!
//! One [`VersionRecord`] exists per known version of a project. Records are
//! owned and persisted by the metadata-store collaborator; this crate defines
//! their shape and the state transitions lifecycle operations apply.
//!
//! # State machine
//!
//! ```text
//! ACTIVE ──evict──▶ EVICTED          (content gone, record remains)
//! ACTIVE|EVICTED ──deprecate──▶ flag (orthogonal, never auto-cleared)
//! ACTIVE|EVICTED ──delete──▶ removed (record gone)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ProjectId;
use crate::project::ProjectCoordinates;
use crate::version::VersionId;

/// Orthogonal state flags carried by a version record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionData {
    /// The version has been marked obsolete. Never implies content removal.
    pub deprecated: bool,
    /// The version is exempt from automated retention policies.
    pub excluded: bool,
}

/// The lifecycle record for one version of a project.
///
/// Invariants:
/// - `evicted == true` implies the version's content has been removed while
///   the record itself (and the version's presence in listings) remains.
/// - `data.deprecated` never implies content removal.
/// - A version that is `excluded` or already `evicted` is never selected by
///   the not-used retention policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Coordinates of the owning project.
    pub coordinates: ProjectCoordinates,
    /// The version this record describes.
    pub version: VersionId,
    /// Whether the version's content has been soft-removed.
    pub evicted: bool,
    /// Orthogonal state flags.
    pub data: VersionData,
    /// When the version was first ingested.
    pub created_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Creates a fresh, active record for a newly ingested version.
    #[must_use]
    pub fn new(coordinates: ProjectCoordinates, version: VersionId) -> Self {
        let now = Utc::now();
        Self {
            coordinates,
            version,
            evicted: false,
            data: VersionData::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the record as exempt from automated retention.
    #[must_use]
    pub fn with_excluded(mut self, excluded: bool) -> Self {
        self.data.excluded = excluded;
        self
    }

    /// Applies the eviction transition. Idempotent.
    pub fn mark_evicted(&mut self) {
        self.evicted = true;
        self.updated_at = Utc::now();
    }

    /// Applies the deprecation flag. Idempotent.
    pub fn mark_deprecated(&mut self) {
        self.data.deprecated = true;
        self.updated_at = Utc::now();
    }

    /// Returns true if automated retention may select this version.
    #[must_use]
    pub fn is_retention_candidate(&self) -> bool {
        !self.evicted && !self.data.excluded
    }
}

/// Last-use telemetry for a version.
///
/// Absence of a metric for an existing version means the version has never
/// been served to a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetric {
    /// Coordinates of the owning project.
    pub coordinates: ProjectCoordinates,
    /// The version that was served.
    pub version: VersionId,
    /// Last time the version's metadata was served to a consumer.
    pub last_queried_at: DateTime<Utc>,
}

impl UsageMetric {
    /// Creates a usage metric.
    #[must_use]
    pub fn new(
        coordinates: ProjectCoordinates,
        version: VersionId,
        last_queried_at: DateTime<Utc>,
    ) -> Self {
        Self {
            coordinates,
            version,
            last_queried_at,
        }
    }

    /// Returns true if the last use predates the cutoff.
    #[must_use]
    pub fn is_older_than(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_queried_at < cutoff
    }
}

/// Divergence between the metadata store and the source-of-truth repository
/// for one project, as produced by the reconciliation collaborator.
///
/// Consumed read-only by retention policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMismatch {
    /// Identifier of the project record the mismatch concerns.
    pub project_id: ProjectId,
    /// Coordinates of the project.
    pub coordinates: ProjectCoordinates,
    /// Versions known to the store but absent from the source repository.
    pub versions_only_in_store: Vec<VersionId>,
    /// Versions present in the source repository but unknown to the store.
    pub versions_only_in_source_repo: Vec<VersionId>,
}

impl VersionMismatch {
    /// Creates a mismatch record.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        coordinates: ProjectCoordinates,
        versions_only_in_store: Vec<VersionId>,
        versions_only_in_source_repo: Vec<VersionId>,
    ) -> Self {
        Self {
            project_id,
            coordinates,
            versions_only_in_store,
            versions_only_in_source_repo,
        }
    }

    /// Returns true if the store knows versions the source repository lacks.
    #[must_use]
    pub fn has_store_only_versions(&self) -> bool {
        !self.versions_only_in_store.is_empty()
    }
}
