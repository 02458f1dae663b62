//! Collaborator traits for the lifecycle & retention engine.
//!
//! The engine owns no independent copy of truth: version records, usage
//! telemetry, and reconciliation output live behind these narrow interfaces.
//! Retry, backoff, and circuit-breaking are the implementations'
//! responsibility, not the engine's.
//!
//! # Trait overview
//!
//! | Trait | Owns | Consumed by |
//! |-------|------|-------------|
//! | [`MetadataStore`] | project + version records | lifecycle ops, all retention policies |
//! | [`UsageMetricsStore`] | last-use telemetry | evict, LRU + not-used policies |
//! | [`ReconciliationSource`] | store-vs-source divergence | reconciliation deprecation |

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::project::{Project, ProjectCoordinates};
use crate::record::{UsageMetric, VersionMismatch, VersionRecord};
use crate::version::VersionId;

/// The durable metadata store owning project and version records.
///
/// Expected to provide atomic upsert semantics for a single record;
/// the engine performs no cross-record transactions.
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Looks up a project by coordinates.
    async fn find_project(&self, coordinates: &ProjectCoordinates) -> Result<Option<Project>>;

    /// Verifies a project exists.
    ///
    /// # Errors
    ///
    /// Returns `Error::ResourceNotFound` if the project is absent.
    async fn check_project_exists(&self, coordinates: &ProjectCoordinates) -> Result<()>;

    /// Lists a project's version identifiers, ascending, oldest first.
    ///
    /// The engine treats this ordering as authoritative and never re-derives
    /// it.
    async fn list_versions(&self, coordinates: &ProjectCoordinates) -> Result<Vec<VersionId>>;

    /// Looks up a single version record.
    async fn find_version(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<Option<VersionRecord>>;

    /// Loads all version records of a project.
    async fn find_all_versions(
        &self,
        coordinates: &ProjectCoordinates,
    ) -> Result<Vec<VersionRecord>>;

    /// Inserts or replaces a version record, returning the stored state.
    async fn upsert_version(&self, record: VersionRecord) -> Result<VersionRecord>;

    /// Permanently removes a version record.
    ///
    /// Returns the number of records removed; removing a non-existent
    /// version removes zero records without error.
    async fn delete_version(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<u64>;

    /// Lists every project known to the store.
    async fn list_all_projects(&self) -> Result<Vec<Project>>;
}

/// The usage-telemetry backend.
///
/// Metrics are append/replace records of the last time a version's metadata
/// was served. Absence of a metric for an existing version means the version
/// has never been used.
#[async_trait]
pub trait UsageMetricsStore: Send + Sync + 'static {
    /// Returns snapshot-version metrics whose last use predates `cutoff`.
    async fn find_snapshot_metrics_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<UsageMetric>>;

    /// Returns release-version metrics whose last use predates `cutoff`.
    async fn find_release_metrics_before(&self, cutoff: DateTime<Utc>)
        -> Result<Vec<UsageMetric>>;

    /// Returns all usage metrics recorded for a project.
    async fn find_metrics_for_project(
        &self,
        coordinates: &ProjectCoordinates,
    ) -> Result<Vec<UsageMetric>>;

    /// Records that a version was served, replacing any previous metric for
    /// the same version.
    async fn record_usage(&self, metric: UsageMetric) -> Result<()>;

    /// Removes the usage metric for a version. Removing a missing metric is
    /// a no-op.
    async fn delete_metric(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<()>;
}

/// The reconciliation collaborator comparing the store against the
/// authoritative source repository.
///
/// The comparison algorithm itself is out of scope here; only its output is
/// consumed.
#[async_trait]
pub trait ReconciliationSource: Send + Sync + 'static {
    /// Returns all current store-vs-source divergences.
    async fn find_version_mismatches(&self) -> Result<Vec<VersionMismatch>>;
}
