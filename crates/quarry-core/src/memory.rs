//! In-memory collaborator implementations.
//!
//! Reference backends for local development and tests. The metadata store
//! records every operation it serves and supports per-version failure
//! injection, so tests can assert exact access patterns and exercise
//! partial-failure paths without a real store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::project::{Project, ProjectCoordinates};
use crate::record::{UsageMetric, VersionMismatch, VersionRecord};
use crate::store::{MetadataStore, ReconciliationSource, UsageMetricsStore};
use crate::version::{compare_precedence, VersionId};

#[derive(Debug, Clone)]
struct ProjectEntry {
    project: Project,
    versions: Vec<VersionRecord>,
}

/// In-memory [`MetadataStore`] with operation recording and failure
/// injection.
///
/// # Example
///
/// ```rust
/// use quarry_core::memory::MemoryMetadataStore;
/// use quarry_core::project::{Project, ProjectCoordinates};
///
/// let store = MemoryMetadataStore::new();
/// let coords = ProjectCoordinates::new("org.example", "server").unwrap();
/// store.insert_project(Project::new(coords, "master"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    entries: Arc<Mutex<HashMap<ProjectCoordinates, ProjectEntry>>>,
    operations: Arc<Mutex<Vec<&'static str>>>,
    fail_versions: Arc<Mutex<Vec<VersionId>>>,
}

impl MemoryMetadataStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a project record.
    pub fn insert_project(&self, project: Project) {
        let mut entries = self.entries.lock().expect("lock");
        entries
            .entry(project.coordinates.clone())
            .and_modify(|entry| entry.project = project.clone())
            .or_insert_with(|| ProjectEntry {
                project,
                versions: Vec::new(),
            });
    }

    /// Inserts a version record, creating its project (default branch
    /// `master`) if it does not exist yet.
    pub fn insert_version(&self, record: VersionRecord) {
        let mut entries = self.entries.lock().expect("lock");
        let entry = entries
            .entry(record.coordinates.clone())
            .or_insert_with(|| ProjectEntry {
                project: Project::new(record.coordinates.clone(), "master"),
                versions: Vec::new(),
            });
        if let Some(existing) = entry
            .versions
            .iter_mut()
            .find(|r| r.version == record.version)
        {
            *existing = record;
        } else {
            entry.versions.push(record);
        }
    }

    /// Makes `upsert_version` fail for the given version.
    pub fn inject_upsert_failure(&self, version: VersionId) {
        self.fail_versions.lock().expect("lock").push(version);
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        self.fail_versions.lock().expect("lock").clear();
    }

    /// Returns the names of all operations served so far.
    #[must_use]
    pub fn operations(&self) -> Vec<&'static str> {
        self.operations.lock().expect("lock").clone()
    }

    /// Returns how many times the named operation was served.
    #[must_use]
    pub fn operation_count(&self, name: &str) -> usize {
        self.operations
            .lock()
            .expect("lock")
            .iter()
            .filter(|op| **op == name)
            .count()
    }

    /// Clears the recorded operation log.
    pub fn clear_operations(&self) {
        self.operations.lock().expect("lock").clear();
    }

    fn record_op(&self, name: &'static str) {
        if let Ok(mut ops) = self.operations.lock() {
            ops.push(name);
        }
    }

    fn locked(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ProjectCoordinates, ProjectEntry>>> {
        self.entries.lock().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn find_project(&self, coordinates: &ProjectCoordinates) -> Result<Option<Project>> {
        self.record_op("find_project");
        Ok(self.locked()?.get(coordinates).map(|e| e.project.clone()))
    }

    async fn check_project_exists(&self, coordinates: &ProjectCoordinates) -> Result<()> {
        self.record_op("check_project_exists");
        if self.locked()?.contains_key(coordinates) {
            Ok(())
        } else {
            Err(Error::resource_not_found("project", coordinates))
        }
    }

    async fn list_versions(&self, coordinates: &ProjectCoordinates) -> Result<Vec<VersionId>> {
        self.record_op("list_versions");
        let mut versions: Vec<VersionId> = self
            .locked()?
            .get(coordinates)
            .map(|e| e.versions.iter().map(|r| r.version.clone()).collect())
            .unwrap_or_default();
        versions.sort_by(compare_precedence);
        Ok(versions)
    }

    async fn find_version(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<Option<VersionRecord>> {
        self.record_op("find_version");
        Ok(self.locked()?.get(coordinates).and_then(|e| {
            e.versions.iter().find(|r| r.version == *version).cloned()
        }))
    }

    async fn find_all_versions(
        &self,
        coordinates: &ProjectCoordinates,
    ) -> Result<Vec<VersionRecord>> {
        self.record_op("find_all_versions");
        Ok(self
            .locked()?
            .get(coordinates)
            .map(|e| e.versions.clone())
            .unwrap_or_default())
    }

    async fn upsert_version(&self, record: VersionRecord) -> Result<VersionRecord> {
        self.record_op("upsert_version");
        if self
            .fail_versions
            .lock()
            .map(|fails| fails.contains(&record.version))
            .unwrap_or(false)
        {
            return Err(Error::store(format!(
                "injected failure for version {}",
                record.version
            )));
        }

        let mut entries = self.locked()?;
        let entry = entries
            .entry(record.coordinates.clone())
            .or_insert_with(|| ProjectEntry {
                project: Project::new(record.coordinates.clone(), "master"),
                versions: Vec::new(),
            });
        if let Some(existing) = entry
            .versions
            .iter_mut()
            .find(|r| r.version == record.version)
        {
            *existing = record.clone();
        } else {
            entry.versions.push(record.clone());
        }
        Ok(record)
    }

    async fn delete_version(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<u64> {
        self.record_op("delete_version");
        let mut entries = self.locked()?;
        let Some(entry) = entries.get_mut(coordinates) else {
            return Ok(0);
        };
        let before = entry.versions.len();
        entry.versions.retain(|r| r.version != *version);
        Ok((before - entry.versions.len()) as u64)
    }

    async fn list_all_projects(&self) -> Result<Vec<Project>> {
        self.record_op("list_all_projects");
        let mut projects: Vec<Project> =
            self.locked()?.values().map(|e| e.project.clone()).collect();
        projects.sort_by(|a, b| {
            a.coordinates
                .to_string()
                .cmp(&b.coordinates.to_string())
        });
        Ok(projects)
    }
}

/// In-memory [`UsageMetricsStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUsageMetrics {
    metrics: Arc<Mutex<Vec<UsageMetric>>>,
}

impl MemoryUsageMetrics {
    /// Creates a new empty metrics store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored metrics.
    #[must_use]
    pub fn all(&self) -> Vec<UsageMetric> {
        self.metrics.lock().expect("lock").clone()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, Vec<UsageMetric>>> {
        self.metrics.lock().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })
    }
}

#[async_trait]
impl UsageMetricsStore for MemoryUsageMetrics {
    async fn find_snapshot_metrics_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<UsageMetric>> {
        Ok(self
            .locked()?
            .iter()
            .filter(|m| m.version.is_snapshot() && m.is_older_than(cutoff))
            .cloned()
            .collect())
    }

    async fn find_release_metrics_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<UsageMetric>> {
        Ok(self
            .locked()?
            .iter()
            .filter(|m| !m.version.is_snapshot() && m.is_older_than(cutoff))
            .cloned()
            .collect())
    }

    async fn find_metrics_for_project(
        &self,
        coordinates: &ProjectCoordinates,
    ) -> Result<Vec<UsageMetric>> {
        Ok(self
            .locked()?
            .iter()
            .filter(|m| m.coordinates == *coordinates)
            .cloned()
            .collect())
    }

    async fn record_usage(&self, metric: UsageMetric) -> Result<()> {
        let mut metrics = self.locked()?;
        if let Some(existing) = metrics
            .iter_mut()
            .find(|m| m.coordinates == metric.coordinates && m.version == metric.version)
        {
            *existing = metric;
        } else {
            metrics.push(metric);
        }
        Ok(())
    }

    async fn delete_metric(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<()> {
        self.locked()?
            .retain(|m| !(m.coordinates == *coordinates && m.version == *version));
        Ok(())
    }
}

/// In-memory [`ReconciliationSource`] fed by tests or fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryReconciliation {
    mismatches: Arc<Mutex<Vec<VersionMismatch>>>,
}

impl MemoryReconciliation {
    /// Creates a source with no mismatches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a mismatch to the set this source reports.
    pub fn push_mismatch(&self, mismatch: VersionMismatch) {
        self.mismatches.lock().expect("lock").push(mismatch);
    }
}

#[async_trait]
impl ReconciliationSource for MemoryReconciliation {
    async fn find_version_mismatches(&self) -> Result<Vec<VersionMismatch>> {
        self.mismatches
            .lock()
            .map(|m| m.clone())
            .map_err(|_| Error::Internal {
                message: "lock poisoned".into(),
            })
    }
}
