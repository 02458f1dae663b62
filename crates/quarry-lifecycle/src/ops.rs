//! Single-target lifecycle operations.
//!
//! Each operation is atomic per target: it validates against the current
//! record, applies its content and state side effects, and persists through
//! the store collaborator. Cross-target coordination belongs to the batch
//! retention policies, not here.

use std::sync::Arc;

use quarry_core::{
    MetadataStore, ProjectCoordinates, UsageMetricsStore, VersionId, VersionRecord,
};

use crate::error::{LifecycleError, Result};
use crate::handler::HandlerRegistry;

/// Executes lifecycle operations against the metadata store, the usage
/// metrics backend, and the registered artifact handlers.
///
/// # Example
///
/// ```rust,ignore
/// let lifecycle = Lifecycle::new(store, usage, registry);
/// lifecycle.evict(&coordinates, &VersionId::new("1.0.0")).await?;
/// ```
#[derive(Clone)]
pub struct Lifecycle {
    pub(crate) store: Arc<dyn MetadataStore>,
    pub(crate) usage: Arc<dyn UsageMetricsStore>,
    registry: Arc<HandlerRegistry>,
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifecycle")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Lifecycle {
    /// Creates a lifecycle executor over the given collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn MetadataStore>,
        usage: Arc<dyn UsageMetricsStore>,
        registry: Arc<HandlerRegistry>,
    ) -> Self {
        Self {
            store,
            usage,
            registry,
        }
    }

    /// Returns the handler registry this executor dispatches to.
    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Permanently removes a version: content and metadata record.
    ///
    /// Dispatches content deletion to every registered handler, then removes
    /// the record. There is no existence precondition; deleting a
    /// non-existent version removes zero records without error. This is the
    /// only operation that removes the record.
    ///
    /// # Errors
    ///
    /// Propagates the first handler failure and any store failure.
    pub async fn delete(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<u64> {
        self.delete_handler_content(coordinates, version).await?;
        let removed = self.store.delete_version(coordinates, version).await?;

        tracing::info!(
            project = %coordinates,
            version = %version,
            removed,
            metric = "quarry_lifecycle_version_deleted",
            "deleted version"
        );
        crate::metrics::record_lifecycle_operation("delete");

        Ok(removed)
    }

    /// Soft-removes a version: content deleted, record retained.
    ///
    /// Sets `evicted = true` and deletes the version's usage metric. The
    /// version keeps appearing in listings. Idempotent: evicting an
    /// already-evicted version re-applies the same state and re-runs handler
    /// deletion.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version record does not exist; propagates
    /// handler and store failures.
    pub async fn evict(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<VersionRecord> {
        let mut record = self
            .store
            .find_version(coordinates, version)
            .await?
            .ok_or_else(|| LifecycleError::version_not_found(coordinates, version))?;

        self.delete_handler_content(coordinates, version).await?;
        self.usage.delete_metric(coordinates, version).await?;

        record.mark_evicted();
        let record = self.store.upsert_version(record).await?;

        tracing::info!(
            project = %coordinates,
            version = %version,
            metric = "quarry_lifecycle_version_evicted",
            "evicted version"
        );
        crate::metrics::record_lifecycle_operation("evict");

        Ok(record)
    }

    /// Marks a version obsolete. Never touches content or the `evicted`
    /// flag. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the version record does not exist; propagates
    /// store failures.
    pub async fn deprecate(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<VersionRecord> {
        let mut record = self
            .store
            .find_version(coordinates, version)
            .await?
            .ok_or_else(|| LifecycleError::version_not_found(coordinates, version))?;

        record.mark_deprecated();
        let record = self.store.upsert_version(record).await?;

        tracing::info!(
            project = %coordinates,
            version = %version,
            metric = "quarry_lifecycle_version_deprecated",
            "deprecated version"
        );
        crate::metrics::record_lifecycle_operation("deprecate");

        Ok(record)
    }

    /// Deletes the snapshot versions among `candidates`, guarding the
    /// project's default-branch snapshot.
    ///
    /// Non-snapshot candidates and the protected default-branch snapshot are
    /// skipped with an informational message, never an error. Returns
    /// `"Deleted all snapshot versions"` when nothing was skipped, otherwise
    /// every skip reason followed by `"Deleted remaining versions"`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist (the protected
    /// identifier cannot be derived without its configured default branch);
    /// propagates handler and store failures from the underlying deletes.
    pub async fn delete_snapshot_versions(
        &self,
        coordinates: &ProjectCoordinates,
        candidates: &[VersionId],
    ) -> Result<String> {
        let project = self
            .store
            .find_project(coordinates)
            .await?
            .ok_or_else(|| LifecycleError::project_not_found(coordinates))?;
        let protected = project.default_snapshot();

        let mut skipped = Vec::new();
        for candidate in candidates {
            if !candidate.is_snapshot() {
                tracing::debug!(
                    project = %coordinates,
                    version = %candidate,
                    "skipping non-snapshot candidate"
                );
                skipped.push(format!("Version {candidate} is not a snapshot version."));
                continue;
            }
            if *candidate == protected {
                tracing::debug!(
                    project = %coordinates,
                    version = %candidate,
                    "skipping protected default-branch snapshot"
                );
                skipped.push(format!(
                    "Version {candidate} is the project's default branch."
                ));
                continue;
            }
            self.delete(coordinates, candidate).await?;
        }

        if skipped.is_empty() {
            Ok("Deleted all snapshot versions".to_string())
        } else {
            skipped.push("Deleted remaining versions".to_string());
            Ok(skipped.join(" "))
        }
    }

    /// Fans content deletion out to every registered handler, in
    /// registration order. No existence check; a handler failure propagates
    /// immediately.
    async fn delete_handler_content(
        &self,
        coordinates: &ProjectCoordinates,
        version: &VersionId,
    ) -> Result<()> {
        for handler in self.registry.all_handlers() {
            handler.delete_content(coordinates, version).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use quarry_core::{
        memory::{MemoryMetadataStore, MemoryUsageMetrics},
        Project, UsageMetric,
    };

    use crate::handler::ArtifactHandler;

    /// Records every delete_content call; optionally fails for one version.
    struct RecordingHandler {
        content_type: String,
        calls: Arc<Mutex<Vec<String>>>,
        fail_on: Option<VersionId>,
    }

    #[async_trait]
    impl ArtifactHandler for RecordingHandler {
        fn content_type(&self) -> &str {
            &self.content_type
        }

        async fn delete_content(
            &self,
            coordinates: &ProjectCoordinates,
            version: &VersionId,
        ) -> Result<()> {
            if self.fail_on.as_ref() == Some(version) {
                return Err(LifecycleError::handler(
                    self.content_type.clone(),
                    format!("cannot delete {coordinates}:{version}"),
                ));
            }
            self.calls
                .lock()
                .expect("lock")
                .push(format!("{}:{version}", self.content_type));
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryMetadataStore>,
        usage: Arc<MemoryUsageMetrics>,
        lifecycle: Lifecycle,
        calls: Arc<Mutex<Vec<String>>>,
    }

    fn coords() -> ProjectCoordinates {
        ProjectCoordinates::new("org.example", "server").expect("valid")
    }

    fn fixture(content_types: &[&str]) -> Fixture {
        let store = Arc::new(MemoryMetadataStore::new());
        let usage = Arc::new(MemoryUsageMetrics::new());
        let registry = Arc::new(HandlerRegistry::new());
        let calls = Arc::new(Mutex::new(Vec::new()));
        for content_type in content_types {
            registry.register(Arc::new(RecordingHandler {
                content_type: (*content_type).to_string(),
                calls: Arc::clone(&calls),
                fail_on: None,
            }));
        }
        store.insert_project(Project::new(coords(), "master"));
        let lifecycle = Lifecycle::new(
            Arc::clone(&store) as Arc<dyn MetadataStore>,
            Arc::clone(&usage) as Arc<dyn UsageMetricsStore>,
            registry,
        );
        Fixture {
            store,
            usage,
            lifecycle,
            calls,
        }
    }

    #[tokio::test]
    async fn delete_dispatches_every_handler_and_removes_record() {
        let fx = fixture(&["jar", "pom", "docs"]);
        let version = VersionId::new("1.0.0");
        fx.store
            .insert_version(VersionRecord::new(coords(), version.clone()));

        let removed = fx.lifecycle.delete(&coords(), &version).await.expect("delete");
        assert_eq!(removed, 1);
        assert_eq!(
            *fx.calls.lock().expect("lock"),
            ["jar:1.0.0", "pom:1.0.0", "docs:1.0.0"]
        );
        assert!(fx
            .store
            .find_version(&coords(), &version)
            .await
            .expect("find")
            .is_none());
    }

    #[tokio::test]
    async fn delete_missing_version_is_not_an_error() {
        let fx = fixture(&["jar"]);
        let removed = fx
            .lifecycle
            .delete(&coords(), &VersionId::new("9.9.9"))
            .await
            .expect("delete");
        assert_eq!(removed, 0);
        // Handlers still ran: there is no existence check before dispatch.
        assert_eq!(fx.calls.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn evict_sets_flag_and_drops_usage_metric() {
        let fx = fixture(&["jar", "pom"]);
        let version = VersionId::new("1.0.0");
        fx.store
            .insert_version(VersionRecord::new(coords(), version.clone()));
        fx.usage
            .record_usage(UsageMetric::new(
                coords(),
                version.clone(),
                chrono::Utc::now(),
            ))
            .await
            .expect("record");

        let record = fx.lifecycle.evict(&coords(), &version).await.expect("evict");
        assert!(record.evicted);
        assert_eq!(fx.calls.lock().expect("lock").len(), 2);
        assert!(fx.usage.all().is_empty());

        // Record remains and the version still appears in listings.
        let listed = fx.store.list_versions(&coords()).await.expect("list");
        assert_eq!(listed, [version]);
    }

    #[tokio::test]
    async fn evict_is_idempotent_and_reruns_handlers() {
        let fx = fixture(&["jar"]);
        let version = VersionId::new("1.0.0");
        fx.store
            .insert_version(VersionRecord::new(coords(), version.clone()));

        fx.lifecycle.evict(&coords(), &version).await.expect("evict");
        let record = fx.lifecycle.evict(&coords(), &version).await.expect("evict");
        assert!(record.evicted);
        // Handler deletion re-runs on re-evict.
        assert_eq!(fx.calls.lock().expect("lock").len(), 2);
    }

    #[tokio::test]
    async fn evict_missing_version_is_not_found() {
        let fx = fixture(&["jar"]);
        let err = fx
            .lifecycle
            .evict(&coords(), &VersionId::new("9.9.9"))
            .await
            .expect_err("missing");
        assert!(err.is_not_found());
        // No handler ran for a version that failed validation.
        assert!(fx.calls.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn evict_propagates_handler_failure() {
        let fx = fixture(&[]);
        let version = VersionId::new("1.0.0");
        fx.store
            .insert_version(VersionRecord::new(coords(), version.clone()));
        fx.lifecycle.registry().register(Arc::new(RecordingHandler {
            content_type: "jar".to_string(),
            calls: Arc::clone(&fx.calls),
            fail_on: Some(version.clone()),
        }));

        let err = fx
            .lifecycle
            .evict(&coords(), &version)
            .await
            .expect_err("handler failure");
        assert!(matches!(err, LifecycleError::Handler { .. }));

        // The record was not touched.
        let record = fx
            .store
            .find_version(&coords(), &version)
            .await
            .expect("find")
            .expect("record");
        assert!(!record.evicted);
    }

    #[tokio::test]
    async fn deprecate_sets_flag_only() {
        let fx = fixture(&["jar"]);
        let version = VersionId::new("1.0.0");
        fx.store
            .insert_version(VersionRecord::new(coords(), version.clone()));

        let record = fx
            .lifecycle
            .deprecate(&coords(), &version)
            .await
            .expect("deprecate");
        assert!(record.data.deprecated);
        assert!(!record.evicted);
        // Deprecation never touches content.
        assert!(fx.calls.lock().expect("lock").is_empty());

        // Idempotent.
        let again = fx
            .lifecycle
            .deprecate(&coords(), &version)
            .await
            .expect("deprecate");
        assert!(again.data.deprecated);
    }

    #[tokio::test]
    async fn deprecate_missing_version_is_not_found() {
        let fx = fixture(&[]);
        let err = fx
            .lifecycle
            .deprecate(&coords(), &VersionId::new("9.9.9"))
            .await
            .expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_snapshots_guards_releases_and_default_branch() {
        let fx = fixture(&["jar"]);
        for v in ["1.0.0", "master-SNAPSHOT", "feature-SNAPSHOT"] {
            fx.store
                .insert_version(VersionRecord::new(coords(), VersionId::new(v)));
        }

        let status = fx
            .lifecycle
            .delete_snapshot_versions(
                &coords(),
                &[
                    VersionId::new("1.0.0"),
                    VersionId::new("master-SNAPSHOT"),
                    VersionId::new("feature-SNAPSHOT"),
                ],
            )
            .await
            .expect("delete snapshots");

        assert!(status.contains("Version 1.0.0 is not a snapshot version."));
        assert!(status.contains("Version master-SNAPSHOT is the project's default branch."));
        assert!(status.ends_with("Deleted remaining versions"));

        let listed = fx.store.list_versions(&coords()).await.expect("list");
        let listed: Vec<&str> = listed.iter().map(VersionId::as_str).collect();
        assert_eq!(listed, ["1.0.0", "master-SNAPSHOT"]);
    }

    #[tokio::test]
    async fn delete_snapshots_clean_run_reports_success() {
        let fx = fixture(&["jar"]);
        fx.store.insert_version(VersionRecord::new(
            coords(),
            VersionId::new("feature-SNAPSHOT"),
        ));

        let status = fx
            .lifecycle
            .delete_snapshot_versions(&coords(), &[VersionId::new("feature-SNAPSHOT")])
            .await
            .expect("delete snapshots");
        assert_eq!(status, "Deleted all snapshot versions");
    }

    #[tokio::test]
    async fn delete_snapshots_unknown_project_is_not_found() {
        let fx = fixture(&[]);
        let other = ProjectCoordinates::new("org.example", "ghost").expect("valid");
        let err = fx
            .lifecycle
            .delete_snapshot_versions(&other, &[VersionId::new("feature-SNAPSHOT")])
            .await
            .expect_err("missing project");
        assert!(err.is_not_found());
    }
}
