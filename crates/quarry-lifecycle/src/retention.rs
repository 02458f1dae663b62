//! Batch retention policies.
//!
//! Retention policies select *which* versions the lifecycle operations apply
//! to: by count, by age and usage, by never-used detection, and by
//! reconciliation against the source-of-truth repository. Each policy
//! processes its candidates sequentially and folds results into an
//! [`OperationOutcome`] so partial failure never aborts a whole batch,
//! with one deliberate exception documented on
//! [`RetentionEngine::evict_oldest_project_versions`].

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, Utc};

use quarry_core::{ProjectCoordinates, ReconciliationSource};

use crate::error::{LifecycleError, Result};
use crate::ops::Lifecycle;
use crate::outcome::OperationOutcome;
use crate::policy::RetentionPolicy;

/// Runs the retention policies over the metadata store.
///
/// # Example
///
/// ```rust,ignore
/// let engine = RetentionEngine::new(lifecycle, reconciliation, RetentionPolicy::default());
///
/// // One policy, explicitly
/// let outcome = engine.evict_versions_not_used().await?;
///
/// // Or everything the configured policy asks for
/// let outcome = engine.sweep().await?;
/// ```
pub struct RetentionEngine {
    lifecycle: Lifecycle,
    reconciliation: Arc<dyn ReconciliationSource>,
    policy: RetentionPolicy,
}

impl std::fmt::Debug for RetentionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionEngine")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetentionEngine {
    /// Creates a retention engine.
    #[must_use]
    pub fn new(
        lifecycle: Lifecycle,
        reconciliation: Arc<dyn ReconciliationSource>,
        policy: RetentionPolicy,
    ) -> Self {
        Self {
            lifecycle,
            reconciliation,
            policy,
        }
    }

    /// Returns the configured retention policy.
    #[must_use]
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Evicts a project's oldest versions beyond the keep count.
    ///
    /// Loads the ascending-oldest-first version list and evicts the leading
    /// `len - versions_to_keep` identifiers. When the project holds no more
    /// versions than the keep count, returns an empty outcome without
    /// touching any version record.
    ///
    /// The batch runs under a single failure boundary: the first eviction
    /// failure stops processing and contributes exactly one error naming the
    /// project and the cause. Versions evicted before the failure stay
    /// evicted.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the project does not exist; propagates listing
    /// failures.
    pub async fn evict_oldest_project_versions(
        &self,
        coordinates: &ProjectCoordinates,
        versions_to_keep: usize,
    ) -> Result<OperationOutcome> {
        self.lifecycle.store.check_project_exists(coordinates).await?;
        let versions = self.lifecycle.store.list_versions(coordinates).await?;

        let mut outcome = OperationOutcome::new();
        if versions.len() <= versions_to_keep {
            return Ok(outcome);
        }

        let surplus = versions.len() - versions_to_keep;
        tracing::info!(
            project = %coordinates,
            total = versions.len(),
            keep = versions_to_keep,
            evicting = surplus,
            metric = "quarry_retention_oldest_selected",
            "evicting oldest versions beyond keep count"
        );

        for version in &versions[..surplus] {
            match self.lifecycle.evict(coordinates, version).await {
                Ok(_) => {
                    outcome.add_success(format!("Evicted version {version} of project {coordinates}"));
                }
                Err(e) => {
                    outcome.add_error(format!(
                        "Failed to evict versions of project {coordinates}: {e}"
                    ));
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Evicts versions whose last recorded use predates the age cutoffs.
    ///
    /// Snapshot versions unused for `max_snapshot_age_days` and release
    /// versions unused for `max_version_age_days` are evicted. Eviction
    /// failures are isolated per candidate. When both metric queries come
    /// back empty, no version record is touched.
    ///
    /// # Errors
    ///
    /// Propagates metric query failures.
    pub async fn evict_least_recently_used(
        &self,
        max_snapshot_age_days: u32,
        max_version_age_days: u32,
    ) -> Result<OperationOutcome> {
        let now = Utc::now();
        let snapshot_cutoff = now - Duration::days(i64::from(max_snapshot_age_days));
        let release_cutoff = now - Duration::days(i64::from(max_version_age_days));

        let mut candidates = self
            .lifecycle
            .usage
            .find_snapshot_metrics_before(snapshot_cutoff)
            .await?;
        candidates.extend(
            self.lifecycle
                .usage
                .find_release_metrics_before(release_cutoff)
                .await?,
        );

        let mut outcome = OperationOutcome::new();
        for metric in candidates {
            match self
                .lifecycle
                .evict(&metric.coordinates, &metric.version)
                .await
            {
                Ok(_) => outcome.add_success(format!(
                    "Evicted version {} of project {}",
                    metric.version, metric.coordinates
                )),
                Err(e) => outcome.add_error(format!(
                    "Failed to evict version {} of project {}: {e}",
                    metric.version, metric.coordinates
                )),
            }
        }

        Ok(outcome)
    }

    /// Evicts versions that have never been used.
    ///
    /// For every project, any version record with no matching usage metric
    /// is "never used" and is evicted, unless the record is already evicted
    /// or marked excluded. Per-version failures are isolated. Projects with
    /// no unused versions contribute nothing to the outcome.
    ///
    /// # Errors
    ///
    /// Propagates project listing and per-project load failures.
    pub async fn evict_versions_not_used(&self) -> Result<OperationOutcome> {
        let mut outcome = OperationOutcome::new();

        for project in self.lifecycle.store.list_all_projects().await? {
            let coordinates = &project.coordinates;
            let records = self.lifecycle.store.find_all_versions(coordinates).await?;
            let metrics = self
                .lifecycle
                .usage
                .find_metrics_for_project(coordinates)
                .await?;

            for record in records.iter().filter(|r| r.is_retention_candidate()) {
                let used = metrics.iter().any(|m| m.version == record.version);
                if used {
                    continue;
                }

                match self.lifecycle.evict(coordinates, &record.version).await {
                    Ok(_) => outcome.add_success(format!(
                        "Evicted version {} of project {coordinates}",
                        record.version
                    )),
                    Err(e) => outcome.add_error(format!(
                        "Failed to evict version {} of project {coordinates}: {e}",
                        record.version
                    )),
                }
            }
        }

        Ok(outcome)
    }

    /// Deprecates versions the source-of-truth repository no longer has.
    ///
    /// For each reported mismatch, every version present only in the store
    /// is deprecated. Versions that cannot be resolved are skipped; other
    /// failures are isolated per version. An empty mismatch list (or
    /// mismatches with empty only-in-store lists) touches no version record.
    ///
    /// # Errors
    ///
    /// Propagates reconciliation query failures.
    pub async fn deprecate_versions_not_in_repository(&self) -> Result<OperationOutcome> {
        let mut outcome = OperationOutcome::new();

        for mismatch in self.reconciliation.find_version_mismatches().await? {
            for version in &mismatch.versions_only_in_store {
                match self.lifecycle.deprecate(&mismatch.coordinates, version).await {
                    Ok(record) => outcome.add_success(format!(
                        "Deprecated version {} of project {}",
                        record.version, mismatch.coordinates
                    )),
                    Err(e) if e.is_not_found() => {
                        tracing::debug!(
                            project = %mismatch.coordinates,
                            version = %version,
                            "skipping version no longer resolvable in the store"
                        );
                    }
                    Err(e) => outcome.add_error(format!(
                        "Failed to deprecate version {version} of project {}: {e}",
                        mismatch.coordinates
                    )),
                }
            }
        }

        Ok(outcome)
    }

    /// Runs every retention policy under the configured [`RetentionPolicy`].
    ///
    /// Phases run in order: count-based retention per project, least
    /// recently used, never used, reconciliation deprecation. Each phase is
    /// timed and logged; a phase-level failure is recorded as an outcome
    /// error without aborting later phases.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Policy` if the configured policy fails
    /// validation.
    pub async fn sweep(&self) -> Result<OperationOutcome> {
        if let Some(message) = self.policy.validate() {
            return Err(LifecycleError::Policy { message });
        }

        let start = Instant::now();
        let mut outcome = OperationOutcome::new();

        tracing::info!(
            versions_to_keep = self.policy.versions_to_keep,
            max_snapshot_age_days = self.policy.max_snapshot_age_days,
            max_release_age_days = self.policy.max_release_age_days,
            metric = "quarry_retention_sweep_started",
            "starting retention sweep"
        );

        self.run_phase(
            "oldest_versions",
            || async {
                let keep = self.policy.versions_to_keep as usize;
                let mut phase_outcome = OperationOutcome::new();
                for project in self.lifecycle.store.list_all_projects().await? {
                    phase_outcome.merge(
                        self.evict_oldest_project_versions(&project.coordinates, keep)
                            .await?,
                    );
                }
                Ok(phase_outcome)
            },
            &mut outcome,
        )
        .await;

        self.run_phase(
            "least_recently_used",
            || {
                self.evict_least_recently_used(
                    self.policy.max_snapshot_age_days,
                    self.policy.max_release_age_days,
                )
            },
            &mut outcome,
        )
        .await;

        self.run_phase("not_used", || self.evict_versions_not_used(), &mut outcome)
            .await;

        self.run_phase(
            "not_in_repository",
            || self.deprecate_versions_not_in_repository(),
            &mut outcome,
        )
        .await;

        tracing::info!(
            successes = outcome.successes().len(),
            errors = outcome.errors().len(),
            duration_secs = start.elapsed().as_secs_f64(),
            metric = "quarry_retention_sweep_completed",
            "retention sweep completed"
        );

        Ok(outcome)
    }

    async fn run_phase<F, Fut>(
        &self,
        phase: &'static str,
        f: F,
        outcome: &mut OperationOutcome,
    ) where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<OperationOutcome>>,
    {
        let phase_start = Instant::now();
        match f().await {
            Ok(phase_outcome) => {
                let duration_secs = phase_start.elapsed().as_secs_f64();
                tracing::info!(
                    phase,
                    successes = phase_outcome.successes().len(),
                    errors = phase_outcome.errors().len(),
                    duration_secs,
                    metric = "quarry_retention_phase_completed",
                    "retention phase completed"
                );

                crate::metrics::record_retention_phase(
                    phase,
                    phase_outcome.successes().len() as u64,
                    phase_outcome.errors().len() as u64,
                    duration_secs,
                );

                outcome.merge(phase_outcome);
            }
            Err(e) => {
                tracing::error!(
                    phase,
                    error = %e,
                    metric = "quarry_retention_errors_total",
                    "retention phase failed"
                );

                crate::metrics::record_retention_error(phase);

                outcome.add_error(format!("{phase}: {e}"));
            }
        }
    }
}
