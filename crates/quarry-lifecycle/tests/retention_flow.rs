//! Retention policy flows, failure-isolation semantics, and the sweep.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use quarry_core::prelude::*;
use quarry_lifecycle::prelude::*;

struct World {
    store: Arc<MemoryMetadataStore>,
    usage: Arc<MemoryUsageMetrics>,
    reconciliation: Arc<MemoryReconciliation>,
    engine: RetentionEngine,
}

fn coords(artifact: &str) -> ProjectCoordinates {
    ProjectCoordinates::new("org.example", artifact).expect("valid coordinates")
}

fn world(policy: RetentionPolicy) -> World {
    let store = Arc::new(MemoryMetadataStore::new());
    let usage = Arc::new(MemoryUsageMetrics::new());
    let reconciliation = Arc::new(MemoryReconciliation::new());
    let lifecycle = Lifecycle::new(
        Arc::clone(&store) as Arc<dyn MetadataStore>,
        Arc::clone(&usage) as Arc<dyn UsageMetricsStore>,
        Arc::new(HandlerRegistry::new()),
    );
    let engine = RetentionEngine::new(
        lifecycle,
        Arc::clone(&reconciliation) as Arc<dyn ReconciliationSource>,
        policy,
    );
    World {
        store,
        usage,
        reconciliation,
        engine,
    }
}

fn seed(world: &World, artifact: &str, versions: &[&str]) {
    world
        .store
        .insert_project(Project::new(coords(artifact), "master"));
    for v in versions {
        world
            .store
            .insert_version(VersionRecord::new(coords(artifact), VersionId::new(*v)));
    }
}

async fn evicted(world: &World, artifact: &str, version: &str) -> bool {
    world
        .store
        .find_version(&coords(artifact), &VersionId::new(version))
        .await
        .expect("find")
        .expect("record")
        .evicted
}

#[tokio::test]
async fn count_policy_abort_vs_per_item_isolation() {
    // The count-based policy stops at the first failure; the LRU policy
    // keeps going. Same injected failure, different boundary.
    let w = world(RetentionPolicy::default());
    seed(&w, "count", &["1.0.0", "1.1.0", "1.2.0", "1.3.0"]);
    seed(&w, "lru", &["a-SNAPSHOT", "b-SNAPSHOT"]);
    let stale = Utc::now() - Duration::days(60);
    for v in ["a-SNAPSHOT", "b-SNAPSHOT"] {
        w.usage
            .record_usage(UsageMetric::new(coords("lru"), VersionId::new(v), stale))
            .await
            .expect("record");
    }
    w.store.inject_upsert_failure(VersionId::new("1.1.0"));
    w.store.inject_upsert_failure(VersionId::new("a-SNAPSHOT"));

    let count_outcome = w
        .engine
        .evict_oldest_project_versions(&coords("count"), 1)
        .await
        .expect("count policy");
    assert_eq!(count_outcome.successes().len(), 1);
    assert_eq!(count_outcome.errors().len(), 1);
    // 1.2.0 sits behind the failing 1.1.0 and was never attempted.
    assert!(evicted(&w, "count", "1.0.0").await);
    assert!(!evicted(&w, "count", "1.1.0").await);
    assert!(!evicted(&w, "count", "1.2.0").await);

    let lru_outcome = w
        .engine
        .evict_least_recently_used(30, 365)
        .await
        .expect("lru policy");
    assert_eq!(lru_outcome.errors().len(), 1);
    assert_eq!(lru_outcome.successes().len(), 1);
    // The candidate after the failing one was still processed.
    assert!(!evicted(&w, "lru", "a-SNAPSHOT").await);
    assert!(evicted(&w, "lru", "b-SNAPSHOT").await);
}

#[tokio::test]
async fn count_policy_threshold_and_noop() {
    let w = world(RetentionPolicy::default());
    seed(&w, "server", &["2.0.0", "2.2.0", "2.3.0"]);

    let outcome = w
        .engine
        .evict_oldest_project_versions(&coords("server"), 1)
        .await
        .expect("policy");
    assert_eq!(outcome.successes().len(), 2);
    assert!(evicted(&w, "server", "2.0.0").await);
    assert!(evicted(&w, "server", "2.2.0").await);
    assert!(!evicted(&w, "server", "2.3.0").await);

    // keep >= len touches no record at all.
    w.store.clear_operations();
    let outcome = w
        .engine
        .evict_oldest_project_versions(&coords("server"), 3)
        .await
        .expect("policy");
    assert!(outcome.is_empty());
    assert_eq!(w.store.operation_count("find_version"), 0);
    assert_eq!(w.store.operation_count("upsert_version"), 0);
}

#[tokio::test]
async fn count_policy_never_counts_below_zero() {
    let w = world(RetentionPolicy::default());
    seed(&w, "tiny", &["1.0.0"]);

    let outcome = w
        .engine
        .evict_oldest_project_versions(&coords("tiny"), 10)
        .await
        .expect("policy");
    assert!(outcome.is_empty());
    assert!(!evicted(&w, "tiny", "1.0.0").await);
}

#[tokio::test]
async fn lru_cutoffs_are_independent_per_kind() {
    let w = world(RetentionPolicy::default());
    seed(&w, "server", &["old-SNAPSHOT", "1.0.0", "2.0.0"]);
    let now = Utc::now();
    // Snapshot idle 40 days: past the 30-day snapshot cutoff.
    w.usage
        .record_usage(UsageMetric::new(
            coords("server"),
            VersionId::new("old-SNAPSHOT"),
            now - Duration::days(40),
        ))
        .await
        .expect("record");
    // Release idle 40 days: well inside the 365-day release cutoff.
    w.usage
        .record_usage(UsageMetric::new(
            coords("server"),
            VersionId::new("1.0.0"),
            now - Duration::days(40),
        ))
        .await
        .expect("record");
    // Release idle 400 days: past the release cutoff.
    w.usage
        .record_usage(UsageMetric::new(
            coords("server"),
            VersionId::new("2.0.0"),
            now - Duration::days(400),
        ))
        .await
        .expect("record");

    let outcome = w
        .engine
        .evict_least_recently_used(30, 365)
        .await
        .expect("policy");

    assert!(!outcome.has_errors());
    assert_eq!(outcome.successes().len(), 2);
    assert!(evicted(&w, "server", "old-SNAPSHOT").await);
    assert!(!evicted(&w, "server", "1.0.0").await);
    assert!(evicted(&w, "server", "2.0.0").await);
}

#[tokio::test]
async fn not_used_spans_projects_and_respects_exclusions() {
    let w = world(RetentionPolicy::default());
    seed(&w, "alpha", &["1.0.0"]);
    seed(&w, "beta", &["2.0.0", "3.0.0"]);
    w.store.insert_version(
        VersionRecord::new(coords("beta"), VersionId::new("4.0.0")).with_excluded(true),
    );
    w.usage
        .record_usage(UsageMetric::new(
            coords("beta"),
            VersionId::new("2.0.0"),
            Utc::now(),
        ))
        .await
        .expect("record");

    let outcome = w.engine.evict_versions_not_used().await.expect("policy");

    assert!(!outcome.has_errors());
    assert_eq!(outcome.successes().len(), 2);
    assert!(evicted(&w, "alpha", "1.0.0").await);
    assert!(!evicted(&w, "beta", "2.0.0").await);
    assert!(evicted(&w, "beta", "3.0.0").await);
    assert!(!evicted(&w, "beta", "4.0.0").await);
}

#[tokio::test]
async fn reconciliation_deprecation_leaves_eviction_alone() {
    let w = world(RetentionPolicy::default());
    seed(&w, "server", &["2.0.0"]);
    w.reconciliation.push_mismatch(VersionMismatch::new(
        ProjectId::generate(),
        coords("server"),
        vec![VersionId::new("2.0.0")],
        Vec::new(),
    ));

    let outcome = w
        .engine
        .deprecate_versions_not_in_repository()
        .await
        .expect("policy");
    assert_eq!(outcome.successes().len(), 1);

    let record = w
        .store
        .find_version(&coords("server"), &VersionId::new("2.0.0"))
        .await
        .expect("find")
        .expect("record");
    assert!(record.data.deprecated);
    assert!(!record.evicted);
}

/// Reconciliation source that always fails, for phase-isolation tests.
struct BrokenReconciliation;

#[async_trait]
impl ReconciliationSource for BrokenReconciliation {
    async fn find_version_mismatches(&self) -> quarry_core::Result<Vec<VersionMismatch>> {
        Err(quarry_core::Error::store("reconciliation backend offline"))
    }
}

#[tokio::test]
async fn sweep_survives_a_failing_phase() {
    let store = Arc::new(MemoryMetadataStore::new());
    let usage = Arc::new(MemoryUsageMetrics::new());
    let lifecycle = Lifecycle::new(
        Arc::clone(&store) as Arc<dyn MetadataStore>,
        Arc::clone(&usage) as Arc<dyn UsageMetricsStore>,
        Arc::new(HandlerRegistry::new()),
    );
    let engine = RetentionEngine::new(
        lifecycle,
        Arc::new(BrokenReconciliation),
        RetentionPolicy::new(1, 30, 365),
    );

    store.insert_project(Project::new(coords("server"), "master"));
    for v in ["1.0.0", "2.0.0"] {
        store.insert_version(VersionRecord::new(coords("server"), VersionId::new(v)));
    }
    // Keep the survivor out of the not-used phase.
    usage
        .record_usage(UsageMetric::new(
            coords("server"),
            VersionId::new("2.0.0"),
            Utc::now(),
        ))
        .await
        .expect("record");

    let outcome = engine.sweep().await.expect("sweep");

    // Earlier phases did their work...
    assert_eq!(outcome.successes().len(), 1);
    let record = store
        .find_version(&coords("server"), &VersionId::new("1.0.0"))
        .await
        .expect("find")
        .expect("record");
    assert!(record.evicted);

    // ...and the broken reconciliation phase surfaced as one error.
    assert!(outcome.has_errors());
    assert_eq!(outcome.errors().len(), 1);
    assert!(outcome.errors()[0].contains("not_in_repository"));
    assert!(outcome.errors()[0].contains("reconciliation backend offline"));
}

#[tokio::test]
async fn sweep_on_empty_store_is_empty_success() {
    let w = world(RetentionPolicy::default());
    let outcome = w.engine.sweep().await.expect("sweep");
    assert!(outcome.is_empty());
    assert!(!outcome.has_errors());
}
