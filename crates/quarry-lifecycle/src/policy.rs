//! Retention policy configuration.

use serde::{Deserialize, Serialize};

/// Retention policy for a repository's versions.
///
/// Controls how many versions each project keeps materialized and how long
/// unused versions survive before the retention sweep evicts them. Sensible
/// defaults are provided for typical workloads.
///
/// # Example
///
/// ```rust
/// use quarry_lifecycle::RetentionPolicy;
///
/// // Use defaults
/// let policy = RetentionPolicy::default();
///
/// // Or customize
/// let policy = RetentionPolicy {
///     versions_to_keep: 20,
///     max_snapshot_age_days: 14,
///     max_release_age_days: 180,
/// };
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPolicy {
    /// Keep the newest N versions per project (e.g. 10).
    ///
    /// Older versions are eviction candidates for the count-based phase.
    pub versions_to_keep: u32,

    /// Snapshot versions unused for this many days are evicted (e.g. 30).
    ///
    /// Snapshots track moving branches and go stale quickly.
    pub max_snapshot_age_days: u32,

    /// Release versions unused for this many days are evicted (e.g. 365).
    ///
    /// Releases are immutable and kept much longer than snapshots.
    pub max_release_age_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            versions_to_keep: 10,
            max_snapshot_age_days: 30,
            max_release_age_days: 365,
        }
    }
}

impl RetentionPolicy {
    /// Creates a new retention policy with the specified values.
    #[must_use]
    pub const fn new(
        versions_to_keep: u32,
        max_snapshot_age_days: u32,
        max_release_age_days: u32,
    ) -> Self {
        Self {
            versions_to_keep,
            max_snapshot_age_days,
            max_release_age_days,
        }
    }

    /// Creates a policy suitable for development/testing with short retention.
    ///
    /// - Keep 3 versions
    /// - 2 day snapshot age
    /// - 14 day release age
    #[must_use]
    pub const fn development() -> Self {
        Self {
            versions_to_keep: 3,
            max_snapshot_age_days: 2,
            max_release_age_days: 14,
        }
    }

    /// Creates an aggressive policy for cost-sensitive repositories.
    ///
    /// - Keep 5 versions
    /// - 7 day snapshot age
    /// - 90 day release age
    #[must_use]
    pub const fn aggressive() -> Self {
        Self {
            versions_to_keep: 5,
            max_snapshot_age_days: 7,
            max_release_age_days: 90,
        }
    }

    /// Creates a conservative policy for compliance-heavy repositories.
    ///
    /// - Keep 50 versions
    /// - 90 day snapshot age
    /// - 730 day release age
    #[must_use]
    pub const fn conservative() -> Self {
        Self {
            versions_to_keep: 50,
            max_snapshot_age_days: 90,
            max_release_age_days: 730,
        }
    }

    /// Validates the policy settings are reasonable.
    ///
    /// Returns an error message if validation fails.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if self.versions_to_keep == 0 {
            return Some("versions_to_keep must be at least 1".to_string());
        }
        if self.max_snapshot_age_days == 0 {
            return Some("max_snapshot_age_days must be at least 1".to_string());
        }
        if self.max_release_age_days == 0 {
            return Some("max_release_age_days must be at least 1".to_string());
        }
        if self.max_snapshot_age_days > self.max_release_age_days {
            return Some(format!(
                "max_snapshot_age_days ({}) cannot exceed max_release_age_days ({})",
                self.max_snapshot_age_days, self.max_release_age_days
            ));
        }
        None
    }
}
