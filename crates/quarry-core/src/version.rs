//! Version identifiers, classification, and ordering policy.
//!
//! A version identifier is either a **snapshot** (tied to a source-control
//! branch, named `"<branch>-SNAPSHOT"`) or a **release** (an immutable
//! semantic version such as `2.3.0`). Classification is a pure function of
//! the identifier's suffix.
//!
//! The precedence order used to rank a project's versions from oldest to
//! newest lives here as well, in a dedicated comparator
//! ([`compare_precedence`]) so retention logic never re-derives it ad hoc.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Reserved suffix marking branch-tracked snapshot versions.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Classification of a version identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    /// An immutable, semantically-versioned release.
    Release,
    /// A mutable version tracking a source-control branch.
    Snapshot,
}

/// A version identifier within a project.
///
/// # Example
///
/// ```rust
/// use quarry_core::version::{VersionId, VersionKind};
///
/// let release = VersionId::new("2.3.0");
/// assert_eq!(release.kind(), VersionKind::Release);
///
/// let snapshot = VersionId::for_branch("feature-x");
/// assert_eq!(snapshot.as_str(), "feature-x-SNAPSHOT");
/// assert!(snapshot.is_snapshot());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    /// Creates a version identifier from its string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the snapshot identifier for a source-control branch.
    #[must_use]
    pub fn for_branch(branch: &str) -> Self {
        Self(format!("{branch}{SNAPSHOT_SUFFIX}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the identifier by its suffix.
    #[must_use]
    pub fn kind(&self) -> VersionKind {
        if self.0.ends_with(SNAPSHOT_SUFFIX) {
            VersionKind::Snapshot
        } else {
            VersionKind::Release
        }
    }

    /// Returns true if the identifier names a snapshot version.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.kind() == VersionKind::Snapshot
    }

    /// Returns the branch name for a snapshot identifier, `None` for releases.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.0.strip_suffix(SNAPSHOT_SUFFIX)
    }

    /// Parses the identifier as a semantic release version.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidId` for snapshot identifiers and for strings
    /// that are not valid semantic versions.
    pub fn release(&self) -> Result<ReleaseVersion> {
        if self.is_snapshot() {
            return Err(Error::InvalidId {
                message: format!("'{}' is a snapshot, not a release version", self.0),
            });
        }
        self.0.parse()
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VersionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for VersionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A parsed semantic release version.
///
/// Precedence follows semantic-versioning rules: the numeric triple is
/// compared first; a version with a pre-release tag sorts before the same
/// triple without one; pre-release segments compare numerically when both
/// are numeric, lexically otherwise, and numeric segments sort before
/// alphanumeric ones. Build metadata (`+...`) is accepted and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Pre-release segments, empty for a full release.
    pre: Vec<PreSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PreSegment {
    Numeric(u64),
    Alpha(String),
}

impl Ord for PreSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Alpha(a), Self::Alpha(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Alpha(_)) => Ordering::Less,
            (Self::Alpha(_), Self::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for PreSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl ReleaseVersion {
    /// Returns true if this version carries a pre-release tag.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }
}

impl FromStr for ReleaseVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |detail: &str| Error::InvalidId {
            message: format!("invalid release version '{s}': {detail}"),
        };

        // Build metadata never participates in precedence.
        let without_build = s.split_once('+').map_or(s, |(v, _)| v);
        let (core, pre) = match without_build.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (without_build, None),
        };

        let mut parts = core.split('.');
        let mut component = |name: &str| -> Result<u64> {
            parts
                .next()
                .ok_or_else(|| invalid(&format!("missing {name} component")))?
                .parse()
                .map_err(|_| invalid(&format!("non-numeric {name} component")))
        };
        let major = component("major")?;
        let minor = component("minor")?;
        let patch = component("patch")?;
        if parts.next().is_some() {
            return Err(invalid("too many version components"));
        }

        let pre = match pre {
            None => Vec::new(),
            Some("") => return Err(invalid("empty pre-release tag")),
            Some(tag) => tag
                .split('.')
                .map(|segment| {
                    if segment.is_empty() {
                        return Err(invalid("empty pre-release segment"));
                    }
                    Ok(segment.parse::<u64>().map_or_else(
                        |_| PreSegment::Alpha(segment.to_string()),
                        PreSegment::Numeric,
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        };

        Ok(Self {
            major,
            minor,
            patch,
            pre,
        })
    }
}

impl Ord for ReleaseVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                // A pre-release sorts before the full release of the same triple.
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for ReleaseVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, segment) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            match segment {
                PreSegment::Numeric(n) => write!(f, "{n}")?,
                PreSegment::Alpha(a) => f.write_str(a)?,
            }
        }
        Ok(())
    }
}

/// Total precedence order over version identifiers, oldest first.
///
/// Releases are ranked by semantic-version precedence. Snapshot identifiers
/// rank after every release (a branch head is always the newest state of its
/// line) and lexically among themselves. Releases that fail to parse fall
/// back to lexical order so the comparator stays total.
#[must_use]
pub fn compare_precedence(a: &VersionId, b: &VersionId) -> Ordering {
    match (a.kind(), b.kind()) {
        (VersionKind::Release, VersionKind::Release) => match (a.release(), b.release()) {
            (Ok(left), Ok(right)) => left.cmp(&right),
            _ => a.as_str().cmp(b.as_str()),
        },
        (VersionKind::Release, VersionKind::Snapshot) => Ordering::Less,
        (VersionKind::Snapshot, VersionKind::Release) => Ordering::Greater,
        (VersionKind::Snapshot, VersionKind::Snapshot) => a.as_str().cmp(b.as_str()),
    }
}
