//! Project identity: coordinate newtypes and the project record.
//!
//! A project is the `(group, artifact)` unit that owns versions. Coordinate
//! segments are validated at the boundary so everything downstream can treat
//! them as well-formed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::id::ProjectId;
use crate::version::VersionId;

/// Maximum length of a coordinate segment.
const MAX_SEGMENT_LEN: usize = 200;

/// The group portion of a project's coordinates (e.g. `org.example`).
///
/// Group IDs must be:
/// - Non-empty, at most 200 characters
/// - Lowercase alphanumeric with dots, hyphens, and underscores
/// - Not starting or ending with a separator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

/// The artifact portion of a project's coordinates (e.g. `metadata-server`).
///
/// Same format rules as [`GroupId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

fn validate_segment(kind: &'static str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidId {
            message: format!("{kind} cannot be empty"),
        });
    }

    if id.len() > MAX_SEGMENT_LEN {
        return Err(Error::InvalidId {
            message: format!("{kind} '{id}' is too long (maximum {MAX_SEGMENT_LEN} characters)"),
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '_'))
    {
        return Err(Error::InvalidId {
            message: format!(
                "{kind} '{id}' contains invalid characters (only lowercase letters, digits, dots, hyphens, and underscores allowed)"
            ),
        });
    }

    if id.starts_with(['.', '-', '_']) || id.ends_with(['.', '-', '_']) {
        return Err(Error::InvalidId {
            message: format!("{kind} '{id}' cannot start or end with a separator"),
        });
    }

    Ok(())
}

impl GroupId {
    /// Creates a new group ID after validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the group ID is invalid.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_segment("group ID", &id)?;
        Ok(Self(id))
    }

    /// Creates a group ID without validation.
    ///
    /// Intended for IDs that have already been validated (e.g. loaded from
    /// the metadata store).
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the group ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ArtifactId {
    /// Creates a new artifact ID after validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact ID is invalid.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_segment("artifact ID", &id)?;
        Ok(Self(id))
    }

    /// Creates an artifact ID without validation.
    ///
    /// Intended for IDs that have already been validated (e.g. loaded from
    /// the metadata store).
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the artifact ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ArtifactId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The `(group, artifact)` pair identifying a project.
///
/// # Example
///
/// ```rust
/// use quarry_core::project::ProjectCoordinates;
///
/// let coords = ProjectCoordinates::new("org.example", "metadata-server").unwrap();
/// assert_eq!(coords.to_string(), "org.example:metadata-server");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCoordinates {
    /// Group portion of the coordinates.
    pub group_id: GroupId,
    /// Artifact portion of the coordinates.
    pub artifact_id: ArtifactId,
}

impl ProjectCoordinates {
    /// Creates coordinates after validating both segments.
    ///
    /// # Errors
    ///
    /// Returns an error if either segment is invalid.
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            group_id: GroupId::new(group_id)?,
            artifact_id: ArtifactId::new(artifact_id)?,
        })
    }

    /// Creates coordinates without validation.
    #[must_use]
    pub fn new_unchecked(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: GroupId::new_unchecked(group_id),
            artifact_id: ArtifactId::new_unchecked(artifact_id),
        }
    }
}

impl fmt::Display for ProjectCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// A project record: coordinates plus configuration.
///
/// The configured default branch determines the project's protected
/// default-branch snapshot identifier, which automated snapshot deletion
/// must never remove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Generated identifier for the project record.
    pub id: ProjectId,
    /// The project's coordinates.
    pub coordinates: ProjectCoordinates,
    /// Source-control branch the canonical snapshot tracks.
    pub default_branch: String,
}

impl Project {
    /// Creates a new project record with a generated ID.
    #[must_use]
    pub fn new(coordinates: ProjectCoordinates, default_branch: impl Into<String>) -> Self {
        Self {
            id: ProjectId::generate(),
            coordinates,
            default_branch: default_branch.into(),
        }
    }

    /// Returns the protected default-branch snapshot identifier.
    #[must_use]
    pub fn default_snapshot(&self) -> VersionId {
        VersionId::for_branch(&self.default_branch)
    }
}
