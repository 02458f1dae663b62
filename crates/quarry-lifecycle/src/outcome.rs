//! Batch operation outcome aggregation.

use serde::{Deserialize, Serialize};

/// Accumulated result of a batch-shaped operation.
///
/// Every batch policy returns one of these so partial failure in a large
/// batch does not abort the whole batch. A result without errors means the
/// batch ran to completion; a result with errors means at least one failure
/// occurred and the messages carry the partial-success detail. Treat the
/// outcome as immutable once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    successes: Vec<String>,
    errors: Vec<String>,
}

impl OperationOutcome {
    /// Creates an empty outcome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a success message.
    pub fn add_success(&mut self, message: impl Into<String>) {
        self.successes.push(message.into());
    }

    /// Appends an error message.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Returns the success messages in the order they were recorded.
    #[must_use]
    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    /// Returns the error messages in the order they were recorded.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns true iff the error list is non-empty.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if nothing was recorded at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.errors.is_empty()
    }

    /// Merges another outcome into this one, preserving message order.
    pub fn merge(&mut self, other: Self) {
        self.successes.extend(other.successes);
        self.errors.extend(other.errors);
    }
}
