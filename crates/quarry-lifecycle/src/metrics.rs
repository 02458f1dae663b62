//! Lifecycle and retention metrics.
//!
//! These metrics complement the structured logging already emitted by the
//! engine and follow Prometheus naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram};

// ============================================================================
// Lifecycle Metrics
// ============================================================================

/// Lifecycle operations counter (labelled by operation).
pub const LIFECYCLE_OPERATIONS: &str = "quarry_lifecycle_operations_total";

// ============================================================================
// Retention Metrics
// ============================================================================

/// Retention successes counter (labelled by phase).
pub const RETENTION_SUCCESSES: &str = "quarry_retention_successes_total";

/// Retention errors counter (labelled by phase).
pub const RETENTION_ERRORS: &str = "quarry_retention_errors_total";

/// Retention phase duration histogram.
pub const RETENTION_PHASE_DURATION: &str = "quarry_retention_phase_duration_seconds";

// ============================================================================
// Metric Registration
// ============================================================================

/// Registers all engine metric descriptions.
///
/// Call this once at application startup after initializing the metrics
/// recorder.
pub fn register_metrics() {
    describe_counter!(
        LIFECYCLE_OPERATIONS,
        "Total lifecycle operations performed, by operation"
    );
    describe_counter!(
        RETENTION_SUCCESSES,
        "Total versions successfully processed by retention, by phase"
    );
    describe_counter!(RETENTION_ERRORS, "Total retention errors, by phase");
    describe_histogram!(
        RETENTION_PHASE_DURATION,
        "Duration of retention phases in seconds"
    );
}

// ============================================================================
// Recording Helpers
// ============================================================================

/// Records a completed lifecycle operation.
pub fn record_lifecycle_operation(operation: &str) {
    counter!(LIFECYCLE_OPERATIONS, "operation" => operation.to_string()).increment(1);
}

/// Records retention phase completion metrics.
pub fn record_retention_phase(phase: &str, successes: u64, errors: u64, duration_secs: f64) {
    let labels = [("phase", phase.to_string())];

    counter!(RETENTION_SUCCESSES, &labels).increment(successes);
    counter!(RETENTION_ERRORS, &labels).increment(errors);
    histogram!(RETENTION_PHASE_DURATION, &labels).record(duration_secs);
}

/// Records a retention phase failure.
pub fn record_retention_error(phase: &str) {
    counter!(RETENTION_ERRORS, "phase" => phase.to_string()).increment(1);
}
