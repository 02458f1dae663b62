//! Observability infrastructure for Quarry.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors shared by all components.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `quarry_lifecycle=debug`)
///
/// # Example
///
/// ```rust
/// use quarry_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for a lifecycle operation with standard fields.
///
/// # Example
///
/// ```rust
/// use quarry_core::observability::lifecycle_span;
///
/// let span = lifecycle_span("evict", "org.example:server", "2.0.0");
/// let _guard = span.enter();
/// // ... perform the operation
/// ```
#[must_use]
pub fn lifecycle_span(operation: &str, project: &str, version: &str) -> Span {
    tracing::info_span!(
        "lifecycle",
        op = operation,
        project = project,
        version = version,
    )
}

/// Creates a span for a retention policy run.
#[must_use]
pub fn retention_span(policy: &str) -> Span {
    tracing::info_span!("retention", policy = policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn span_helpers_create_spans() {
        let span = lifecycle_span("evict", "org.example:server", "1.0.0");
        let _guard = span.enter();
        tracing::info!("message in span");

        let span = retention_span("least_recently_used");
        let _guard = span.enter();
        tracing::info!("message in span");
    }
}
