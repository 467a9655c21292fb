//! Telemetry metric name constants.
//!
//! Centralised metric names for tldw operations. Consumers install their own
//! `metrics` recorder (e.g. prometheus, statsd); without a recorder installed,
//! all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `tldw_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider`: provider type (e.g. "openai", "gemini")
//! - `operation`: adapter call (e.g. "summarize", "test_connection")
//! - `status`: "ok" or "error"

/// Total adapter requests issued by the summarization pipeline.
///
/// Labels: `provider`, `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "tldw_requests_total";

/// Adapter request duration in seconds.
///
/// Labels: `provider`, `operation`.
pub const REQUEST_DURATION_SECONDS: &str = "tldw_request_duration_seconds";

/// Total settings writes that failed and were reported as notices.
pub const PERSIST_FAILURES_TOTAL: &str = "tldw_settings_persist_failures_total";

/// Total legacy settings blobs converted to the multi-provider schema.
pub const MIGRATIONS_TOTAL: &str = "tldw_settings_migrations_total";
