//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, `audit` target for audit records)
//!     → metrics.rs (counters, gauges)
//!     → tracing.rs (one span per transport request with a request ID)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON or pretty)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metric updates are cheap; recording never fails the request
//! - Request ID flows through every event of one pipeline run
//! - Without an installed recorder the metric calls are no-ops

pub mod logging;
pub mod metrics;
pub mod tracing;
