//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router and host server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through tracing spans of the host server
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
