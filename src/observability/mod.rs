//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Binding and dispatch produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (route, request and failure counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log events and response headers
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
