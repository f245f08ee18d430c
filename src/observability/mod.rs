//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Bootstrap run produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (bind attempt counters, serving gauge)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Log level configurable via config, `RUST_LOG` wins when set
//! - Metrics are cheap and recorded even when no exporter is installed

pub mod logging;
pub mod metrics;
