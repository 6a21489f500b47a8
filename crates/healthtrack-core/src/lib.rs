#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Core monitoring domain types, the health classifier, and the metrics
//! aggregation pipeline shared across the workspace.
//!
//! Layout: `model.rs` (services, checks, summaries), `classify.rs` (the
//! qualitative health policy), `metrics.rs` (windowed aggregation), and
//! `service.rs` (the prober/workflow trait seams).

pub mod classify;
pub mod metrics;
pub mod model;
pub mod service;

pub use classify::{HealthState, classify};
pub use metrics::{DEFAULT_APDEX_THRESHOLD_MS, METRICS_WINDOW, summarize};
pub use model::{CheckOutcome, CheckRecord, MetricsSummary, NewService, Service};
pub use service::{HealthProbe, MonitorWorkflow};
