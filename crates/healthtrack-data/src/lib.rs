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

//! Shared data access layer for HealthTrack: migrations and the repository
//! for monitored services and their check history.

pub mod error;
pub mod store;

pub use error::{DataError, Result as DataResult};
pub use store::MonitorStore;
