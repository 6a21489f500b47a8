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

//! Environment-backed configuration for the HealthTrack services.
//!
//! Layout: `model.rs` (typed config models), `validate.rs` (parsing
//! helpers), `loader.rs` (environment loading), `defaults.rs` (fallback
//! values).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_from_env, load_with};
pub use model::{AlertConfig, AppConfig, TelemetryConfig};
