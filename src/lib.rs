//! `DbKeeper` - a process-wide database connection registry
//!
//! One configuration/retry-state object per process: an eagerly opened
//! primary connection whose failure is deferred rather than fatal, and a
//! retrying factory for fresh connections.

#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    missing_docs,
    rust_2018_idioms
)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

/// Configuration management for DbKeeper
pub mod config;
pub mod connector;
/// Error taxonomy for connection management
pub mod errors;
pub mod registry;
pub mod retry;

pub use config::{Config, DatabaseConfig, RetryConfig};
pub use connector::{Connector, ManagedConnection, PgConnector, PgHandle};
pub use errors::ConnectError;
pub use registry::Registry;
pub use retry::{RetryBudget, RetryPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
