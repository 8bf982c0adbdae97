//! The process-wide connection registry
//!
//! Exactly one configuration/retry-state object exists per process. The
//! registry eagerly opens one primary connection at construction; an
//! open failure there is recorded, not propagated, and surfaces on use
//! of the primary instead. Fresh connections come from
//! [`Registry::get_connection`], the retrying factory, and are owned by
//! the caller. The singleton constrains the configuration and retry
//! state, not the number of simultaneously open connections.

use crate::config::Config;
use crate::connector::{Connector, ManagedConnection, PgConnector};
use crate::errors::ConnectError;
use crate::retry::RetryPolicy;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

/// State of the eagerly opened primary connection
#[derive(Debug)]
enum PrimarySlot<H> {
    /// Opened at construction and still held
    Ready(H),
    /// The construction-time open failed; detail kept for surfacing
    Deferred(String),
    /// Closed and released
    Closed,
}

/// The process-wide connection registry
///
/// Construct with [`Registry::connect`] and pass the instance to
/// whichever component needs it, or use [`Registry::init_global`] for
/// the one-per-process accessor.
pub struct Registry<C: Connector = PgConnector> {
    config: Config,
    connector: C,
    policy: RetryPolicy,
    primary: Mutex<PrimarySlot<C::Handle>>,
    attempts_spent: AtomicU32,
}

static GLOBAL: OnceCell<Registry<PgConnector>> = OnceCell::const_new();

impl Registry<PgConnector> {
    /// Build the process-wide instance on the first call
    ///
    /// Later calls return the same instance and ignore their argument.
    pub async fn init_global(config: Config) -> &'static Self {
        GLOBAL
            .get_or_init(|| async { Self::connect(config, PgConnector::new()).await })
            .await
    }

    /// The process-wide instance, if [`Registry::init_global`] has run
    pub fn global() -> Option<&'static Self> {
        GLOBAL.get()
    }
}

impl<C: Connector> Registry<C> {
    /// Create a registry and eagerly open the primary connection
    ///
    /// Never fails: a failed primary open is recorded and surfaced by
    /// [`Registry::ensure_primary`], so callers relying on lazy
    /// reconnection still get a working registry.
    pub async fn connect(config: Config, connector: C) -> Self {
        let policy = RetryPolicy::from_config(&config.retry);

        let primary = match connector.open(&config.database).await {
            Ok(handle) => {
                info!("primary database connection established");
                PrimarySlot::Ready(handle)
            }
            Err(e) => {
                warn!(error = %e, "primary database connection failed, continuing without it");
                PrimarySlot::Deferred(e.to_string())
            }
        };

        Self {
            config,
            connector,
            policy,
            primary: Mutex::new(primary),
            attempts_spent: AtomicU32::new(0),
        }
    }

    /// The configuration this registry was built with
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The retry policy in effect
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// The connector opening this registry's connections
    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Attempts already spent from a shared budget
    #[must_use]
    pub fn attempts_spent(&self) -> u32 {
        self.attempts_spent.load(Ordering::SeqCst)
    }

    /// Open a fresh connection, retrying per the configured policy
    ///
    /// The returned handle is owned by the caller and released on drop.
    pub async fn get_connection(&self) -> Result<C::Handle, ConnectError> {
        self.policy
            .open_with_retry(&self.connector, &self.config.database, &self.attempts_spent)
            .await
    }

    /// Whether the primary connection is currently open
    pub async fn primary_is_open(&self) -> bool {
        matches!(&*self.primary.lock().await, PrimarySlot::Ready(h) if h.is_open())
    }

    /// Fail if the primary connection is not available
    ///
    /// A deferred construction failure stays deferred: every call
    /// reports it until the process decides how to recover.
    pub async fn ensure_primary(&self) -> Result<(), ConnectError> {
        match &*self.primary.lock().await {
            PrimarySlot::Ready(_) => Ok(()),
            PrimarySlot::Deferred(details) => Err(ConnectError::PrimaryUnavailable {
                details: details.clone(),
            }),
            PrimarySlot::Closed => Err(ConnectError::PrimaryUnavailable {
                details: "primary connection closed".to_string(),
            }),
        }
    }

    /// Close and release the primary connection
    ///
    /// Idempotent: the handle is closed exactly once, and calling this
    /// when no primary was ever opened is a no-op.
    pub async fn close_primary(&self) {
        let mut slot = self.primary.lock().await;
        if let PrimarySlot::Ready(handle) = &mut *slot {
            handle.close();
            *slot = PrimarySlot::Closed;
            info!("primary database connection closed");
        }
    }
}
