//! The seam to the underlying database client
//!
//! [`Connector`] opens sessions from a stored configuration and
//! [`ManagedConnection`] is what the registry hands out and tears down.
//! The production implementation speaks to `PostgreSQL` through
//! tokio-postgres; tests substitute a scripted connector.

use crate::config::DatabaseConfig;
use crate::errors::ConnectError;
use std::future::Future;
use tokio_postgres::NoTls;
use tracing::{debug, warn};

/// Opens new database connections from a stored configuration
pub trait Connector: Send + Sync {
    /// The handle type produced by this connector
    type Handle: ManagedConnection;

    /// Open a fresh connection
    fn open(
        &self,
        config: &DatabaseConfig,
    ) -> impl Future<Output = Result<Self::Handle, ConnectError>> + Send;
}

/// A connection handle owned by exactly one caller
///
/// Dropping a handle releases the session; `close` does the same
/// explicitly and further calls are no-ops.
pub trait ManagedConnection: Send {
    /// Whether the session currently reports open
    fn is_open(&self) -> bool;

    /// Close the session
    fn close(&mut self);
}

/// Production connector backed by tokio-postgres
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector;

impl PgConnector {
    /// Create a new `PostgreSQL` connector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Connector for PgConnector {
    type Handle = PgHandle;

    async fn open(&self, config: &DatabaseConfig) -> Result<PgHandle, ConnectError> {
        debug!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            user = %config.user,
            "opening database connection"
        );

        let (client, connection) = tokio_postgres::connect(&config.connection_string(), NoTls)
            .await
            .map_err(|e| ConnectError::Attempt {
                details: e.to_string(),
            })?;

        // The driver future must be polled for the client to make progress.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("connection task ended with error: {}", e);
            }
        });

        Ok(PgHandle {
            client: Some(client),
        })
    }
}

/// An open `PostgreSQL` session
#[derive(Debug)]
pub struct PgHandle {
    client: Option<tokio_postgres::Client>,
}

impl PgHandle {
    /// Run a single-row query and return its first column as text
    ///
    /// Demonstration surface only; anything beyond a scalar probe
    /// belongs to the client library itself.
    pub async fn query_scalar(&self, sql: &str) -> Result<String, ConnectError> {
        let client = self.client.as_ref().ok_or_else(|| ConnectError::Query {
            details: "connection is closed".to_string(),
        })?;

        let row = client
            .query_one(sql, &[])
            .await
            .map_err(|e| ConnectError::Query {
                details: e.to_string(),
            })?;

        row.try_get::<_, String>(0).map_err(|e| ConnectError::Query {
            details: e.to_string(),
        })
    }
}

impl ManagedConnection for PgHandle {
    fn is_open(&self) -> bool {
        self.client.as_ref().is_some_and(|c| !c.is_closed())
    }

    fn close(&mut self) {
        // Dropping the client terminates the session; the spawned driver
        // task drains and exits on its own.
        if self.client.take().is_some() {
            debug!("database connection closed");
        }
    }
}

impl Drop for PgHandle {
    fn drop(&mut self) {
        self.close();
    }
}
