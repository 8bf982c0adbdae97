//! Bounded retry for opening connections
//!
//! Each attempt opens a session and confirms it actually reports open;
//! a failure on either count spends one unit of the attempt budget and
//! is followed by a fixed delay, the final failed attempt included.
//! The budget either resets on every call or persists for the life of
//! the registry, depending on [`RetryBudget`].

use crate::config::{DatabaseConfig, RetryConfig};
use crate::connector::{Connector, ManagedConnection};
use crate::errors::ConnectError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Scope of the attempt budget for the connection factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryBudget {
    /// Every call starts with a fresh budget
    #[default]
    PerCall,

    /// One budget for the life of the registry; spent attempts are
    /// never returned, so the budget is exhaustible across calls
    Shared,
}

/// Retry policy for the connection factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of open attempts
    pub max_attempts: u32,

    /// Fixed delay after each failed attempt
    pub delay: Duration,

    /// Budget scope
    pub budget: RetryBudget,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(1000),
            budget: RetryBudget::PerCall,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of attempts
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the fixed delay between attempts
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the budget scope
    #[must_use]
    pub const fn with_budget(mut self, budget: RetryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Build a policy from configuration
    #[must_use]
    pub const fn from_config(retry: &RetryConfig) -> Self {
        Self {
            max_attempts: retry.max_attempts,
            delay: Duration::from_millis(retry.delay_ms),
            budget: if retry.shared_budget {
                RetryBudget::Shared
            } else {
                RetryBudget::PerCall
            },
        }
    }

    /// Open a connection, retrying failed attempts until the budget is spent
    ///
    /// `spent` is the registry-owned counter consulted when the budget
    /// is shared; success leaves it wherever it reached.
    pub(crate) async fn open_with_retry<C: Connector>(
        &self,
        connector: &C,
        config: &DatabaseConfig,
        spent: &AtomicU32,
    ) -> Result<C::Handle, ConnectError> {
        let mut local_spent = 0u32;

        loop {
            let used = match self.budget {
                RetryBudget::PerCall => local_spent,
                RetryBudget::Shared => spent.load(Ordering::SeqCst),
            };

            if used >= self.max_attempts {
                warn!(attempts = used, "connection retry budget exhausted");
                return Err(ConnectError::RetryExhausted { attempts: used });
            }

            debug!(
                attempt = used + 1,
                max_attempts = self.max_attempts,
                "attempting to open connection"
            );

            let failure = match connector.open(config).await {
                Ok(handle) => {
                    if handle.is_open() {
                        info!(attempt = used + 1, "database connection successful");
                        return Ok(handle);
                    }
                    ConnectError::NotOpen
                }
                Err(e) => e,
            };

            match self.budget {
                RetryBudget::PerCall => local_spent += 1,
                RetryBudget::Shared => {
                    spent.fetch_add(1, Ordering::SeqCst);
                }
            }

            warn!(error = %failure, delay = ?self.delay, "connection attempt failed, retrying");
            sleep(self.delay).await;
        }
    }
}
