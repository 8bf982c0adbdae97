//! Shared test utilities for dbkeeper integration tests
#![allow(dead_code)]

use dbkeeper::config::{Config, DatabaseConfig, RetryConfig};
use dbkeeper::connector::{Connector, ManagedConnection};
use dbkeeper::errors::ConnectError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Outcome of one scripted open attempt
pub enum Outcome {
    /// Open succeeds with a handle that reports open
    Open,
    /// Open succeeds but the handle does not report open
    NotOpen,
    /// Open fails outright
    Refused,
}

/// Connector driven by a script of attempt outcomes
///
/// Outcomes are consumed front to back; once the script runs dry every
/// further attempt succeeds. `failing()` builds a connector that never
/// succeeds regardless of attempts.
pub struct MockConnector {
    script: Mutex<VecDeque<Outcome>>,
    fail_forever: bool,
    opens_attempted: AtomicU32,
}

impl MockConnector {
    /// Every open attempt succeeds
    pub fn healthy() -> Self {
        Self::scripted([])
    }

    /// Every open attempt fails
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fail_forever: true,
            opens_attempted: AtomicU32::new(0),
        }
    }

    /// Attempts follow the given script, then succeed
    pub fn scripted(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            fail_forever: false,
            opens_attempted: AtomicU32::new(0),
        }
    }

    /// Total open attempts made against this connector
    pub fn opens_attempted(&self) -> u32 {
        self.opens_attempted.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Handle = MockHandle;

    async fn open(&self, _config: &DatabaseConfig) -> Result<MockHandle, ConnectError> {
        self.opens_attempted.fetch_add(1, Ordering::SeqCst);

        if self.fail_forever {
            return Err(ConnectError::Attempt {
                details: "connection refused".to_string(),
            });
        }

        match self.script.lock().unwrap().pop_front() {
            Some(Outcome::Refused) => Err(ConnectError::Attempt {
                details: "connection refused".to_string(),
            }),
            Some(Outcome::NotOpen) => Ok(MockHandle { open: false }),
            Some(Outcome::Open) | None => Ok(MockHandle { open: true }),
        }
    }
}

/// Handle produced by [`MockConnector`]
#[derive(Debug)]
pub struct MockHandle {
    open: bool,
}

impl ManagedConnection for MockHandle {
    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// A database config pointing at a port nothing listens on
pub fn test_database_config() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        dbname: "testdb".to_string(),
        user: "postgres".to_string(),
        password: None,
        password_env: None,
        connect_timeout_secs: 30,
    }
}

/// A full config with default retry behaviour
pub fn test_config() -> Config {
    Config {
        database: test_database_config(),
        retry: RetryConfig::default(),
    }
}

/// A full config with the given retry behaviour
pub fn test_config_with_retry(retry: RetryConfig) -> Config {
    Config {
        database: test_database_config(),
        retry,
    }
}
