//! Engine configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for opening an index engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the database file. `None` opens a private in-memory store.
    pub path: Option<PathBuf>,

    /// How long a transaction waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the database file path.
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}
