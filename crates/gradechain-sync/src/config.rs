//! Sync engine configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the synchronization runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between synchronization passes. Values below 1 are
    /// clamped to 1.
    #[serde(default = "default_update_period_secs")]
    pub update_period_secs: u64,

    /// Wrap the ledger client with call logging.
    #[serde(default)]
    pub dev_mode: bool,

    /// Initial password for accounts synthesized during restore.
    #[serde(default = "default_password")]
    pub default_password: String,
}

fn default_update_period_secs() -> u64 {
    60
}

fn default_password() -> String {
    "password".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            update_period_secs: default_update_period_secs(),
            dev_mode: false,
            default_password: default_password(),
        }
    }
}

impl SyncConfig {
    /// The effective pass period, never zero.
    #[must_use]
    pub fn effective_period_secs(&self) -> u64 {
        self.update_period_secs.max(1)
    }
}
