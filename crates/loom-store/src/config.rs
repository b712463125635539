use serde::{Deserialize, Serialize};

/// Configuration for a story store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of each subscriber's broadcast channel. A subscriber that
    /// falls further behind skips ahead to newer snapshots.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}
