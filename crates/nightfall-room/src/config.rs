//! Lifecycle configuration.

use nightfall_protocol::Settings;
use serde::{Deserialize, Serialize};

/// Configuration for a [`RoomLifecycle`](crate::RoomLifecycle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// How many room codes `create_room` tries before giving up with
    /// `ExhaustedRetries`. Values below 1 are treated as 1.
    ///
    /// With 62^6 possible codes a collision is already rare; needing more
    /// than a couple of attempts means the store is close to full or the
    /// generator is broken.
    pub max_code_attempts: u32,

    /// Settings a freshly created room starts with.
    pub default_settings: Settings,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_code_attempts: 16,
            default_settings: Settings::default(),
        }
    }
}
