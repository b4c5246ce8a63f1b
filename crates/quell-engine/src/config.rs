//! Engine Configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Work items per scheduler slot
    pub batch_size: usize,

    /// Upper bound handed to the host's idle callback (ms)
    pub idle_timeout_ms: u64,

    /// Text nodes longer than this (in chars) are left alone
    pub max_text_length: usize,

    /// Quiet time after the last mutation before added nodes are queued (ms)
    pub debounce_ms: u64,

    /// Quiet time that releases the initial hold (ms)
    pub hold_quiet_ms: u64,

    /// Absolute bound on the initial hold (ms)
    pub hold_timeout_ms: u64,

    /// Class carried by every marker element
    pub marker_class: String,

    /// Class put on the document element while holding
    pub hold_class: String,

    /// Processed-set size that triggers a stale-handle sweep after a drain
    pub sweep_threshold: usize,

    /// Documents with at most this many candidate text nodes get a
    /// synchronous first pass
    pub sync_pass_limit: usize,
}

impl EngineConfig {
    /// Parse a JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::Config)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn hold_quiet(&self) -> Duration {
        Duration::from_millis(self.hold_quiet_ms)
    }

    pub fn hold_timeout(&self) -> Duration {
        Duration::from_millis(self.hold_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            idle_timeout_ms: 100,
            max_text_length: 10_000,
            debounce_ms: 100,
            hold_quiet_ms: 150,
            hold_timeout_ms: 1_500,
            marker_class: "quell-emoji".to_string(),
            hold_class: "quell-hold".to_string(),
            sweep_threshold: 4_096,
            sync_pass_limit: 2_000,
        }
    }
}
