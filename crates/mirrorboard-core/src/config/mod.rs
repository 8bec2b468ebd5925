// Mirrorboard Configuration
// Static translator configuration, validated once before any event is handled

mod layout;

use std::time::Duration;

use crate::key::key_from_name;
use crate::Key;

pub use layout::MIRROR_LAYOUT;

/// Default trigger key
pub const DEFAULT_TRIGGER: Key = Key::SPACE;

/// Trigger holds shorter than this type the trigger key itself
pub const DEFAULT_BURST_THRESHOLD: Duration = Duration::from_millis(250);

/// Configuration errors, all detected at construction time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("Key {0} is mapped to itself")]
    SelfMapped(Key),

    #[error("Key {0} appears in more than one remap pair")]
    DuplicateKey(Key),

    #[error("Trigger key {0} must not appear in the remap table")]
    TriggerRemapped(Key),

    #[error("Burst threshold must be greater than zero")]
    ZeroThreshold,
}

/// Everything the translator needs, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    /// Key whose hold activates the mirror layer
    pub trigger: Key,
    /// Inside dwell below which a trigger release is a tap
    pub burst_threshold: Duration,
    /// Unordered key pairs swapped while inside
    pub pairs: Vec<(Key, Key)>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER,
            burst_threshold: DEFAULT_BURST_THRESHOLD,
            pairs: MIRROR_LAYOUT.to_vec(),
        }
    }
}

impl MirrorConfig {
    /// Replace the trigger key
    pub fn with_trigger(mut self, trigger: Key) -> Self {
        self.trigger = trigger;
        self
    }

    /// Replace the trigger key, resolving it by name
    pub fn with_trigger_name(self, name: &str) -> Result<Self, ConfigError> {
        let trigger =
            key_from_name(name).ok_or_else(|| ConfigError::UnknownKey(name.to_string()))?;
        Ok(self.with_trigger(trigger))
    }

    /// Replace the burst threshold
    pub fn with_burst_threshold(mut self, threshold: Duration) -> Self {
        self.burst_threshold = threshold;
        self
    }

    /// Replace the layout pairs
    pub fn with_pairs(mut self, pairs: Vec<(Key, Key)>) -> Self {
        self.pairs = pairs;
        self
    }
}
