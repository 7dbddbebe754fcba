//! Table construction parameters

use std::fmt;

/// Initial directory size used by `TableConfig::default()`
pub const DEFAULT_INITIAL_SIZE: usize = 16;

/// Chain length above which an insert triggers a split
pub const DEFAULT_SPLIT_THRESHOLD: usize = 100;

/// Rule deciding whether an insert grows the table by one split
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplitTrigger {
    /// Split when the bucket just inserted into holds more than `threshold` entries
    BucketOverflow { threshold: usize },

    /// Split when entries per active bucket exceeds `max`
    LoadFactor { max: f64 },
}

impl Default for SplitTrigger {
    fn default() -> Self {
        SplitTrigger::BucketOverflow {
            threshold: DEFAULT_SPLIT_THRESHOLD,
        }
    }
}

/// Construction parameters for a `LinearHashTable`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableConfig {
    /// Number of buckets allocated up front; also the first round's `maxp`
    pub initial_size: usize,

    pub trigger: SplitTrigger,
}

impl TableConfig {
    pub fn new(initial_size: usize) -> Self {
        TableConfig {
            initial_size,
            ..Self::default()
        }
    }

    pub fn with_trigger(mut self, trigger: SplitTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn with_split_threshold(self, threshold: usize) -> Self {
        self.with_trigger(SplitTrigger::BucketOverflow { threshold })
    }

    pub fn with_max_load_factor(self, max: f64) -> Self {
        self.with_trigger(SplitTrigger::LoadFactor { max })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_size == 0 {
            return Err(ConfigError::ZeroInitialSize);
        }
        if let SplitTrigger::LoadFactor { max } = self.trigger {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::InvalidLoadFactor(max));
            }
        }
        Ok(())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            initial_size: DEFAULT_INITIAL_SIZE,
            trigger: SplitTrigger::default(),
        }
    }
}

/// Error type for table configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    ZeroInitialSize,
    InvalidLoadFactor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroInitialSize => write!(f, "initial size must be positive"),
            ConfigError::InvalidLoadFactor(max) => {
                write!(f, "max load factor must be finite and positive, got {}", max)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
