//! Copy configuration

use crate::error::ConfigError;

/// Environment variable overriding [`CopyConfig::recursion_limit`]
pub const RECURSION_LIMIT_ENV: &str = "MEMOCOPY_RECURSION_LIMIT";

/// Default nesting bound, matching the classic interpreter default
pub const DEFAULT_RECURSION_LIMIT: usize = 1000;

/// Knobs for one deep copy invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyConfig {
    /// Maximum container nesting the traversal may enter
    pub recursion_limit: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        }
    }
}

impl CopyConfig {
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    /// Defaults, overridden by `MEMOCOPY_RECURSION_LIMIT` when set
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(RECURSION_LIMIT_ENV) {
            Ok(raw) => Self::default().with_recursion_limit_str(&raw),
            Err(_) => Ok(Self::default()),
        }
    }

    fn with_recursion_limit_str(self, raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().parse::<usize>() {
            Ok(limit) if limit > 0 => Ok(self.with_recursion_limit(limit)),
            _ => Err(ConfigError::InvalidRecursionLimit {
                value: raw.to_string(),
            }),
        }
    }
}
