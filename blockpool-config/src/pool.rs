//! Pool sizing and release behaviour.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Pool allocator configuration.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct PoolConfig {
    /// Size of the pre-reserved region in bytes, at most 1 GiB.
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, max = 1073741824))]
    pub capacity: usize,

    /// Zero block contents whenever a block is freed.
    #[serde(default)]
    pub zero_on_free: bool,
}

fn default_capacity() -> usize {
    64 * 1024
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            zero_on_free: false,
        }
    }
}
