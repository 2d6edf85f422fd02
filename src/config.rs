use serde::{Deserialize, Serialize};

use crate::error::{CollocationError, Result};

pub const DEFAULT_WINDOW_SIZE: usize = 5;
pub const DEFAULT_MIN_COUNT: u64 = 2;
pub const DEFAULT_TOP_K: usize = 50;

/// Parameters of the counting and ranking core.
///
/// `window_size` includes the anchor token, so a window of 5 looks four
/// tokens ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationConfig {
    pub window_size: usize,
    pub min_count: u64,
    pub top_k: usize,
}

impl Default for CollocationConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            min_count: DEFAULT_MIN_COUNT,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl CollocationConfig {
    /// Reject settings that make the run meaningless. Nothing is computed
    /// before this passes.
    pub fn validate(&self) -> Result<()> {
        validate_window_size(self.window_size)?;
        if self.min_count < 1 {
            return Err(CollocationError::InvalidMinCount(self.min_count));
        }
        if self.top_k < 1 {
            return Err(CollocationError::InvalidTopK(self.top_k));
        }
        Ok(())
    }
}

pub(crate) fn validate_window_size(window_size: usize) -> Result<()> {
    if window_size < 2 {
        return Err(CollocationError::InvalidWindowSize(window_size));
    }
    Ok(())
}
