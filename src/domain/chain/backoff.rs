//! Backoff policies - delay inserted between attempts against the same provider

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maps a 1-based attempt number to the delay slept before the next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffPolicy {
    /// Retry immediately
    None,
    /// Same delay after every attempt
    Constant { delay_ms: u64 },
    /// `base + attempt * step`
    Linear { base_ms: u64, step_ms: u64 },
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::Linear {
            base_ms: 1000,
            step_ms: 1500,
        }
    }
}

impl BackoffPolicy {
    pub fn linear(base_ms: u64, step_ms: u64) -> Self {
        Self::Linear { base_ms, step_ms }
    }

    pub fn constant(delay_ms: u64) -> Self {
        Self::Constant { delay_ms }
    }

    /// Delay after the given attempt (1-based). Attempt 0 is treated as 1.
    pub fn delay(&self, attempt: u32) -> Duration {
        let attempt = u64::from(attempt.max(1));

        match *self {
            Self::None => Duration::ZERO,
            Self::Constant { delay_ms } => Duration::from_millis(delay_ms),
            Self::Linear { base_ms, step_ms } => {
                Duration::from_millis(base_ms.saturating_add(attempt.saturating_mul(step_ms)))
            }
        }
    }
}
