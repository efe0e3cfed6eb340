//! Render attempt diagnostics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single render strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Failure,
    /// Strategy was not attempted because its configuration is absent
    Skipped,
}

/// One entry in the render chain's execution trace.
///
/// Captured in logs for postmortem debugging; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderAttempt {
    /// Strategy name
    pub strategy: String,

    /// Outcome
    pub outcome: AttemptOutcome,

    /// Elapsed wall-clock time
    pub elapsed: Duration,

    /// Failure detail, when the outcome is a failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RenderAttempt {
    pub fn success(strategy: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            strategy: strategy.into(),
            outcome: AttemptOutcome::Success,
            elapsed,
            detail: None,
        }
    }

    pub fn failure(strategy: impl Into<String>, elapsed: Duration, detail: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            outcome: AttemptOutcome::Failure,
            elapsed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(strategy: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            outcome: AttemptOutcome::Skipped,
            elapsed: Duration::ZERO,
            detail: None,
        }
    }
}
