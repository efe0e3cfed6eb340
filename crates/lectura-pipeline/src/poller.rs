//! Client-side status polling with capped exponential backoff.

use std::time::Duration;

use tracing::debug;

use lectura_models::{Job, JobId};
use lectura_store::{JobStore, StoreResult};

/// First delay between polls.
const BASE_POLL_DELAY: Duration = Duration::from_secs(1);

/// Backoff ceiling per attempt.
const MAX_POLL_DELAY: Duration = Duration::from_secs(10);

/// Attempts before giving up and reporting "may still be processing".
const MAX_POLL_ATTEMPTS: u32 = 60;

/// Result of a bounded polling session.
#[derive(Debug)]
pub enum PollOutcome {
    /// The job reached a terminal state.
    Terminal(Job),
    /// Attempts ran out while the job was still live. The job may well
    /// finish later; callers should surface that instead of blocking.
    StillProcessing(Job),
}

/// Polls the job store until a job terminates or attempts run out.
pub struct StatusPoller {
    store: JobStore,
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl StatusPoller {
    pub fn new(store: JobStore) -> Self {
        Self {
            store,
            base_delay: BASE_POLL_DELAY,
            max_delay: MAX_POLL_DELAY,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Poll until the job terminates, backing off exponentially up to the
    /// delay ceiling. Never blocks forever.
    pub async fn poll(&self, job_id: &JobId) -> StoreResult<PollOutcome> {
        let mut delay = self.base_delay;
        let mut last = self.store.get(job_id).await?;

        for attempt in 1..=self.max_attempts {
            if last.is_terminal() {
                return Ok(PollOutcome::Terminal(last));
            }

            debug!(
                job_id = %job_id,
                attempt,
                status = %last.status,
                progress = last.progress,
                "Job still live; backing off"
            );
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(self.max_delay);

            last = self.store.get(job_id).await?;
        }

        if last.is_terminal() {
            return Ok(PollOutcome::Terminal(last));
        }
        Ok(PollOutcome::StillProcessing(last))
    }
}
