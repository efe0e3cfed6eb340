//! Multi-candidate download with bounded retries.
//!
//! Remote render outputs do not always land at a deterministic location,
//! so callers supply an ordered list of candidate URLs. Each candidate is
//! retried a bounded number of times before moving on; the first successful
//! download wins.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{MediaError, MediaResult};

/// Fixed delay between attempts on the same candidate.
pub const CANDIDATE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Options for [`download_first_available`].
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Attempts per candidate URL before moving to the next one
    pub max_attempts_per_url: u32,
    /// Delay between attempts on the same candidate
    pub retry_delay: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            max_attempts_per_url: 3,
            retry_delay: CANDIDATE_RETRY_DELAY,
        }
    }
}

/// Download the first candidate URL that yields a non-empty body.
///
/// Candidates are tried strictly in order; success short-circuits the rest.
/// When every candidate exhausts its attempts, the error aggregates the
/// last failure per candidate so operators can see which location
/// assumption was wrong.
pub async fn download_first_available(
    client: &reqwest::Client,
    candidates: &[String],
    options: &DownloadOptions,
    dest: &Path,
) -> MediaResult<PathBuf> {
    if candidates.is_empty() {
        return Err(MediaError::download_failed("no candidate URLs supplied"));
    }

    let mut errors: Vec<(String, String)> = Vec::with_capacity(candidates.len());

    for url in candidates {
        let mut last_error = String::new();

        for attempt in 1..=options.max_attempts_per_url {
            debug!(url = %url, attempt, "Attempting candidate download");

            match fetch(client, url).await {
                Ok(bytes) => {
                    tokio::fs::write(dest, &bytes).await?;
                    info!(
                        url = %url,
                        size = bytes.len(),
                        dest = %dest.display(),
                        "Candidate download succeeded"
                    );
                    return Ok(dest.to_path_buf());
                }
                Err(e) => {
                    last_error = e;
                    if attempt < options.max_attempts_per_url {
                        tokio::time::sleep(options.retry_delay).await;
                    }
                }
            }
        }

        warn!(
            url = %url,
            attempts = options.max_attempts_per_url,
            error = %last_error,
            "Candidate exhausted"
        );
        errors.push((url.clone(), last_error));
    }

    Err(MediaError::AllCandidatesFailed { errors })
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| e.to_string())?
        .error_for_status()
        .map_err(|e| e.to_string())?;

    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    if bytes.is_empty() {
        return Err("empty response body".to_string());
    }
    Ok(bytes.to_vec())
}
