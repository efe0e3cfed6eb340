//! Remote render grid client.
//!
//! The grid accepts a composition plus input props, renders asynchronously,
//! and exposes a progress endpoint. Its output object key is not always
//! deterministic; `candidate_urls` enumerates the known location shapes as
//! a compatibility shim for grids that do not report their own output URL.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RenderError, RenderResult};

/// Composition rendered for lecture jobs.
pub const LECTURE_COMPOSITION: &str = "lecture";

/// Default interval between progress polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default wall-clock cap for one remote render. A grid that never reports
/// done or fatal must not hold the pipeline forever.
const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Grid client configuration.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Grid API endpoint
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Bucket the grid writes outputs into
    pub output_bucket: String,
    /// Region of the output bucket
    pub region: String,
}

impl GridConfig {
    /// Create config from environment variables. `None` when the grid is
    /// not configured at all, which callers treat as "skip this strategy".
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("RENDER_GRID_URL").ok()?;
        let api_key = std::env::var("RENDER_GRID_API_KEY").ok()?;
        Some(Self {
            base_url,
            api_key,
            output_bucket: std::env::var("RENDER_GRID_OUTPUT_BUCKET")
                .unwrap_or_else(|_| "render-outputs".to_string()),
            region: std::env::var("RENDER_GRID_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        })
    }
}

/// Progress report from the grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GridProgress {
    #[serde(default)]
    pub overall_progress: f64,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub fatal_error_encountered: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Output location as reported by the grid itself, when supported.
    #[serde(default)]
    pub output_url: Option<String>,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    composition: &'a str,
    input_props: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct SubmitResponse {
    render_id: String,
}

/// HTTP client for the remote render grid.
#[derive(Clone)]
pub struct GridClient {
    client: reqwest::Client,
    config: GridConfig,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl GridClient {
    pub fn new(config: GridConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Submit a composition for rendering.
    pub async fn submit(&self, input_props: &serde_json::Value) -> RenderResult<String> {
        let url = format!("{}/v1/renders", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&SubmitRequest {
                composition: LECTURE_COMPOSITION,
                input_props,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RenderError::grid(format!(
                "render submission failed with {}",
                response.status()
            )));
        }

        let body: SubmitResponse = response.json().await?;
        info!(render_id = %body.render_id, "Submitted remote render");
        Ok(body.render_id)
    }

    /// Fetch one progress snapshot.
    pub async fn progress(&self, render_id: &str) -> RenderResult<GridProgress> {
        let url = format!(
            "{}/v1/renders/{}/progress",
            self.config.base_url.trim_end_matches('/'),
            render_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RenderError::grid(format!(
                "progress query failed with {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Poll until the render is done.
    ///
    /// A fatal grid error is definitive: there is no point retrying the same
    /// render. The wall-clock cap bounds grids that never report either way.
    pub async fn wait_until_done(&self, render_id: &str) -> RenderResult<GridProgress> {
        let started = Instant::now();

        loop {
            let progress = self.progress(render_id).await?;

            if progress.fatal_error_encountered {
                let detail = if progress.errors.is_empty() {
                    "no detail reported".to_string()
                } else {
                    progress.errors.join("; ")
                };
                return Err(RenderError::GridFatal(detail));
            }

            if progress.done {
                return Ok(progress);
            }

            if started.elapsed() >= self.poll_timeout {
                return Err(RenderError::GridTimeout(self.poll_timeout.as_secs()));
            }

            debug!(
                render_id,
                progress = progress.overall_progress,
                "Remote render in progress"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Candidate output locations for a finished render, most likely first.
    ///
    /// Used only when the grid does not report `output_url` itself; the grid
    /// metadata path is primary and this list is a compatibility shim.
    pub fn candidate_urls(&self, render_id: &str) -> Vec<String> {
        let bucket = &self.config.output_bucket;
        let region = &self.config.region;
        let base = self.config.base_url.trim_end_matches('/');

        vec![
            format!("{base}/v1/renders/{render_id}/output"),
            format!("https://{bucket}.s3.{region}.amazonaws.com/renders/{render_id}/out.mp4"),
            format!("https://{bucket}.s3.{region}.amazonaws.com/renders/{render_id}/out/video.mp4"),
            format!("https://{bucket}.s3.amazonaws.com/renders/{render_id}/out.mp4"),
            format!("https://s3.{region}.amazonaws.com/{bucket}/renders/{render_id}/out.mp4"),
            format!("https://{bucket}.s3.{region}.amazonaws.com/{render_id}/out.mp4"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> GridConfig {
        GridConfig {
            base_url,
            api_key: "key".to_string(),
            output_bucket: "render-outputs".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_returns_render_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/renders"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"render_id": "r-42"})),
            )
            .mount(&server)
            .await;

        let client = GridClient::new(test_config(server.uri()));
        let id = client.submit(&serde_json::json!({"script": "hi"})).await.unwrap();
        assert_eq!(id, "r-42");
    }

    #[tokio::test]
    async fn test_wait_until_done_detects_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/renders/r-1/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "overall_progress": 0.4,
                "done": false,
                "fatal_error_encountered": true,
                "errors": ["composition crashed"]
            })))
            .mount(&server)
            .await;

        let client = GridClient::new(test_config(server.uri()));
        let err = client.wait_until_done("r-1").await.unwrap_err();
        match err {
            RenderError::GridFatal(detail) => assert!(detail.contains("composition crashed")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wait_until_done_enforces_wall_clock_cap() {
        let server = MockServer::start().await;
        // Never done, never fatal
        Mock::given(method("GET"))
            .and(path("/v1/renders/r-2/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "overall_progress": 0.1,
                "done": false,
                "fatal_error_encountered": false
            })))
            .mount(&server)
            .await;

        let client = GridClient::new(test_config(server.uri()))
            .with_poll_interval(Duration::from_millis(10))
            .with_poll_timeout(Duration::from_millis(50));

        let err = client.wait_until_done("r-2").await.unwrap_err();
        assert!(matches!(err, RenderError::GridTimeout(_)));
    }

    #[tokio::test]
    async fn test_done_render_reports_output_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/renders/r-3/progress"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "overall_progress": 1.0,
                "done": true,
                "fatal_error_encountered": false,
                "output_url": "https://cdn.example.com/r-3.mp4"
            })))
            .mount(&server)
            .await;

        let client = GridClient::new(test_config(server.uri()));
        let progress = client.wait_until_done("r-3").await.unwrap();
        assert_eq!(
            progress.output_url.as_deref(),
            Some("https://cdn.example.com/r-3.mp4")
        );
    }

    #[test]
    fn test_candidate_urls_ordered_and_distinct() {
        let client = GridClient::new(test_config("https://grid.example.com".to_string()));
        let urls = client.candidate_urls("r-9");

        assert!(urls.len() >= 5);
        // Grid-served endpoint is the first guess
        assert!(urls[0].starts_with("https://grid.example.com"));
        let unique: std::collections::HashSet<_> = urls.iter().collect();
        assert_eq!(unique.len(), urls.len());
    }
}
