//! External TTS provider client.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::error::{SpeechError, SpeechResult};

/// Default narration voice.
pub const DEFAULT_VOICE_ID: &str = "narrator-en-1";

/// Request timeout for synthesis calls.
const SYNTHESIS_TIMEOUT_SECS: u64 = 120;

/// A speech synthesis backend addressable by voice id.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Synthesize one chunk of text into audio bytes.
    ///
    /// Errors propagate to the caller; retry policy lives in the
    /// orchestrator, not here.
    async fn synthesize(&self, text: &str, voice_id: &str) -> SpeechResult<Vec<u8>>;
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
}

/// HTTP client for the external TTS provider.
#[derive(Clone)]
pub struct TtsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TtsClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> SpeechResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(SYNTHESIS_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create from `TTS_BASE_URL` / `TTS_API_KEY`.
    pub fn from_env() -> SpeechResult<Self> {
        let base_url = std::env::var("TTS_BASE_URL")
            .map_err(|_| SpeechError::config("TTS_BASE_URL not set"))?;
        let api_key = std::env::var("TTS_API_KEY")
            .map_err(|_| SpeechError::config("TTS_API_KEY not set"))?;
        Self::new(base_url, api_key)
    }
}

#[async_trait]
impl SpeechService for TtsClient {
    async fn synthesize(&self, text: &str, voice_id: &str) -> SpeechResult<Vec<u8>> {
        let url = format!("{}/v1/synthesize", self.base_url);
        debug!(voice_id, chars = text.len(), "Requesting speech synthesis");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SynthesizeRequest { text, voice_id })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::provider(format!(
                "synthesis request failed with {status}: {}",
                body.lines().next().unwrap_or("")
            )));
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/synthesize"))
            .and(body_json_string(
                r#"{"text":"Hello world","voice_id":"narrator-en-1"}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp3-bytes".to_vec()))
            .mount(&server)
            .await;

        let client = TtsClient::new(server.uri(), "test-key").unwrap();
        let audio = client
            .synthesize("Hello world", DEFAULT_VOICE_ID)
            .await
            .unwrap();
        assert_eq!(audio, b"mp3-bytes");
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/synthesize"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let client = TtsClient::new(server.uri(), "test-key").unwrap();
        let err = client
            .synthesize("Hello", DEFAULT_VOICE_ID)
            .await
            .unwrap_err();

        match err {
            SpeechError::Provider(msg) => {
                assert!(msg.contains("429"));
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
