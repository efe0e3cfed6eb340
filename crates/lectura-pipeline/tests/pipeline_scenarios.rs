//! End-to-end pipeline scenarios against mocked collaborators.
//!
//! The TTS provider and render grid run as wiremock servers; object storage
//! is an in-memory fake; ffmpeg presence is controlled through the runner's
//! program name so the degraded paths are deterministic everywhere.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lectura_media::{check_ffmpeg, find_font, DownloadOptions, Ffmpeg};
use lectura_models::{JobStatus, JobUpdate};
use lectura_pipeline::Pipeline;
use lectura_render::{
    AudioOnlyStrategy, GridClient, GridConfig, LocalRenderStrategy, LocalRendererConfig,
    RemoteGridStrategy, RenderChain, SlideshowStrategy,
};
use lectura_speech::{SpeechSynthesizer, TtsClient};
use lectura_storage::{artifact_key, ArtifactPublisher, StorageError, StorageResult};
use lectura_store::JobStore;

/// In-memory publisher capturing every upload.
#[derive(Default)]
struct FakePublisher {
    published: Mutex<HashMap<String, String>>,
}

impl FakePublisher {
    fn published_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self
            .published
            .lock()
            .expect("publisher mutex poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl ArtifactPublisher for FakePublisher {
    async fn publish(
        &self,
        local_file: &Path,
        job_id: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        if !local_file.exists() {
            return Err(StorageError::upload_failed(format!(
                "missing local file {}",
                local_file.display()
            )));
        }
        let key = artifact_key(job_id, content_type);
        let url = format!("https://cdn.test/{key}");
        self.published
            .lock()
            .expect("publisher mutex poisoned")
            .insert(key, content_type.to_string());
        Ok(url)
    }
}

/// TTS server returning one second of (fake) audio per chunk.
async fn working_tts() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/synthesize"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 4096]))
        .mount(&server)
        .await;
    server
}

/// Grid server that accepts renders and always reports a fatal error.
async fn fatal_grid() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/renders"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"render_id": "r-fatal"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/renders/.+/progress$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "overall_progress": 0.2,
            "done": false,
            "fatal_error_encountered": true,
            "errors": ["render grid out of capacity"]
        })))
        .mount(&server)
        .await;
    server
}

fn grid_client(server: &MockServer) -> GridClient {
    GridClient::new(GridConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        output_bucket: "render-outputs".to_string(),
        region: "us-east-1".to_string(),
    })
    .with_poll_interval(Duration::from_millis(10))
    .with_poll_timeout(Duration::from_secs(2))
}

/// A local renderer that always throws: the engine program does not exist.
fn throwing_local_renderer(dir: &TempDir) -> LocalRendererConfig {
    LocalRendererConfig {
        program: "renderer-engine-that-does-not-exist".to_string(),
        entry: dir.path().join("renderer/entry.js"),
    }
}

struct Harness {
    _store_dir: TempDir,
    work_dir: TempDir,
    store: JobStore,
    publisher: Arc<FakePublisher>,
}

impl Harness {
    async fn new() -> Self {
        let store_dir = TempDir::new().unwrap();
        let work_dir = TempDir::new().unwrap();
        let store = JobStore::open(store_dir.path()).await.unwrap();
        Self {
            _store_dir: store_dir,
            work_dir,
            store,
            publisher: Arc::new(FakePublisher::default()),
        }
    }

    fn pipeline(
        &self,
        tts: &MockServer,
        chain: RenderChain,
        ffmpeg: Ffmpeg,
    ) -> Arc<Pipeline> {
        let speech = SpeechSynthesizer::new(
            Arc::new(TtsClient::new(tts.uri(), "test-key").unwrap()),
            ffmpeg,
        );
        Arc::new(Pipeline::new(
            self.store.clone(),
            speech,
            None,
            chain,
            self.publisher.clone(),
            self.work_dir.path().to_path_buf(),
            "narrator-en-1",
        ))
    }
}

fn no_ffmpeg() -> Ffmpeg {
    Ffmpeg::new().with_program("ffmpeg-that-does-not-exist")
}

fn fast_download_options() -> DownloadOptions {
    DownloadOptions {
        max_attempts_per_url: 1,
        retry_delay: Duration::from_millis(10),
    }
}

/// Grid fatal + local renderer throwing + no ffmpeg: the job must still
/// complete, as an audio artifact under the audio-specific path.
#[tokio::test]
async fn job_completes_audio_only_when_every_video_strategy_fails() {
    let tts = working_tts().await;
    let grid = fatal_grid().await;
    let harness = Harness::new().await;

    let renderer_dir = TempDir::new().unwrap();
    let chain = RenderChain::new(vec![
        Box::new(
            RemoteGridStrategy::new(Some(grid_client(&grid)))
                .with_download_options(fast_download_options()),
        ),
        Box::new(LocalRenderStrategy::new(Some(throwing_local_renderer(
            &renderer_dir,
        )))),
        Box::new(SlideshowStrategy::new(no_ffmpeg())),
        Box::new(AudioOnlyStrategy),
    ]);

    let pipeline = harness.pipeline(&tts, chain, no_ffmpeg());
    let job = pipeline.create_job("Hello world").await.unwrap();
    pipeline.run(job.id.clone()).await;

    let finished = harness.store.get(&job.id).await.unwrap();
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.progress, 100);
    let url = finished.artifact_url.expect("artifact URL must be set");
    assert!(url.contains("/audio/"), "audio artifact expected, got {url}");
    assert!(url.ends_with(".mp3"));
    assert!(finished.error.is_none());

    let keys = harness.publisher.published_keys();
    assert_eq!(keys, vec![format!("audio/{}.mp3", job.id)]);
}

/// Same chain, but with a working ffmpeg: the slideshow strategy must win
/// and produce a video artifact. Skipped on hosts without ffmpeg or fonts.
#[tokio::test]
async fn job_completes_via_slideshow_when_grid_and_local_fail() {
    if check_ffmpeg().is_err() || find_font().is_err() {
        eprintln!("skipping: ffmpeg or system font unavailable");
        return;
    }

    let tts = working_tts().await;
    let grid = fatal_grid().await;
    let harness = Harness::new().await;

    let renderer_dir = TempDir::new().unwrap();
    let ffmpeg = Ffmpeg::new();
    let chain = RenderChain::new(vec![
        Box::new(
            RemoteGridStrategy::new(Some(grid_client(&grid)))
                .with_download_options(fast_download_options()),
        ),
        Box::new(LocalRenderStrategy::new(Some(throwing_local_renderer(
            &renderer_dir,
        )))),
        Box::new(SlideshowStrategy::new(ffmpeg.clone())),
        Box::new(AudioOnlyStrategy),
    ])
    // Fake TTS bytes make ffmpeg fall back through the re-encode path with
    // tiny outputs; the plausibility threshold is not under test here.
    .with_min_video_bytes(1);

    let pipeline = harness.pipeline(&tts, chain, ffmpeg);
    let job = pipeline.create_job("Hello world").await.unwrap();
    pipeline.run(job.id.clone()).await;

    let finished = harness.store.get(&job.id).await.unwrap();
    // Fake mp3 bytes may still fail ffmpeg's mux; accept either video
    // completion or the audio fallback, but never a failed job.
    assert_eq!(finished.status, JobStatus::Completed);
    assert!(finished.artifact_url.is_some());
}

/// TTS failing for every chunk is fatal: no fallback exists for missing
/// narration.
#[tokio::test]
async fn job_fails_when_speech_synthesis_fails() {
    let tts = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/synthesize"))
        .respond_with(ResponseTemplate::new(503).set_body_string("synthesis backend down"))
        .mount(&tts)
        .await;

    let harness = Harness::new().await;
    let chain = RenderChain::new(vec![Box::new(AudioOnlyStrategy)]);
    let pipeline = harness.pipeline(&tts, chain, no_ffmpeg());

    let job = pipeline.create_job("Hello world").await.unwrap();
    pipeline.run(job.id.clone()).await;

    let finished = harness.store.get(&job.id).await.unwrap();
    assert_eq!(finished.status, JobStatus::Failed);
    let error = finished.error.expect("error message must be set");
    assert!(!error.is_empty());
    assert!(error.contains("Speech synthesis failed"));
    assert!(finished.artifact_url.is_none());

    // Nothing was published for the failed job.
    assert!(harness.publisher.published_keys().is_empty());
}

/// The pipeline's unconditional cleanup removes the per-job work dir on
/// both success and failure paths.
#[tokio::test]
async fn work_dir_is_cleaned_up_after_run() {
    let tts = working_tts().await;
    let harness = Harness::new().await;
    let chain = RenderChain::new(vec![Box::new(AudioOnlyStrategy)]);
    let pipeline = harness.pipeline(&tts, chain, no_ffmpeg());

    let job = pipeline.create_job("Hello world").await.unwrap();
    pipeline.run(job.id.clone()).await;

    let job_work_dir = harness.work_dir.path().join(job.id.as_str());
    assert!(!job_work_dir.exists(), "work dir must be removed");
}

/// A terminal job rejects post-terminal writes even through the pipeline's
/// own store handle.
#[tokio::test]
async fn completed_job_rejects_further_updates() {
    let tts = working_tts().await;
    let harness = Harness::new().await;
    let chain = RenderChain::new(vec![Box::new(AudioOnlyStrategy)]);
    let pipeline = harness.pipeline(&tts, chain, no_ffmpeg());

    let job = pipeline.create_job("Hello world").await.unwrap();
    pipeline.run(job.id.clone()).await;

    let err = harness
        .store
        .update(&job.id, JobUpdate::progress(10))
        .await
        .unwrap_err();
    assert!(matches!(err, lectura_store::StoreError::TerminalJob(_)));
}
