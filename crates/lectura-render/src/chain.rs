//! Render strategy chain driver.
//!
//! Strategies are tried strictly in order until one succeeds. A strategy is
//! skipped (not attempted) only when its external configuration is absent.
//! Every attempt's outcome is recorded for postmortem diagnostics.

use std::time::Instant;

use tracing::{info, warn};

use lectura_models::RenderAttempt;

use crate::error::{RenderError, RenderResult};
use crate::grid::GridClient;
use crate::strategies::{
    AudioOnlyStrategy, LocalRenderStrategy, LocalRendererConfig, RemoteGridStrategy,
    SlideshowStrategy,
};
use crate::strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};
use lectura_media::Ffmpeg;

/// Videos below this size are treated as corrupt and rejected.
///
/// Heuristic carried over from production incidents where a renderer exited
/// zero but wrote a truncated container; a real lecture video is never this
/// small.
pub const MIN_PLAUSIBLE_VIDEO_BYTES: u64 = 10 * 1024;

/// Ordered fallback chain over render strategies.
pub struct RenderChain {
    strategies: Vec<Box<dyn RenderStrategy>>,
    min_video_bytes: u64,
}

impl RenderChain {
    /// Chain over an explicit strategy list, first strategy tried first.
    pub fn new(strategies: Vec<Box<dyn RenderStrategy>>) -> Self {
        Self {
            strategies,
            min_video_bytes: MIN_PLAUSIBLE_VIDEO_BYTES,
        }
    }

    /// The production chain: remote grid, local renderer, slideshow,
    /// audio-only.
    pub fn standard(
        grid: Option<GridClient>,
        local: Option<LocalRendererConfig>,
        ffmpeg: Ffmpeg,
    ) -> Self {
        Self::new(vec![
            Box::new(RemoteGridStrategy::new(grid)),
            Box::new(LocalRenderStrategy::new(local)),
            Box::new(SlideshowStrategy::new(ffmpeg)),
            Box::new(AudioOnlyStrategy),
        ])
    }

    pub fn with_min_video_bytes(mut self, min: u64) -> Self {
        self.min_video_bytes = min;
        self
    }

    /// Run the chain to the first success.
    ///
    /// Returns the artifact plus the full attempt trace. Fails only when
    /// every strategy is exhausted, which the standard chain cannot hit as
    /// long as the narration audio exists.
    pub async fn run(
        &self,
        ctx: &RenderContext,
    ) -> RenderResult<(RenderedArtifact, Vec<RenderAttempt>)> {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            if !strategy.is_configured() {
                info!(strategy = strategy.name(), "Skipping unconfigured render strategy");
                attempts.push(RenderAttempt::skipped(strategy.name()));
                continue;
            }

            let started = Instant::now();
            match strategy.attempt(ctx).await {
                Ok(artifact) => {
                    let elapsed = started.elapsed();

                    if let Err(e) = self.check_plausible(&artifact).await {
                        warn!(
                            strategy = strategy.name(),
                            elapsed_ms = elapsed.as_millis() as u64,
                            error = %e,
                            "Render strategy produced implausible output"
                        );
                        attempts.push(RenderAttempt::failure(strategy.name(), elapsed, e.to_string()));
                        continue;
                    }

                    info!(
                        strategy = strategy.name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        path = %artifact.path.display(),
                        "Render strategy succeeded"
                    );
                    attempts.push(RenderAttempt::success(strategy.name(), elapsed));
                    return Ok((artifact, attempts));
                }
                Err(e) => {
                    let elapsed = started.elapsed();
                    warn!(
                        strategy = strategy.name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e,
                        "Render strategy failed"
                    );
                    attempts.push(RenderAttempt::failure(strategy.name(), elapsed, e.to_string()));
                }
            }
        }

        Err(RenderError::Exhausted)
    }

    /// Reject video artifacts below the corruption threshold.
    async fn check_plausible(&self, artifact: &RenderedArtifact) -> RenderResult<()> {
        if artifact.kind != ArtifactKind::Video {
            return Ok(());
        }

        let size = tokio::fs::metadata(&artifact.path).await?.len();
        if size < self.min_video_bytes {
            return Err(RenderError::ImplausibleOutput {
                size,
                min: self.min_video_bytes,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lectura_models::AttemptOutcome;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedStrategy {
        name: &'static str,
        configured: bool,
        result: Option<(PathBuf, ArtifactKind)>,
        calls: Arc<AtomicUsize>,
    }

    impl FixedStrategy {
        fn failing(name: &'static str) -> Self {
            Self {
                name,
                configured: true,
                result: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn succeeding(name: &'static str, path: PathBuf, kind: ArtifactKind) -> Self {
            Self {
                name,
                configured: true,
                result: Some((path, kind)),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn unconfigured(name: &'static str) -> Self {
            Self {
                name,
                configured: false,
                result: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl RenderStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn attempt(&self, _ctx: &RenderContext) -> RenderResult<RenderedArtifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Some((path, kind)) => Ok(RenderedArtifact {
                    path: path.clone(),
                    kind: *kind,
                }),
                None => Err(RenderError::strategy_failed("forced failure")),
            }
        }
    }

    fn ctx(dir: &TempDir) -> RenderContext {
        RenderContext {
            script: "Hello".to_string(),
            media: Vec::new(),
            audio_path: dir.path().join("narration.mp3"),
            audio_url: None,
            work_dir: dir.path().to_path_buf(),
        }
    }

    #[tokio::test]
    async fn test_first_success_stops_the_chain() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("out.mp4");
        std::fs::write(&video, vec![0u8; 64 * 1024]).unwrap();

        let late = FixedStrategy::succeeding("late", video.clone(), ArtifactKind::Video);
        let late_calls = late.calls.clone();

        let chain = RenderChain::new(vec![
            Box::new(FixedStrategy::failing("first")),
            Box::new(FixedStrategy::succeeding(
                "second",
                video.clone(),
                ArtifactKind::Video,
            )),
            Box::new(late),
        ]);

        let (artifact, attempts) = chain.run(&ctx(&dir)).await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Video);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Failure);
        assert_eq!(attempts[1].outcome, AttemptOutcome::Success);
        // Later strategies were never attempted.
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unconfigured_strategy_is_skipped_not_attempted() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("narration.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        let skipped = FixedStrategy::unconfigured("remote_grid");
        let skipped_calls = skipped.calls.clone();

        let chain = RenderChain::new(vec![
            Box::new(skipped),
            Box::new(FixedStrategy::succeeding(
                "audio_only",
                audio,
                ArtifactKind::Audio,
            )),
        ]);

        let (_, attempts) = chain.run(&ctx(&dir)).await.unwrap();
        assert_eq!(attempts[0].outcome, AttemptOutcome::Skipped);
        assert_eq!(skipped_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_implausibly_small_video_falls_through() {
        let dir = TempDir::new().unwrap();
        let tiny = dir.path().join("tiny.mp4");
        std::fs::write(&tiny, b"x").unwrap();
        let audio = dir.path().join("narration.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        let chain = RenderChain::new(vec![
            Box::new(FixedStrategy::succeeding(
                "tiny_video",
                tiny,
                ArtifactKind::Video,
            )),
            Box::new(FixedStrategy::succeeding(
                "audio_only",
                audio,
                ArtifactKind::Audio,
            )),
        ]);

        let (artifact, attempts) = chain.run(&ctx(&dir)).await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Audio);
        assert_eq!(attempts[0].outcome, AttemptOutcome::Failure);
        assert!(attempts[0]
            .detail
            .as_deref()
            .unwrap_or_default()
            .contains("implausibly small"));
    }

    #[tokio::test]
    async fn test_audio_artifacts_skip_size_check() {
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("narration.mp3");
        std::fs::write(&audio, b"tiny-but-fine").unwrap();

        let chain = RenderChain::new(vec![Box::new(FixedStrategy::succeeding(
            "audio_only",
            audio,
            ArtifactKind::Audio,
        ))]);

        let (artifact, _) = chain.run(&ctx(&dir)).await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Audio);
    }

    #[tokio::test]
    async fn test_all_failures_exhaust_the_chain() {
        let dir = TempDir::new().unwrap();
        let chain = RenderChain::new(vec![
            Box::new(FixedStrategy::failing("a")),
            Box::new(FixedStrategy::failing("b")),
        ]);

        let err = chain.run(&ctx(&dir)).await.unwrap_err();
        assert!(matches!(err, RenderError::Exhausted));
    }

    #[tokio::test]
    async fn test_standard_chain_reaches_audio_only_without_ffmpeg() {
        // Grid unconfigured, local unconfigured, ffmpeg missing: the chain
        // must still succeed through the audio-only fallback.
        let dir = TempDir::new().unwrap();
        let audio = dir.path().join("narration.mp3");
        std::fs::write(&audio, b"mp3").unwrap();

        let chain = RenderChain::standard(
            None,
            None,
            Ffmpeg::new().with_program("ffmpeg-that-does-not-exist"),
        );

        let mut context = ctx(&dir);
        context.audio_path = audio;

        let (artifact, attempts) = chain.run(&context).await.unwrap();
        assert_eq!(artifact.kind, ArtifactKind::Audio);

        let outcomes: Vec<_> = attempts.iter().map(|a| (a.strategy.as_str(), a.outcome)).collect();
        assert_eq!(outcomes[0], ("remote_grid", AttemptOutcome::Skipped));
        assert_eq!(outcomes[1], ("local_renderer", AttemptOutcome::Skipped));
        assert_eq!(outcomes[2].1, AttemptOutcome::Failure);
        assert_eq!(outcomes[3], ("audio_only", AttemptOutcome::Success));
    }
}
