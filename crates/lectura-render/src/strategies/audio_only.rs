//! Audio-only fallback.
//!
//! When every video strategy fails, the narration track alone is still a
//! publishable artifact. This strategy needs nothing beyond the audio file
//! the pipeline already produced, so the chain always has a success path
//! short of total provider failure.

use async_trait::async_trait;
use tracing::info;

use crate::error::{RenderError, RenderResult};
use crate::strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};

pub struct AudioOnlyStrategy;

#[async_trait]
impl RenderStrategy for AudioOnlyStrategy {
    fn name(&self) -> &'static str {
        "audio_only"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn attempt(&self, ctx: &RenderContext) -> RenderResult<RenderedArtifact> {
        if !ctx.audio_path.exists() {
            return Err(RenderError::strategy_failed(
                "narration audio file is missing",
            ));
        }

        info!(path = %ctx.audio_path.display(), "Falling back to audio-only artifact");
        Ok(RenderedArtifact {
            path: ctx.audio_path.clone(),
            kind: ArtifactKind::Audio,
        })
    }
}
