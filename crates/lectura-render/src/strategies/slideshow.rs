//! Subprocess slideshow fallback.
//!
//! Produces a single annotated still frame and muxes it with the narration
//! track. Needs only ffmpeg and a system font, which makes it the last
//! video-producing resort when both real renderers are unavailable.

use async_trait::async_trait;
use tracing::info;

use lectura_media::{annotated_still, find_font, mux_still_with_audio, Ffmpeg};

use crate::error::RenderResult;
use crate::strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};

/// Maximum characters of the script shown on the slide.
const SLIDE_TEXT_CHARS: usize = 360;

/// Renders a static slide video with the narration audio.
pub struct SlideshowStrategy {
    ffmpeg: Ffmpeg,
}

impl SlideshowStrategy {
    pub fn new(ffmpeg: Ffmpeg) -> Self {
        Self { ffmpeg }
    }
}

/// Slide text: the leading part of the script, cut at a word boundary.
fn slide_text(script: &str) -> String {
    if script.len() <= SLIDE_TEXT_CHARS {
        return script.to_string();
    }
    let mut end = SLIDE_TEXT_CHARS;
    while !script.is_char_boundary(end) {
        end -= 1;
    }
    let head = &script[..end];
    let cut = head.rfind(char::is_whitespace).unwrap_or(end);
    format!("{}…", head[..cut].trim_end())
}

#[async_trait]
impl RenderStrategy for SlideshowStrategy {
    fn name(&self) -> &'static str {
        "slideshow"
    }

    fn is_configured(&self) -> bool {
        // ffmpeg presence is probed during the attempt; absence of a font or
        // binary is a hard failure of this strategy only.
        true
    }

    async fn attempt(&self, ctx: &RenderContext) -> RenderResult<RenderedArtifact> {
        // Fail before spawning anything when no usable font exists.
        find_font()?;

        let frame = ctx.work_dir.join("slide.png");
        annotated_still(&self.ffmpeg, &slide_text(&ctx.script), &ctx.work_dir, &frame).await?;

        let output = ctx.work_dir.join("slideshow.mp4");
        mux_still_with_audio(&self.ffmpeg, &frame, &ctx.audio_path, &output).await?;

        info!(output = %output.display(), "Slideshow render finished");
        Ok(RenderedArtifact {
            path: output,
            kind: ArtifactKind::Video,
        })
    }
}
