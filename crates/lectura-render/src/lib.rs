//! Ordered render strategy chain for lecture video assembly.
//!
//! Four strategies are tried in order until one produces an artifact:
//! remote render grid, local renderer, ffmpeg slideshow, audio-only. The
//! audio-only fallback is always available, so a job can only fail for
//! lack of audio, never for lack of video.

pub mod chain;
pub mod error;
pub mod grid;
pub mod strategies;
pub mod strategy;

pub use chain::{RenderChain, MIN_PLAUSIBLE_VIDEO_BYTES};
pub use error::{RenderError, RenderResult};
pub use grid::{GridClient, GridConfig, GridProgress, LECTURE_COMPOSITION};
pub use strategies::{
    AudioOnlyStrategy, LocalRenderStrategy, LocalRendererConfig, RemoteGridStrategy,
    SlideshowStrategy,
};
pub use strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};
