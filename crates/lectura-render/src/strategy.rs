//! Render strategy contract.

use std::path::PathBuf;

use async_trait::async_trait;

use lectura_models::MediaItem;

use crate::error::RenderResult;

/// Kind of artifact a strategy produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Video,
    Audio,
}

/// Output of a successful render attempt.
#[derive(Debug, Clone)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

/// Inputs shared by every render strategy.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Narration script
    pub script: String,
    /// Scene media fetched for the script; may be empty
    pub media: Vec<MediaItem>,
    /// Synthesized narration audio on the local filesystem
    pub audio_path: PathBuf,
    /// Network-addressable location of the narration audio, when available
    /// (required by the remote grid, which cannot read local files)
    pub audio_url: Option<String>,
    /// Scratch directory owned by this pipeline execution
    pub work_dir: PathBuf,
}

/// One way of producing the final artifact.
///
/// Strategies report failure through errors; classifying a failure as soft
/// or fatal is the chain driver's and orchestrator's business, not theirs.
#[async_trait]
pub trait RenderStrategy: Send + Sync {
    /// Stable name used in attempt traces and logs.
    fn name(&self) -> &'static str;

    /// Whether the strategy's external configuration is present. Unconfigured
    /// strategies are skipped entirely, not attempted.
    fn is_configured(&self) -> bool;

    /// Try to produce an artifact.
    async fn attempt(&self, ctx: &RenderContext) -> RenderResult<RenderedArtifact>;
}
