//! Remote render grid strategy.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use lectura_media::{download_first_available, DownloadOptions};

use crate::error::{RenderError, RenderResult};
use crate::grid::GridClient;
use crate::strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};

/// Renders the composition on the external grid and downloads the result.
pub struct RemoteGridStrategy {
    grid: Option<GridClient>,
    client: reqwest::Client,
    download_options: DownloadOptions,
}

impl RemoteGridStrategy {
    pub fn new(grid: Option<GridClient>) -> Self {
        Self {
            grid,
            client: reqwest::Client::new(),
            download_options: DownloadOptions::default(),
        }
    }

    pub fn with_download_options(mut self, options: DownloadOptions) -> Self {
        self.download_options = options;
        self
    }
}

#[async_trait]
impl RenderStrategy for RemoteGridStrategy {
    fn name(&self) -> &'static str {
        "remote_grid"
    }

    fn is_configured(&self) -> bool {
        self.grid.is_some()
    }

    async fn attempt(&self, ctx: &RenderContext) -> RenderResult<RenderedArtifact> {
        let grid = self
            .grid
            .as_ref()
            .ok_or_else(|| RenderError::unusable("render grid not configured"))?;

        // The grid reads inputs over the network; without an addressable
        // audio URL there is nothing it can render.
        let audio_url = ctx
            .audio_url
            .as_ref()
            .ok_or_else(|| RenderError::unusable("narration audio has no network URL"))?;

        let input_props = json!({
            "script": ctx.script,
            "audio_url": audio_url,
            "media": ctx.media,
        });

        let render_id = grid.submit(&input_props).await?;
        let progress = grid.wait_until_done(&render_id).await?;

        // Primary path: the grid reports its own output location. The
        // candidate list exists for grids that do not.
        let candidates = match progress.output_url {
            Some(url) => vec![url],
            None => {
                warn!(render_id = %render_id, "Grid did not report an output URL; guessing candidates");
                grid.candidate_urls(&render_id)
            }
        };

        let dest = ctx.work_dir.join("remote_render.mp4");
        let path =
            download_first_available(&self.client, &candidates, &self.download_options, &dest)
                .await?;

        info!(render_id = %render_id, path = %path.display(), "Remote render downloaded");
        Ok(RenderedArtifact {
            path,
            kind: ArtifactKind::Video,
        })
    }
}
