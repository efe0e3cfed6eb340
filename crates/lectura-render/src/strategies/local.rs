//! Local in-process renderer strategy.
//!
//! Runs the bundled composition renderer as a subprocess. The renderer's
//! entry script can go missing in fresh deployments; it is then synthesized
//! from a known-good template before the render is retried.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{RenderError, RenderResult};
use crate::strategy::{ArtifactKind, RenderContext, RenderedArtifact, RenderStrategy};

/// Known-good renderer entry script, written when the deployed one is missing.
const ENTRY_TEMPLATE: &str = include_str!("render_entry.template.js");

/// Local renderer configuration.
#[derive(Debug, Clone)]
pub struct LocalRendererConfig {
    /// Interpreter/engine to run the entry script with (e.g. `node`)
    pub program: String,
    /// Path to the renderer entry script
    pub entry: PathBuf,
}

impl LocalRendererConfig {
    /// Create from `LOCAL_RENDERER_PROGRAM` / `LOCAL_RENDERER_ENTRY`.
    /// `None` when no local renderer is deployed.
    pub fn from_env() -> Option<Self> {
        let program = std::env::var("LOCAL_RENDERER_PROGRAM").ok()?;
        let entry = std::env::var("LOCAL_RENDERER_ENTRY").ok()?;
        Some(Self {
            program,
            entry: PathBuf::from(entry),
        })
    }
}

/// Renders the composition with a locally deployed engine.
pub struct LocalRenderStrategy {
    config: Option<LocalRendererConfig>,
}

impl LocalRenderStrategy {
    pub fn new(config: Option<LocalRendererConfig>) -> Self {
        Self { config }
    }

    async fn run_renderer(
        &self,
        config: &LocalRendererConfig,
        props_path: &std::path::Path,
        output: &std::path::Path,
    ) -> RenderResult<()> {
        debug!(
            program = %config.program,
            entry = %config.entry.display(),
            "Invoking local renderer"
        );

        let out = Command::new(&config.program)
            .arg(&config.entry)
            .arg("--props")
            .arg(props_path)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| RenderError::strategy_failed(format!("failed to spawn renderer: {e}")))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(RenderError::strategy_failed(format!(
                "renderer exited with {:?}: {}",
                out.status.code(),
                stderr.lines().last().unwrap_or("no output")
            )));
        }

        if !output.exists() {
            return Err(RenderError::strategy_failed(
                "renderer reported success but produced no output file",
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl RenderStrategy for LocalRenderStrategy {
    fn name(&self) -> &'static str {
        "local_renderer"
    }

    fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    async fn attempt(&self, ctx: &RenderContext) -> RenderResult<RenderedArtifact> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| RenderError::unusable("local renderer not configured"))?;

        let props_path = ctx.work_dir.join("render_props.json");
        let props = json!({
            "script": ctx.script,
            "audio": ctx.audio_path,
            "media": ctx.media,
        });
        tokio::fs::write(&props_path, serde_json::to_vec(&props)?).await?;

        let output = ctx.work_dir.join("local_render.mp4");

        if !config.entry.exists() {
            warn!(
                entry = %config.entry.display(),
                "Renderer entry script missing; synthesizing from template"
            );
            if let Some(parent) = config.entry.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&config.entry, ENTRY_TEMPLATE).await?;
        }

        match self.run_renderer(config, &props_path, &output).await {
            Ok(()) => {}
            Err(first_err) => {
                // One retry after rewriting the entry from the template,
                // which also covers a corrupted entry script.
                warn!(error = %first_err, "Local render failed; rewriting entry and retrying once");
                tokio::fs::write(&config.entry, ENTRY_TEMPLATE).await?;
                self.run_renderer(config, &props_path, &output).await?;
            }
        }

        info!(output = %output.display(), "Local render finished");
        Ok(RenderedArtifact {
            path: output,
            kind: ArtifactKind::Video,
        })
    }
}
