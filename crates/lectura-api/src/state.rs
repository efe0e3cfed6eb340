//! Application state.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use lectura_media::Ffmpeg;
use lectura_pipeline::Pipeline;
use lectura_render::{GridClient, GridConfig, LocalRendererConfig, RenderChain};
use lectura_speech::{SpeechSynthesizer, TtsClient, DEFAULT_VOICE_ID};
use lectura_storage::StorageClient;
use lectura_store::JobStore;
use lectura_visuals::StockMediaClient;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: JobStore,
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create new application state.
    ///
    /// Speech and storage are mandatory; the grid, local renderer, and
    /// visuals are optional and merely narrow the render chain when absent.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = JobStore::from_env().await?;
        let speech_client = TtsClient::from_env()?;
        let publisher = Arc::new(StorageClient::from_env()?);

        let ffmpeg = Ffmpeg::new();
        let speech = SpeechSynthesizer::new(Arc::new(speech_client), ffmpeg.clone());

        let grid = GridConfig::from_env().map(GridClient::new);
        if grid.is_none() {
            info!("Render grid not configured; remote render strategy disabled");
        }

        let local = LocalRendererConfig::from_env();
        if local.is_none() {
            info!("Local renderer not configured; local render strategy disabled");
        }

        let visuals = match StockMediaClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("Media search disabled: {e}");
                None
            }
        };

        let chain = RenderChain::standard(grid, local, ffmpeg);

        let voice_id =
            std::env::var("TTS_VOICE_ID").unwrap_or_else(|_| DEFAULT_VOICE_ID.to_string());

        let pipeline = Arc::new(Pipeline::new(
            store.clone(),
            speech,
            visuals,
            chain,
            publisher,
            PathBuf::from(&config.work_dir),
            voice_id,
        ));

        Ok(Self {
            config,
            store,
            pipeline,
        })
    }
}
