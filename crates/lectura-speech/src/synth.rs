//! Script-to-audio synthesis.
//!
//! Chunks the script, synthesizes each chunk through the TTS provider, and
//! concatenates the parts into one playable audio file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use lectura_media::{concat_audio, Ffmpeg};

use crate::error::{SpeechError, SpeechResult};
use crate::split::{split_for_synthesis, DEFAULT_MAX_CHUNK_LEN};
use crate::tts::SpeechService;

/// Turns arbitrary-length script text into one audio artifact.
pub struct SpeechSynthesizer {
    service: Arc<dyn SpeechService>,
    ffmpeg: Ffmpeg,
    max_chunk_len: usize,
}

impl SpeechSynthesizer {
    pub fn new(service: Arc<dyn SpeechService>, ffmpeg: Ffmpeg) -> Self {
        Self {
            service,
            ffmpeg,
            max_chunk_len: DEFAULT_MAX_CHUNK_LEN,
        }
    }

    pub fn with_max_chunk_len(mut self, max_chunk_len: usize) -> Self {
        self.max_chunk_len = max_chunk_len;
        self
    }

    /// Synthesize a full script into a single audio file under `work_dir`.
    ///
    /// Synthesis errors propagate: there is no fallback for missing audio.
    /// Concatenation failure degrades to the first chunk alone, which keeps
    /// the job alive at reduced fidelity.
    pub async fn synthesize_script(
        &self,
        script: &str,
        voice_id: &str,
        work_dir: &Path,
    ) -> SpeechResult<PathBuf> {
        let chunks = split_for_synthesis(script, self.max_chunk_len);
        info!(chunks = chunks.len(), voice_id, "Synthesizing script");

        let mut part_paths = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let audio = self.service.synthesize(chunk, voice_id).await?;
            if audio.is_empty() {
                return Err(SpeechError::EmptyAudio(i));
            }

            let part_path = work_dir.join(format!("part_{i:03}.mp3"));
            tokio::fs::write(&part_path, &audio).await?;
            part_paths.push(part_path);
        }

        if part_paths.len() == 1 {
            return Ok(part_paths.into_iter().next().unwrap_or_default());
        }

        let combined = work_dir.join("narration.mp3");
        match concat_audio(&self.ffmpeg, &part_paths, work_dir, &combined).await {
            Ok(path) => Ok(path),
            Err(e) => {
                // Deliberate lossy fallback: a truncated narration beats a
                // dead job, but it must be visible in the logs.
                warn!(
                    parts = part_paths.len(),
                    error = %e,
                    "Audio concatenation failed; continuing with first chunk only"
                );
                Ok(part_paths.into_iter().next().unwrap_or_default())
            }
        }
    }
}
