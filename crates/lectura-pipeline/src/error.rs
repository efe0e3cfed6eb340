//! Pipeline error types.
//!
//! Stages return their own errors; this enum is where the orchestrator
//! collects them and decides what the user-facing failure message says.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Speech error: {0}")]
    Speech(#[from] lectura_speech::SpeechError),

    #[error("Render error: {0}")]
    Render(#[from] lectura_render::RenderError),

    #[error("Storage error: {0}")]
    Storage(#[from] lectura_storage::StorageError),

    #[error("Store error: {0}")]
    Store(#[from] lectura_store::StoreError),

    #[error("Job exceeded the {0}s processing deadline")]
    DeadlineExceeded(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Actionable message for the job's `error` field.
    ///
    /// Distinguishes configuration problems (operator must act) from
    /// transient or environmental ones; never a raw debug dump.
    pub fn user_message(&self) -> String {
        use lectura_speech::SpeechError;
        use lectura_storage::StorageError;

        match self {
            PipelineError::Speech(SpeechError::Config(msg)) => {
                format!("Speech service is not configured: {msg}")
            }
            PipelineError::Speech(e) => {
                format!("Speech synthesis failed: {e}")
            }
            PipelineError::Storage(e) if e.is_config() => {
                format!("Artifact storage is not configured: {e}")
            }
            PipelineError::Storage(StorageError::UrlUnresolved(detail)) => {
                format!("Artifact was uploaded but no retrievable URL could be resolved: {detail}")
            }
            PipelineError::Storage(e) => {
                format!("Artifact publish failed: {e}")
            }
            PipelineError::Render(e) => {
                format!("Rendering failed: {e}")
            }
            PipelineError::Store(e) => {
                format!("Job state could not be persisted: {e}")
            }
            PipelineError::DeadlineExceeded(secs) => {
                format!("Processing did not finish within {secs} seconds and was abandoned")
            }
            PipelineError::Io(e) => {
                format!("Pipeline environment error: {e}")
            }
        }
    }
}
