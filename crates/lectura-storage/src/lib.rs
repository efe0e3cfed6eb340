//! Object storage publisher for lecture artifacts.

pub mod client;
pub mod error;

pub use client::{
    artifact_key, ArtifactPublisher, StorageClient, StorageConfig, AUDIO_KEY_PREFIX,
    VIDEO_KEY_PREFIX,
};
pub use error::{StorageError, StorageResult};
