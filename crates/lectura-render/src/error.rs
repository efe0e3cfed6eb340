//! Render error types.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render grid reported a fatal error: {0}")]
    GridFatal(String),

    #[error("Render grid did not finish within {0} seconds")]
    GridTimeout(u64),

    #[error("Render grid error: {0}")]
    Grid(String),

    #[error("Strategy not usable: {0}")]
    Unusable(String),

    #[error("Render strategy failed: {0}")]
    StrategyFailed(String),

    #[error("Produced video is implausibly small ({size} bytes, minimum {min})")]
    ImplausibleOutput { size: u64, min: u64 },

    #[error("All render strategies exhausted")]
    Exhausted,

    #[error("Render configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Media error: {0}")]
    Media(#[from] lectura_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn grid(msg: impl Into<String>) -> Self {
        Self::Grid(msg.into())
    }

    pub fn unusable(msg: impl Into<String>) -> Self {
        Self::Unusable(msg.into())
    }

    pub fn strategy_failed(msg: impl Into<String>) -> Self {
        Self::StrategyFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
