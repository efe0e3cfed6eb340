//! Media error types.

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg binary not found on PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed (exit code {code:?}): {message}")]
    FfmpegFailed { message: String, code: Option<i32> },

    #[error("FFmpeg timed out after {0} seconds")]
    Timeout(u64),

    #[error("Expected output file missing: {0}")]
    OutputMissing(String),

    #[error("No usable system font found for text rendering")]
    FontNotFound,

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("All download candidates exhausted: {}", format_candidate_errors(.errors))]
    AllCandidatesFailed {
        /// Last error observed per candidate URL, in candidate order
        errors: Vec<(String, String)>,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn ffmpeg_failed(message: impl Into<String>, code: Option<i32>) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            code,
        }
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }
}

fn format_candidate_errors(errors: &[(String, String)]) -> String {
    errors
        .iter()
        .map(|(url, err)| format!("{url}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_candidates_error_lists_every_url() {
        let err = MediaError::AllCandidatesFailed {
            errors: vec![
                ("https://a.example.com/out.mp4".into(), "404 Not Found".into()),
                ("https://b.example.com/out.mp4".into(), "timed out".into()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.example.com"));
        assert!(msg.contains("b.example.com"));
        assert!(msg.contains("timed out"));
    }
}
