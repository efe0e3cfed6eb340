//! FFmpeg CLI wrapper and resilient download helpers.

pub mod command;
pub mod compose;
pub mod download;
pub mod error;

pub use command::{check_ffmpeg, Ffmpeg, FfmpegCommand};
pub use compose::{annotated_still, concat_audio, find_font, mux_still_with_audio, FONT_CANDIDATES};
pub use download::{download_first_available, DownloadOptions, CANDIDATE_RETRY_DELAY};
pub use error::{MediaError, MediaResult};
