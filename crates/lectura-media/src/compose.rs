//! Still-frame and mux helpers for the slideshow fallback.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::{Ffmpeg, FfmpegCommand};
use crate::error::{MediaError, MediaResult};

/// Background color for generated slides.
const SLIDE_BACKGROUND: &str = "0x1a1a2e";

/// Slide dimensions.
const SLIDE_SIZE: &str = "1280x720";

/// Font locations probed for drawtext, most common first.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

/// Locate a usable system font for text rendering.
pub fn find_font() -> MediaResult<PathBuf> {
    for candidate in FONT_CANDIDATES {
        let path = Path::new(candidate);
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }
    Err(MediaError::FontNotFound)
}

/// Generate a single still frame with the given text drawn over a solid
/// background.
///
/// The text goes through a textfile to sidestep drawtext escaping rules.
pub async fn annotated_still(
    ffmpeg: &Ffmpeg,
    text: &str,
    work_dir: &Path,
    output: &Path,
) -> MediaResult<PathBuf> {
    let font = find_font()?;

    let textfile = work_dir.join("slide_text.txt");
    tokio::fs::write(&textfile, text).await?;

    let filter = format!(
        "drawtext=fontfile={}:textfile={}:fontcolor=white:fontsize=40:\
         x=(w-text_w)/2:y=(h-text_h)/2:line_spacing=12",
        font.display(),
        textfile.display()
    );

    let cmd = FfmpegCommand::new(output)
        .input_with(
            ["-f", "lavfi"],
            format!("color=c={SLIDE_BACKGROUND}:s={SLIDE_SIZE}:d=1"),
        )
        .video_filter(filter)
        .single_frame();

    ffmpeg.run(&cmd).await?;
    debug!(output = %output.display(), "Generated annotated still frame");
    Ok(output.to_path_buf())
}

/// Mux one still image with an audio track into a video container.
///
/// The image is looped for the duration of the audio.
pub async fn mux_still_with_audio(
    ffmpeg: &Ffmpeg,
    image: &Path,
    audio: &Path,
    output: &Path,
) -> MediaResult<PathBuf> {
    let cmd = FfmpegCommand::new(output)
        .input_with(["-loop", "1"], image.to_string_lossy())
        .input(audio)
        .output_args([
            "-c:v", "libx264",
            "-tune", "stillimage",
            "-pix_fmt", "yuv420p",
            "-c:a", "aac",
            "-b:a", "192k",
        ])
        .shortest();

    ffmpeg.run(&cmd).await?;
    info!(output = %output.display(), "Muxed still frame with audio track");
    Ok(output.to_path_buf())
}

/// Concatenate audio files in order via the concat demuxer.
///
/// Tries stream copy first; falls back to re-encoding when the inputs do
/// not share codec parameters.
pub async fn concat_audio(
    ffmpeg: &Ffmpeg,
    parts: &[PathBuf],
    work_dir: &Path,
    output: &Path,
) -> MediaResult<PathBuf> {
    if parts.is_empty() {
        return Err(MediaError::ffmpeg_failed("no audio parts to concatenate", None));
    }

    let list_path = work_dir.join("concat_list.txt");
    let mut list = String::new();
    for part in parts {
        list.push_str(&format!("file '{}'\n", part.display()));
    }
    tokio::fs::write(&list_path, list).await?;

    let copy_cmd = FfmpegCommand::new(output)
        .input_with(["-f", "concat", "-safe", "0"], list_path.to_string_lossy())
        .output_args(["-c", "copy"]);

    match ffmpeg.run(&copy_cmd).await {
        Ok(()) => {}
        Err(MediaError::FfmpegNotFound) => return Err(MediaError::FfmpegNotFound),
        Err(e) => {
            debug!("Stream-copy concat failed ({e}), retrying with re-encode");
            let reencode_cmd = FfmpegCommand::new(output)
                .input_with(["-f", "concat", "-safe", "0"], list_path.to_string_lossy())
                .output_args(["-c:a", "libmp3lame", "-q:a", "2"]);
            ffmpeg.run(&reencode_cmd).await?;
        }
    }

    debug!(
        parts = parts.len(),
        output = %output.display(),
        "Concatenated audio parts"
    );
    Ok(output.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_concat_rejects_empty_input() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = Ffmpeg::new().with_program("ffmpeg-that-does-not-exist");

        let err = concat_audio(&ffmpeg, &[], dir.path(), &dir.path().join("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegFailed { .. }));
    }

    #[tokio::test]
    async fn test_concat_missing_binary_propagates() {
        let dir = TempDir::new().unwrap();
        let ffmpeg = Ffmpeg::new().with_program("ffmpeg-that-does-not-exist");
        let parts = vec![dir.path().join("part_000.mp3")];

        let err = concat_audio(&ffmpeg, &parts, dir.path(), &dir.path().join("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FfmpegNotFound));
    }
}
