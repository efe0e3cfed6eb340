//! Chunked text-to-speech synthesis and audio assembly.

pub mod error;
pub mod split;
pub mod synth;
pub mod tts;

pub use error::{SpeechError, SpeechResult};
pub use split::{split_for_synthesis, DEFAULT_MAX_CHUNK_LEN};
pub use synth::SpeechSynthesizer;
pub use tts::{SpeechService, TtsClient, DEFAULT_VOICE_ID};
