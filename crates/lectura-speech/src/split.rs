//! Script chunking for synthesis.
//!
//! TTS providers cap request length, so long scripts are split into ordered
//! chunks. Within the tail of each window the splitter prefers a sentence
//! terminator, then a paragraph break, so chunks rarely cut mid-sentence;
//! the raw window boundary guarantees forward progress on degenerate input
//! with no natural breaks at all.

/// Default maximum chunk length in bytes.
pub const DEFAULT_MAX_CHUNK_LEN: usize = 4000;

/// How far back from the window boundary to look for a natural break.
const BREAK_SCAN_WINDOW: usize = 200;

/// Split a script into ordered synthesis chunks.
///
/// Concatenating the returned chunks reconstructs the input exactly: break
/// characters stay with the chunk they terminate.
pub fn split_for_synthesis(text: &str, max_chunk_len: usize) -> Vec<String> {
    assert!(max_chunk_len > 0, "max_chunk_len must be positive");

    if text.len() <= max_chunk_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let remaining = &text[start..];
        if remaining.len() <= max_chunk_len {
            chunks.push(remaining.to_string());
            break;
        }

        let window_end = floor_char_boundary(remaining, max_chunk_len);
        let window = &remaining[..window_end];

        let scan_start = floor_char_boundary(window, window.len().saturating_sub(BREAK_SCAN_WINDOW));
        let tail = &window[scan_start..];

        // Prefer a sentence terminator, then a paragraph break, then the
        // raw boundary. Break characters are kept in the current chunk.
        let cut = if let Some(pos) = tail.rfind(". ") {
            scan_start + pos + 2
        } else if let Some(pos) = tail.rfind("\n\n") {
            scan_start + pos + 2
        } else {
            window.len()
        };

        chunks.push(remaining[..cut].to_string());
        start += cut;
    }

    chunks
}

/// Largest index `<= at` that lies on a char boundary.
fn floor_char_boundary(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    let mut idx = at;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}
