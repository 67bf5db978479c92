//! Splitting of long text into backend-sized chunks.

/// Default maximum chunk length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Split `text` into consecutive chunks of at most `max_chars` characters.
///
/// Boundaries fall on character counts only, never on words. Concatenating
/// the result gives back `text`; empty input gives no chunks. A bound of 0 is
/// treated as 1.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == max_chars {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}
