/// Largest message the chat surface accepts, in characters.
pub const MESSAGE_CHUNK_SIZE: usize = 2000;

/// Splits `text` into consecutive slices of at most `size` characters.
///
/// Boundaries fall on character offsets only; words may be split. Empty
/// input yields no chunks.
pub fn split_chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == size {
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
