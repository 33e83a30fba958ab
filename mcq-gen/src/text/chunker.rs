//! Word-aligned chunking of source text for generation requests.

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Split text into chunks of at most `max_size` characters.
///
/// Words are never broken: text is split on whitespace and words are
/// greedily packed, joined by single spaces, until the next word would push
/// the joined length past `max_size`. A word that is longer than `max_size`
/// on its own is emitted as a chunk by itself.
///
/// # Arguments
/// * `text` - The text to chunk
/// * `max_size` - Maximum chunk length in characters, must be > 0
///
/// # Returns
/// Chunks in source order. Empty or whitespace-only text yields no chunks.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    debug_assert!(max_size > 0, "max_size must be positive");

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_size {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
