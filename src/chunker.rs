/// Default per-call input limit of the translation models, in characters.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 512;

/// Splits `text` into whitespace-delimited chunks of at most `max_length`
/// characters.
///
/// Words are never split: a word longer than `max_length` occupies a chunk of
/// its own. Joining the chunks with single spaces yields the input's words in
/// order with whitespace collapsed.
pub fn chunk_text(text: &str, max_length: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
            continue;
        }
        if current_len + 1 + word_len <= max_length {
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
