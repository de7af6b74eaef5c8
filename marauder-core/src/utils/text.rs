//! Char-based clipping helpers. Limits throughout the agent count Unicode
//! scalar values, never bytes, so a cut never lands inside a character.

/// The first `max_chars` chars of `text`.
pub fn clip_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text.get(..byte_index).unwrap_or(text),
        None => text,
    }
}

/// The last `max_chars` chars of `text`.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    match text.char_indices().nth(total - max_chars) {
        Some((byte_index, _)) => text.get(byte_index..).unwrap_or(text),
        None => text,
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// `text` clipped to `max_chars` with `suffix` appended when anything was cut.
pub fn clip_with_suffix(text: &str, max_chars: usize, suffix: &str) -> String {
    let clipped = clip_chars(text, max_chars);
    if clipped.len() == text.len() {
        text.to_owned()
    } else {
        format!("{clipped}{suffix}")
    }
}
