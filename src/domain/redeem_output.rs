//! Helpers for reading the redemption script's captured output.

/// Characters of stderr kept when logging a failed redemption.
pub const STDERR_PREVIEW_CHARS: usize = 200;

/// Output lines that look like they mention a transaction hash.
///
/// This is a display hint for the operator. It says nothing about whether the
/// transaction was mined.
pub fn tx_hint_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.to_lowercase().contains("hash") || line.contains("0x"))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// First `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
