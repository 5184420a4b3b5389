//! Splitting raw text into lines
//!
//! Text using `\n` (optionally `\r\n`) terminators is split the way
//! [`str::lines`] does it. Text that only uses bare `\r` terminators is
//! split on `\r`. A trailing terminator never produces an empty last line,
//! and an empty text has no lines at all.

/// Split `text` into lines with normalized line endings
///
/// # Examples
///
/// ```rust
/// use diffview::tokenize::split_lines;
///
/// assert_eq!(split_lines("a\r\nb\n"), vec!["a", "b"]);
/// assert_eq!(split_lines("a\rb"), vec!["a", "b"]);
/// assert!(split_lines("").is_empty());
/// ```
pub fn split_lines(text: &str) -> Vec<&str> {
    if text.contains('\n') || !text.contains('\r') {
        return text.lines().collect();
    }

    let text = text.strip_suffix('\r').unwrap_or(text);
    text.split('\r').collect()
}
