//! Text preparation for Open Graph cards.

use crate::application::text::{collapse_whitespace, truncate_with_ellipsis};

pub const TITLE_MAX_CHARS: usize = 80;
pub const SUBTITLE_MAX_CHARS: usize = 120;
pub const LINE_MAX_CHARS: usize = 28;
pub const MAX_TITLE_LINES: usize = 3;

/// Strip control characters, collapse whitespace and cap at 80 characters.
/// Falls back to `fallback` when nothing printable remains.
pub fn sanitize_title(raw: &str, fallback: &str) -> String {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return truncate_with_ellipsis(&clean(fallback), TITLE_MAX_CHARS);
    }
    truncate_with_ellipsis(&cleaned, TITLE_MAX_CHARS)
}

pub fn sanitize_subtitle(raw: &str) -> String {
    truncate_with_ellipsis(&clean(raw), SUBTITLE_MAX_CHARS)
}

/// Greedy word wrap into at most three lines of at most 28 characters.
///
/// Words longer than a line are hard-split. Text that does not fit ends the
/// last line with `...`.
pub fn wrap_title(title: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in title.split_whitespace() {
        for piece in split_long_word(word) {
            let needed = if current.is_empty() {
                piece.chars().count()
            } else {
                current.chars().count() + 1 + piece.chars().count()
            };
            if needed <= LINE_MAX_CHARS {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(&piece);
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > MAX_TITLE_LINES {
        let overflow = lines.split_off(MAX_TITLE_LINES - 1).join(" ");
        lines.push(truncate_with_ellipsis(&overflow, LINE_MAX_CHARS));
    }
    lines
}

fn split_long_word(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(LINE_MAX_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn clean(raw: &str) -> String {
    let without_controls: String = raw
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect();
    collapse_whitespace(&without_controls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let raw = "A very long article title that keeps going and going well past the limit of eighty characters";
        let title = sanitize_title(raw, "Site");
        assert!(title.chars().count() <= TITLE_MAX_CHARS);
        assert!(title.ends_with("..."));
        assert!(!title.ends_with(" ..."));
    }

    #[test]
    fn control_characters_and_whitespace_are_cleaned() {
        assert_eq!(sanitize_title("  Hello\u{0007}\n\tworld  ", "Site"), "Hello world");
    }

    #[test]
    fn empty_title_uses_fallback() {
        assert_eq!(sanitize_title(" \u{0000} ", "Ink Notes"), "Ink Notes");
    }

    #[test]
    fn short_titles_are_untouched() {
        assert_eq!(sanitize_title("Short", "Site"), "Short");
    }

    #[test]
    fn subtitles_use_longer_limit() {
        let raw = "word ".repeat(40);
        let subtitle = sanitize_subtitle(&raw);
        assert!(subtitle.chars().count() <= SUBTITLE_MAX_CHARS);
        assert!(subtitle.chars().count() > TITLE_MAX_CHARS);
    }

    #[test]
    fn wraps_into_lines_of_limited_width() {
        let lines = wrap_title("Understanding ownership and borrowing in Rust");
        assert_eq!(
            lines,
            vec![
                "Understanding ownership and".to_string(),
                "borrowing in Rust".to_string()
            ]
        );
    }

    #[test]
    fn overlong_words_are_hard_split() {
        let word = "x".repeat(40);
        let lines = wrap_title(&word);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), LINE_MAX_CHARS);
        assert_eq!(lines[1].chars().count(), 12);
    }

    #[test]
    fn overflow_is_capped_at_three_lines() {
        let title = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma";
        let lines = wrap_title(title);
        assert_eq!(lines.len(), MAX_TITLE_LINES);
        assert!(lines.iter().all(|line| line.chars().count() <= LINE_MAX_CHARS));
        assert!(lines[2].ends_with("..."));
    }
}
