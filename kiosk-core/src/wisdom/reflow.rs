//! Paragraph-aware re-wrapping of stored text.
//!
//! Fortune databases are wrapped for an 80-column terminal. The printer is
//! much narrower, so entries are first merged back into paragraphs and then
//! wrapped again at the printer width.

use itertools::Itertools;

/// Line width of the receipt printer.
pub const DEFAULT_WIDTH: usize = 32;

/// Merge line-wrapped text into paragraphs.
///
/// A line starting with a tab or `<` begins a new paragraph; every other line
/// is appended to the current one. Lines are trimmed and joined with single
/// spaces. The returned paragraphs are not newline terminated.
pub fn unwrap<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let Some((first, rest)) = lines.split_first() else {
        return Vec::new();
    };

    let mut paragraphs = Vec::new();
    let mut current = vec![first.as_ref().trim()];
    for line in rest {
        let line = line.as_ref();
        if line.starts_with('\t') || line.starts_with('<') {
            paragraphs.push(join(&current));
            current.clear();
        }
        current.push(line.trim());
    }
    paragraphs.push(join(&current));
    paragraphs
}

fn join(pieces: &[&str]) -> String {
    pieces.iter().filter(|piece| !piece.is_empty()).join(" ")
}

/// Wrap paragraphs into lines of at most `width` characters.
///
/// Lines break at the last space at or before the limit, or mid-word when a
/// word is longer than the whole line. Every returned line ends with `\n`
/// and each paragraph is followed by a blank line.
pub fn wrap<S: AsRef<str>>(paragraphs: &[S], width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in paragraphs {
        let mut rest = paragraph.as_ref();
        while rest.chars().count() > width {
            let (line, remainder) = break_line(rest, width);
            lines.push(format!("{line}\n"));
            rest = remainder;
        }
        if !rest.trim().is_empty() {
            lines.push(format!("{rest}\n"));
        }
        lines.push("\n".to_string());
    }
    lines
}

/// Split the first line off `text`, which is longer than `width` characters.
fn break_line(text: &str, width: usize) -> (&str, &str) {
    // Byte offset of the first character past the limit.
    let limit = text
        .char_indices()
        .nth(width)
        .map_or(text.len(), |(offset, _)| offset);

    if text[limit..].starts_with(' ') {
        (&text[..limit], &text[limit + 1..])
    } else if let Some(space) = text[..limit].rfind(' ') {
        (&text[..space], &text[space + 1..])
    } else {
        (&text[..limit], &text[limit..])
    }
}
