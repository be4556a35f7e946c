//! Full-line comment extraction.

use crate::model::CommentBlock;

/// Extract comment blocks and their anchors, in source order.
///
/// A line belongs to a comment block when, after leading whitespace, it
/// starts with `marker`. Consecutive comment lines merge into one block.
/// The anchor is the next line that is neither blank nor a comment,
/// trimmed and cut to `anchor_len` characters.
pub fn extract_comments(source: &str, marker: char, anchor_len: usize) -> Vec<CommentBlock> {
    let lines: Vec<&str> = source.lines().collect();
    let is_comment = |line: &str| line.trim_start().starts_with(marker);

    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if !is_comment(lines[i]) {
            i += 1;
            continue;
        }

        let mut body: Vec<&str> = Vec::new();
        while i < lines.len() && is_comment(lines[i]) {
            body.push(strip_marker(lines[i], marker));
            i += 1;
        }

        let text = body.join("\n").trim().to_string();
        if text.is_empty() {
            continue;
        }

        let anchor = lines[i..]
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty() && !line.starts_with(marker))
            .map(|line| truncate_chars(line, anchor_len).trim().to_string())
            .unwrap_or_default();

        blocks.push(CommentBlock::new(text, anchor));
    }

    log::debug!("Extracted {} comment blocks", blocks.len());
    blocks
}

/// Strip leading whitespace, the run of markers and at most one space.
fn strip_marker(line: &str, marker: char) -> &str {
    let rest = line.trim_start().trim_start_matches(marker);
    rest.strip_prefix(' ').unwrap_or(rest)
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
