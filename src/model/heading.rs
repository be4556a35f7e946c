//! Markdown heading lines.

/// Deepest heading level Markdown supports.
pub const MAX_HEADING_DEPTH: u8 = 6;

/// A line of the form `#{1,6} text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingNode<'a> {
    /// Number of leading `#` characters
    pub depth: u8,

    /// Text after the separating whitespace character
    pub text: &'a str,
}

impl<'a> HeadingNode<'a> {
    /// Parse a heading line: 1 to 6 `#` followed by one whitespace
    /// character. Returns `None` for anything else, including seven or more
    /// `#`.
    pub fn parse(line: &'a str) -> Option<Self> {
        let depth = line.bytes().take_while(|&b| b == b'#').count();
        if depth == 0 || depth > MAX_HEADING_DEPTH as usize {
            return None;
        }
        let rest = &line[depth..];
        let sep = rest.chars().next().filter(|c| c.is_whitespace())?;
        Some(Self {
            depth: depth as u8,
            text: &rest[sep.len_utf8()..],
        })
    }

    /// Check whether a line is a heading.
    pub fn is_heading(line: &str) -> bool {
        HeadingNode::parse(line).is_some()
    }

    /// Same heading at another depth.
    pub fn with_depth(self, depth: u8) -> Self {
        Self { depth, ..self }
    }

    /// Render back to a line.
    pub fn render(&self) -> String {
        format!("{} {}", "#".repeat(self.depth as usize), self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heading() {
        let h = HeadingNode::parse("## Les impôts").unwrap();
        assert_eq!(h.depth, 2);
        assert_eq!(h.text, "Les impôts");
    }

    #[test]
    fn test_not_headings() {
        assert!(HeadingNode::parse("#hashtag").is_none());
        assert!(HeadingNode::parse("####### Seven").is_none());
        assert!(HeadingNode::parse("text # not").is_none());
        assert!(HeadingNode::parse("").is_none());
    }

    #[test]
    fn test_is_heading() {
        let line = format!("{} Section", "#".repeat(2));
        assert!(HeadingNode::is_heading(&line));
        assert!(HeadingNode::is_heading("###### Six"));
        assert!(!HeadingNode::is_heading("Paragraphe"));
        assert!(!HeadingNode::is_heading("#sans espace"));
    }

    #[test]
    fn test_empty_heading_text() {
        let h = HeadingNode::parse("# ").unwrap();
        assert_eq!(h.text, "");
    }

    #[test]
    fn test_render_with_depth() {
        let h = HeadingNode::parse("# Titre {#sec:titre}").unwrap();
        assert_eq!(h.with_depth(3).render(), "### Titre {#sec:titre}");
    }
}
