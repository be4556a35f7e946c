//! Comment blocks mined from the source.

use serde::{Deserialize, Serialize};

/// A run of consecutive source comment lines and the text that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentBlock {
    /// Comment body, markers stripped, lines joined with `\n`
    pub text: String,

    /// Excerpt of the next non-comment, non-blank source line
    /// (empty when the comment ends the document)
    pub anchor: String,
}

impl CommentBlock {
    /// Create a new comment block.
    pub fn new(text: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: anchor.into(),
        }
    }

    /// Check whether the block has a position in the source.
    pub fn is_anchored(&self) -> bool {
        !self.anchor.is_empty()
    }

    /// Render as a single-line HTML comment (without line terminator).
    pub fn render(&self) -> String {
        format!("<!-- {} -->", escape_html_comment(&self.text))
    }
}

/// Escape text so it cannot terminate an HTML comment early.
pub fn escape_html_comment(text: &str) -> String {
    text.replace("--", "- -").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let block = CommentBlock::new("A revoir", "Le taux normal");
        assert_eq!(block.render(), "<!-- A revoir -->");
        assert!(block.is_anchored());
    }

    #[test]
    fn test_escape_double_dash_and_bracket() {
        assert_eq!(escape_html_comment("a -- b -> c"), "a - - b -&gt; c");
        assert_eq!(escape_html_comment("x-->y"), "x- -&gt;y");
    }

    #[test]
    fn test_unanchored() {
        assert!(!CommentBlock::new("fin", "").is_anchored());
    }
}
