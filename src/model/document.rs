//! Document-level types.

use crate::detect::normalize_text;

/// An immutable text buffer.
///
/// Every pipeline stage reads one `Document` and produces a new one, so the
/// input of a stage is always available again if a later stage needs to be
/// re-run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
}

impl Document {
    /// Wrap text as-is.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Wrap text after normalizing line endings and Unicode form.
    pub fn normalized(text: &str) -> Self {
        Self {
            text: normalize_text(text),
        }
    }

    /// Full text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consume the document and return its text.
    pub fn into_string(self) -> String {
        self.text
    }

    /// Lines split on `\n`. A trailing newline yields a final empty line.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }

    /// Lines with their terminators kept. A trailing newline does not yield
    /// an extra line.
    pub fn lines_with_endings(&self) -> Vec<&str> {
        self.text.split_inclusive('\n').collect()
    }

    /// Check if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_trailing_empty() {
        let doc = Document::new("# A\n\ntext\n");
        assert_eq!(doc.lines(), vec!["# A", "", "text", ""]);
    }

    #[test]
    fn test_lines_with_endings() {
        let doc = Document::new("a\nb\n");
        assert_eq!(doc.lines_with_endings(), vec!["a\n", "b\n"]);
        let doc = Document::new("a\nb");
        assert_eq!(doc.lines_with_endings(), vec!["a\n", "b"]);
    }

    #[test]
    fn test_normalized() {
        let doc = Document::normalized("Taux\r\nr\u{0065}\u{0301}duit");
        assert_eq!(doc.as_str(), "Taux\nr\u{00E9}duit");
    }
}
