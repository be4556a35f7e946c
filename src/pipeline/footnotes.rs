//! Footnote label prefixing.

use super::result::PipelineStats;
use super::Stage;
use crate::model::Document;
use crate::parser::SourceFacts;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static FOOTNOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^([^\]\s]+)\]").expect("valid footnote regex"));

/// Prefixes footnote labels so they stay unique once several chapters are
/// assembled into one book.
#[derive(Debug, Clone)]
pub struct FootnotePrefixer {
    prefix: String,
}

impl FootnotePrefixer {
    /// Create a prefixer for one chapter.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Rewrite `[^label]` (references and definitions) to
    /// `[^prefix-label]`. Labels already prefixed are kept.
    pub fn prefix(&self, text: &str, stats: &mut PipelineStats) -> String {
        let marker = format!("{}-", self.prefix);
        FOOTNOTE
            .replace_all(text, |caps: &Captures| {
                let label = &caps[1];
                if label.starts_with(&marker) {
                    caps[0].to_string()
                } else {
                    stats.footnotes_prefixed += 1;
                    format!("[^{}{}]", marker, label)
                }
            })
            .into_owned()
    }
}

impl Stage for FootnotePrefixer {
    fn name(&self) -> &'static str {
        "footnotes"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.prefix(doc.as_str(), stats))
    }
}

/// Prefix every footnote label with `prefix-`.
pub fn prefix_footnote_labels(text: &str, prefix: &str) -> String {
    FootnotePrefixer::new(prefix).prefix(text, &mut PipelineStats::default())
}
