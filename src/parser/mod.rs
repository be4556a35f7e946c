//! Source fact mining.
//!
//! The LaTeX source is scanned once, before the transducer runs, for facts
//! the transducer loses: full-line comments with the text they precede, and
//! the caption each `\label` belongs to.

mod captions;
mod comments;
mod options;

pub use captions::{scan_title, CaptionScanner, TitleScan};
pub use comments::extract_comments;
pub use options::MinerOptions;

use crate::detect::normalize_text;
use crate::error::Result;
use crate::model::{CommentBlock, LabelCaptionMap};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static DEFAULT_CAPTIONS: LazyLock<CaptionScanner> = LazyLock::new(|| {
    CaptionScanner::new(&MinerOptions::default()).expect("valid default caption regex")
});

/// Facts mined from one source document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFacts {
    /// Comment blocks in source order
    pub comments: Vec<CommentBlock>,

    /// Cross-reference key to caption
    pub captions: LabelCaptionMap,
}

impl SourceFacts {
    /// Check if nothing was mined.
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty() && self.captions.is_empty()
    }
}

/// Mines [`SourceFacts`] from LaTeX source text.
#[derive(Debug, Clone)]
pub struct SourceMiner {
    options: MinerOptions,
    captions: CaptionScanner,
}

impl SourceMiner {
    /// Create a miner with default options.
    pub fn new() -> Self {
        Self {
            options: MinerOptions::default(),
            captions: DEFAULT_CAPTIONS.clone(),
        }
    }

    /// Create a miner with custom options.
    ///
    /// # Errors
    /// Returns `Error::InvalidPattern` if the configured command or
    /// environment names do not form a valid pattern.
    pub fn with_options(options: MinerOptions) -> Result<Self> {
        let captions = CaptionScanner::new(&options)?;
        Ok(Self { options, captions })
    }

    /// Get the miner options.
    pub fn options(&self) -> &MinerOptions {
        &self.options
    }

    /// Mine comments and captions from source text.
    ///
    /// The text is normalized first so anchors compare equal to the
    /// normalized draft.
    pub fn mine(&self, source: &str) -> SourceFacts {
        let text = normalize_text(source);
        SourceFacts {
            comments: extract_comments(&text, self.options.comment_marker, self.options.anchor_len),
            captions: self.captions.scan(&text),
        }
    }
}

impl Default for SourceMiner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "\\section{La TVA}\n\
% Source : DGFiP\n\
La TVA a été créée en 1954.\n\
\\begin{tab}[h]{Taux de TVA\\label{table:tva}}\n\
\\end{tab}\n";

    #[test]
    fn test_mine() {
        let facts = SourceMiner::new().mine(SOURCE);
        assert_eq!(facts.comments.len(), 1);
        assert_eq!(facts.comments[0].text, "Source : DGFiP");
        assert_eq!(facts.comments[0].anchor, "La TVA a été créée en 1954.");
        assert_eq!(facts.captions.get("table:tva"), Some("Taux de TVA"));
        assert!(!facts.is_empty());
    }

    #[test]
    fn test_mine_normalizes_crlf() {
        let facts = SourceMiner::new().mine("% note\r\nSuite\r\n");
        assert_eq!(facts.comments[0].anchor, "Suite");
    }

    #[test]
    fn test_default_matches_explicit_options() {
        let explicit = SourceMiner::with_options(MinerOptions::default()).unwrap();
        assert_eq!(SourceMiner::new().mine(SOURCE), explicit.mine(SOURCE));
        assert_eq!(SourceMiner::default().options().anchor_len, explicit.options().anchor_len);
    }

    #[test]
    fn test_custom_options() {
        let miner = SourceMiner::with_options(MinerOptions::new().with_anchor_len(6)).unwrap();
        let facts = miner.mine(SOURCE);
        assert_eq!(facts.comments[0].anchor, "La TVA");
    }
}
