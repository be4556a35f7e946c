//! Pipeline result with statistics.

use serde::{Deserialize, Serialize};

/// Result of running the pipeline on one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// The repaired document text
    pub content: String,

    /// What each stage changed
    pub stats: PipelineStats,
}

impl PipelineResult {
    /// Create a new pipeline result.
    pub fn new(content: String, stats: PipelineStats) -> Self {
        Self { content, stats }
    }

    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Counters collected while repairing a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Comments inserted before their anchor line
    pub comments_anchored: u32,

    /// Comments appended because their anchor was empty or not found
    pub comments_appended: u32,

    /// Reference links rewritten with a caption
    pub references_rewritten: u32,

    /// Reference links whose key has no caption
    pub references_unresolved: u32,

    /// Attribute blocks reduced to their anchor
    pub attribute_blocks_simplified: u32,

    /// Heading lines demoted
    pub headings_shifted: u32,

    /// Placeholders inserted under empty headings
    pub placeholders_inserted: u32,

    /// Raw tabular blocks rebuilt
    pub tables_repaired: u32,

    /// Rebuilt tables flagged as likely malformed
    pub tables_flagged: u32,

    /// Footnote labels prefixed
    pub footnotes_prefixed: u32,

    /// Legislation phrases linked to a citation
    pub citations_linked: u32,

    /// Table blocks replaced by generated tables
    pub tables_replaced: u32,
}

impl PipelineStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of injected comments.
    pub fn comments_injected(&self) -> u32 {
        self.comments_anchored + self.comments_appended
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &PipelineStats) {
        self.comments_anchored += other.comments_anchored;
        self.comments_appended += other.comments_appended;
        self.references_rewritten += other.references_rewritten;
        self.references_unresolved += other.references_unresolved;
        self.attribute_blocks_simplified += other.attribute_blocks_simplified;
        self.headings_shifted += other.headings_shifted;
        self.placeholders_inserted += other.placeholders_inserted;
        self.tables_repaired += other.tables_repaired;
        self.tables_flagged += other.tables_flagged;
        self.footnotes_prefixed += other.footnotes_prefixed;
        self.citations_linked += other.citations_linked;
        self.tables_replaced += other.tables_replaced;
    }
}
