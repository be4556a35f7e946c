//! Re-injection of source comments into the draft.

use super::edit::EditPlan;
use super::options::InjectionOptions;
use super::result::PipelineStats;
use super::Stage;
use crate::model::{CommentBlock, Document};
use crate::parser::SourceFacts;

/// Inserts mined comments before the draft line holding their anchor.
#[derive(Debug, Clone, Default)]
pub struct CommentInjector {
    options: InjectionOptions,
}

impl CommentInjector {
    /// Create an injector.
    pub fn new(options: InjectionOptions) -> Self {
        Self { options }
    }

    /// Insert every comment as a `<!-- ... -->` line.
    ///
    /// Positions are all resolved against the draft as given, then applied
    /// in one pass from the last line to the first. Comments whose anchor
    /// is empty or cannot be found target the end of the document. Comments
    /// sharing a position come out in reverse source order.
    pub fn inject(&self, text: &str, comments: &[CommentBlock], stats: &mut PipelineStats) -> String {
        self.inject_lines(&Document::from(text).lines_with_endings(), comments, stats)
    }

    fn inject_lines(
        &self,
        lines: &[&str],
        comments: &[CommentBlock],
        stats: &mut PipelineStats,
    ) -> String {
        let mut plan = EditPlan::new();
        for comment in comments {
            let rendered = format!("{}\n", comment.render());
            match self.locate(lines, &comment.anchor) {
                Some(index) => {
                    plan.insert_before(index, rendered);
                    stats.comments_anchored += 1;
                }
                None => {
                    if comment.is_anchored() {
                        log::debug!("Anchor not found, appending comment: {:?}", comment.anchor);
                    }
                    plan.insert_before(lines.len(), rendered);
                    stats.comments_appended += 1;
                }
            }
        }
        plan.apply(lines)
    }

    /// Index of the first line containing the anchor, or failing that the
    /// first line containing its leading characters.
    ///
    /// Two anchors sharing a long prefix may resolve to the same line
    /// through the prefix fallback.
    pub fn locate(&self, lines: &[&str], anchor: &str) -> Option<usize> {
        if anchor.is_empty() {
            return None;
        }
        if let Some(index) = lines.iter().position(|line| line.contains(anchor)) {
            return Some(index);
        }

        let prefix = char_prefix(anchor, self.options.fallback_prefix_len);
        if prefix.is_empty() || prefix.len() == anchor.len() {
            return None;
        }
        lines.iter().position(|line| line.contains(prefix))
    }
}

impl Stage for CommentInjector {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn apply(&self, doc: &Document, facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.inject_lines(&doc.lines_with_endings(), &facts.comments, stats))
    }
}

/// Inject comments with the default options.
pub fn inject_comments(text: &str, comments: &[CommentBlock]) -> String {
    CommentInjector::default().inject(text, comments, &mut PipelineStats::default())
}

fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
