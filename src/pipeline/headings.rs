//! Heading demotion and empty-section placeholders.

use super::options::HeadingOptions;
use super::result::PipelineStats;
use super::Stage;
use crate::model::{Document, HeadingNode, MAX_HEADING_DEPTH};
use crate::parser::SourceFacts;

/// Demotes every heading so the document nests inside a larger volume.
#[derive(Debug, Clone)]
pub struct HeadingShifter {
    shift: u8,
    max_depth: u8,
}

impl HeadingShifter {
    /// Create a shifter. The maximum depth is clamped to 1-6.
    pub fn new(options: &HeadingOptions) -> Self {
        Self {
            shift: options.shift,
            max_depth: options.max_depth.clamp(1, MAX_HEADING_DEPTH),
        }
    }

    /// Rewrite heading lines at depth `min(d + shift, max_depth)`.
    pub fn shift(&self, text: &str, stats: &mut PipelineStats) -> String {
        self.shift_lines(&Document::from(text).lines(), stats)
    }

    fn shift_lines(&self, lines: &[&str], stats: &mut PipelineStats) -> String {
        let lines: Vec<String> = lines
            .iter()
            .map(|line| match HeadingNode::parse(line) {
                Some(heading) => {
                    let depth = heading.depth.saturating_add(self.shift).min(self.max_depth);
                    if depth != heading.depth {
                        stats.headings_shifted += 1;
                    }
                    heading.with_depth(depth).render()
                }
                None => line.to_string(),
            })
            .collect();
        lines.join("\n")
    }
}

impl Stage for HeadingShifter {
    fn name(&self) -> &'static str {
        "headings"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.shift_lines(&doc.lines(), stats))
    }
}

/// Inserts a placeholder under headings that have no body.
#[derive(Debug, Clone)]
pub struct SectionFiller {
    placeholder: String,
}

impl SectionFiller {
    /// Create a filler with the configured placeholder.
    pub fn new(options: &HeadingOptions) -> Self {
        Self {
            placeholder: options.placeholder.clone(),
        }
    }

    /// After each heading followed only by blank lines up to the next
    /// heading (or the end), insert a blank line, the placeholder and
    /// another blank line.
    pub fn fill(&self, text: &str, stats: &mut PipelineStats) -> String {
        self.fill_lines(&Document::from(text).lines(), stats)
    }

    fn fill_lines(&self, lines: &[&str], stats: &mut PipelineStats) -> String {
        let mut result: Vec<&str> = Vec::with_capacity(lines.len());

        for (i, &line) in lines.iter().enumerate() {
            result.push(line);
            if HeadingNode::is_heading(line) && is_empty_section(&lines[i + 1..]) {
                result.extend(["", self.placeholder.as_str(), ""]);
                stats.placeholders_inserted += 1;
            }
        }
        result.join("\n")
    }
}

impl Stage for SectionFiller {
    fn name(&self) -> &'static str {
        "placeholders"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.fill_lines(&doc.lines(), stats))
    }
}

fn is_empty_section(following: &[&str]) -> bool {
    following
        .iter()
        .take_while(|line| !HeadingNode::is_heading(line))
        .all(|line| line.trim().is_empty())
}

/// Demote headings by one level.
pub fn shift_headings(text: &str) -> String {
    HeadingShifter::new(&HeadingOptions::default()).shift(text, &mut PipelineStats::default())
}

/// Fill empty sections with the default placeholder.
pub fn fill_empty_sections(text: &str) -> String {
    SectionFiller::new(&HeadingOptions::default()).fill(text, &mut PipelineStats::default())
}
