//! Attribute-block simplification and text corrections.

use super::options::{AttributeOptions, CorrectionRule};
use super::references::normalize_anchor_id;
use super::result::PipelineStats;
use super::Stage;
use crate::error::Result;
use crate::model::Document;
use crate::parser::SourceFacts;
use regex::{Captures, Regex};
use std::sync::LazyLock;

// ` []{#id label="id"}`, possibly on its own indented line; quotes may be curly.
static LABELLED_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:\n\s*| )\[\]\{(#[^{}]+?)\s*label\s*=\s*["'“”][^"'“”]*["'“”]\s*\}"#)
        .expect("valid labelled span regex")
});

#[derive(Debug)]
struct CompiledRule {
    pattern: Regex,
    replacement: String,
}

/// Reduces the transducer's `[]{#id label="id"}` spans to `[]{#id}` and
/// applies configured text corrections.
#[derive(Debug)]
pub struct AttributeNormalizer {
    rules: Vec<CompiledRule>,
}

impl AttributeNormalizer {
    /// Compile the correction rules.
    ///
    /// # Errors
    /// Returns `Error::InvalidPattern` if a rule does not compile.
    pub fn new(options: &AttributeOptions) -> Result<Self> {
        let rules = options
            .rules
            .iter()
            .map(|CorrectionRule { pattern, replacement }| -> Result<CompiledRule> {
                Ok(CompiledRule {
                    pattern: Regex::new(pattern)?,
                    replacement: replacement.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Simplify attribute spans, keeping the anchor with its spaces
    /// replaced, then apply the corrections in order.
    pub fn normalize(&self, text: &str, stats: &mut PipelineStats) -> String {
        let mut content = LABELLED_SPAN
            .replace_all(text, |caps: &Captures| {
                stats.attribute_blocks_simplified += 1;
                format!(" []{{{}}}", normalize_anchor_id(&caps[1]))
            })
            .into_owned();

        for rule in &self.rules {
            content = rule
                .pattern
                .replace_all(&content, rule.replacement.as_str())
                .into_owned();
        }
        content
    }
}

impl Stage for AttributeNormalizer {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.normalize(doc.as_str(), stats))
    }
}
