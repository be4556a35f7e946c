//! Cross-reference link rewriting.
//!
//! The transducer renders `\ref{key}` as
//! `[\[key\]](#key){reference-type="ref" reference="key"}`. When the key has
//! a recovered caption, the link text becomes the caption in plain text and
//! the anchor loses its spaces.

use super::options::ReferenceOptions;
use super::result::PipelineStats;
use super::Stage;
use crate::error::Result;
use crate::model::{Document, LabelCaptionMap};
use crate::parser::SourceFacts;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static ACCENT_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\\['`^"~]\s*\{?([^}]*)\}?"#).expect("valid accent regex"));
static ORDINAL_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\er\b").expect("valid ordinal regex"));
static STYLE_COMMAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\(?:emph|textbf|textit|textsc|texttt|mbox)\s*\{([^}]*)\}")
        .expect("valid style regex")
});
static ANY_COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-zA-Z]+\s*").expect("valid command regex"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Rewrites reference links using the label/caption map.
#[derive(Debug, Clone)]
pub struct ReferenceRewriter {
    link: Regex,
    reference_type: String,
}

impl ReferenceRewriter {
    /// Build the link pattern for the configured reference type.
    pub fn new(options: &ReferenceOptions) -> Result<Self> {
        let link = Regex::new(&format!(
            concat!(
                r"\[\s*(?P<text>(?:\\[\[\]]|[^\n\[\]])*?)\s*\]\s*\(#(?P<anchor>[^)]+)\)",
                r#"\s*\{{\s*reference-type\s*=\s*["']{}["']\s+reference\s*=\s*["'](?P<key>[^"']+)["']\s*\}}"#,
            ),
            regex::escape(&options.reference_type)
        ))?;
        Ok(Self {
            link,
            reference_type: options.reference_type.clone(),
        })
    }

    /// Rewrite every link whose key has a caption. Links with unknown keys
    /// are left untouched.
    pub fn rewrite(&self, text: &str, captions: &LabelCaptionMap, stats: &mut PipelineStats) -> String {
        if captions.is_empty() {
            return text.to_string();
        }

        self.link
            .replace_all(text, |caps: &Captures| {
                let key = caps["key"].trim();
                match captions.get(key) {
                    Some(caption) => {
                        stats.references_rewritten += 1;
                        let anchor = normalize_anchor_id(&caps["anchor"]);
                        format!(
                            "[{}](#{}){{reference-type=\"{}\" reference=\"{}\"}}",
                            caption_to_plain(caption),
                            anchor,
                            self.reference_type,
                            anchor
                        )
                    }
                    None => {
                        log::debug!("No caption for reference '{}'", key);
                        stats.references_unresolved += 1;
                        caps[0].to_string()
                    }
                }
            })
            .into_owned()
    }
}

impl Stage for ReferenceRewriter {
    fn name(&self) -> &'static str {
        "references"
    }

    fn apply(&self, doc: &Document, facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.rewrite(doc.as_str(), &facts.captions, stats))
    }
}

/// Rewrite reference links with the default options.
pub fn rewrite_references(text: &str, captions: &LabelCaptionMap) -> String {
    ReferenceRewriter::new(&ReferenceOptions::default())
        .map(|rewriter| rewriter.rewrite(text, captions, &mut PipelineStats::default()))
        .unwrap_or_else(|_| text.to_string())
}

/// Reduce a LaTeX caption to plain link text: accent and style commands
/// unwrapped, other commands dropped, whitespace collapsed.
pub fn caption_to_plain(caption: &str) -> String {
    let s = caption.replace('~', " ");
    let s = ACCENT_COMMAND.replace_all(s.trim(), "$1");
    let s = ORDINAL_COMMAND.replace_all(&s, "er");
    let s = STYLE_COMMAND.replace_all(&s, "$1");
    let s = ANY_COMMAND.replace_all(&s, " ");
    let s = s.replace('\\', "");
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Anchor ids may not contain spaces: trim and replace them with hyphens.
pub fn normalize_anchor_id(anchor: &str) -> String {
    anchor.trim().replace(' ', "-")
}
