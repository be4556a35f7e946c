//! Legislation citations and their bibliography.
//!
//! Literal phrases naming a law ("loi du 15 juillet 1914") are followed by
//! a Pandoc citation (`[@loi1914]`), and every entry is written to a
//! `.bib` file as a `@misc` of type `legislation`.

use super::result::PipelineStats;
use super::Stage;
use crate::error::{Error, Result};
use crate::model::Document;
use crate::parser::SourceFacts;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Private-use delimiters cannot occur in converted text.
const PLACEHOLDER_OPEN: &str = "\u{E000}LEGREF\u{E001}";
const PLACEHOLDER_CLOSE: char = '\u{E002}';

/// One legislative text and the phrases that cite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegislationEntry {
    /// Citation key
    pub key: String,

    /// Literal phrases linked to the key
    pub patterns: Vec<String>,

    /// Full title
    pub title: String,

    /// Date the text was issued, `YYYY-MM-DD`
    pub issued: String,

    /// Short description, written as the bibliography note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shorthand: Option<String>,

    /// Link to the official text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl LegislationEntry {
    /// Create an entry without shorthand or URL.
    pub fn new<S: Into<String>>(
        key: impl Into<String>,
        patterns: impl IntoIterator<Item = S>,
        title: impl Into<String>,
        issued: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            title: title.into(),
            issued: issued.into(),
            shorthand: None,
            url: None,
        }
    }

    /// Set the shorthand.
    pub fn with_shorthand(mut self, shorthand: impl Into<String>) -> Self {
        self.shorthand = Some(shorthand.into());
        self
    }

    /// Set the URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Parse the issue date.
    ///
    /// # Errors
    /// Returns `Error::InvalidDate` if `issued` is not a `YYYY-MM-DD` date.
    pub fn issued_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.issued, "%Y-%m-%d")
            .map_err(|e| Error::InvalidDate(format!("{} ({}): {}", self.issued, self.key, e)))
    }

    fn to_bibtex(&self) -> Result<String> {
        let issued = self.issued_date()?.format("%Y-%m-%d").to_string();
        let mut lines = vec![
            format!("@misc{{{},", self.key),
            "  type = {legislation},".to_string(),
            format!("  title = {{{}}},", escape_bib(&self.title)),
            format!("  date = {{{}}},", issued),
            format!("  issued = {{{}}},", issued),
        ];
        if let Some(shorthand) = self.shorthand.as_deref().filter(|s| !s.is_empty()) {
            lines.push(format!("  note = {{{}}},", escape_bib(shorthand)));
        }
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            lines.push(format!("  url = {{{}}},", url));
        }
        lines.push("}".to_string());
        Ok(lines.join("\n"))
    }
}

/// Links legislation phrases to their citation key.
#[derive(Debug, Clone, Default)]
pub struct CitationLinker {
    // (key, pattern), longest pattern first
    pairs: Vec<(String, String)>,
}

impl CitationLinker {
    /// Collect the patterns of all entries.
    pub fn new(entries: &[LegislationEntry]) -> Self {
        let mut pairs: Vec<(String, String)> = entries
            .iter()
            .flat_map(|e| e.patterns.iter().map(|p| (e.key.clone(), p.clone())))
            .filter(|(_, pattern)| !pattern.is_empty())
            .collect();
        pairs.sort_by_key(|(_, pattern)| std::cmp::Reverse(pattern.chars().count()));
        Self { pairs }
    }

    /// Check if there is nothing to link.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append ` [@key]` after each phrase not already followed by it.
    ///
    /// Longer phrases are linked first. Every linked span, new or already
    /// present, is hidden until all phrases are done, so a shorter phrase
    /// inside it is left alone whatever its key.
    pub fn link(&self, text: &str, stats: &mut PipelineStats) -> String {
        let mut content = text.to_string();
        let mut hidden: Vec<String> = Vec::with_capacity(self.pairs.len());

        for (key, pattern) in &self.pairs {
            let cited = format!("{} [@{}]", pattern, key);
            let placeholder = placeholder(hidden.len());

            content = content.replace(&cited, &placeholder);
            let linked = content.matches(pattern.as_str()).count();
            if linked > 0 {
                stats.citations_linked += linked as u32;
                content = content.replace(pattern.as_str(), &placeholder);
            }
            hidden.push(cited);
        }

        for (index, cited) in hidden.iter().enumerate() {
            content = content.replace(&placeholder(index), cited);
        }
        content
    }
}

fn placeholder(index: usize) -> String {
    format!("{}{}{}", PLACEHOLDER_OPEN, index, PLACEHOLDER_CLOSE)
}

impl Stage for CitationLinker {
    fn name(&self) -> &'static str {
        "citations"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.link(doc.as_str(), stats))
    }
}

/// Link legislation phrases in `text`.
pub fn link_citations(text: &str, entries: &[LegislationEntry]) -> String {
    CitationLinker::new(entries).link(text, &mut PipelineStats::default())
}

/// Render a `.bib` file with one `@misc` per entry.
///
/// # Errors
/// Returns `Error::InvalidDate` for the first entry whose date does not
/// parse.
pub fn render_bibliography(entries: &[LegislationEntry]) -> Result<String> {
    let mut out = String::from("% Textes de loi, générés par tex2qmd.\n% Ne pas éditer à la main.\n\n");
    for entry in entries {
        out.push_str(&entry.to_bibtex()?);
        out.push_str("\n\n");
    }
    Ok(out)
}

fn escape_bib(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
