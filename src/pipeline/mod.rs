//! Post-processing pipeline for transducer drafts.
//!
//! Each stage reads a [`Document`] plus the [`SourceFacts`] mined once from
//! the LaTeX source, and returns a new document. Stages run in a fixed
//! order:
//!
//! 1. reference links rewritten with captions
//! 2. source comments re-injected
//! 3. attribute blocks simplified, text corrections applied
//! 4. headings demoted
//! 5. empty sections filled
//! 6. raw tabular blocks rebuilt
//! 7. footnote labels prefixed
//! 8. legislation citations linked
//! 9. table blocks replaced by generated tables
//! 10. frontmatter added
//!
//! References are rewritten before comments are injected so that injected
//! lines never split a reference link. No stage fails on malformed input:
//! whatever a stage cannot recognise is passed through unchanged.

mod attributes;
mod citations;
mod comments;
mod edit;
mod footnotes;
mod headings;
mod options;
mod references;
mod result;
mod tables;
mod tabular;

pub use attributes::AttributeNormalizer;
pub use citations::{link_citations, render_bibliography, CitationLinker, LegislationEntry};
pub use comments::{inject_comments, CommentInjector};
pub use edit::{Edit, EditKind, EditPlan};
pub use footnotes::{prefix_footnote_labels, FootnotePrefixer};
pub use headings::{fill_empty_sections, shift_headings, HeadingShifter, SectionFiller};
pub use options::{
    AttributeOptions, CorrectionRule, HeadingOptions, InjectionOptions, PipelineOptions,
    PipelinePreset, ReferenceOptions, TabularOptions,
};
pub use references::{caption_to_plain, normalize_anchor_id, rewrite_references, ReferenceRewriter};
pub use result::{PipelineResult, PipelineStats};
pub use tables::{
    replace_table_block, JsonTableBuilder, TableBuilder, TableReplacement, TableReplacer,
};
pub use tabular::{
    fill_missing_leading_year, is_likely_malformed, repair_tables, Fence, TabularRepairer,
};

use crate::error::Result;
use crate::model::Document;
use crate::parser::SourceFacts;

/// One text pass of the pipeline.
///
/// Implement this trait to add a pass; stages must be total: unrecognised
/// input is returned unchanged rather than rejected.
pub trait Stage: Send + Sync {
    /// Stage name, for logging.
    fn name(&self) -> &'static str;

    /// Produce the next document.
    fn apply(&self, doc: &Document, facts: &SourceFacts, stats: &mut PipelineStats) -> Document;
}

/// Prefixes the document with a YAML frontmatter holding its title.
#[derive(Debug, Clone)]
pub struct Frontmatter {
    title: String,
}

impl Frontmatter {
    /// Create the stage.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Render the frontmatter block, followed by a blank line.
    pub fn render(&self) -> String {
        let escaped = self.title.replace('\\', "\\\\").replace('"', "\\\"");
        format!("---\ntitle: \"{}\"\n---\n\n", escaped)
    }
}

impl Stage for Frontmatter {
    fn name(&self) -> &'static str {
        "frontmatter"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, _stats: &mut PipelineStats) -> Document {
        Document::new(format!("{}{}", self.render(), doc.as_str()))
    }
}

/// The configured sequence of stages.
pub struct Pipeline {
    options: PipelineOptions,
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    /// Build the stages enabled in `options`, generating replacement tables
    /// with [`JsonTableBuilder`].
    ///
    /// # Errors
    /// Returns `Error::InvalidPattern` if a configured pattern does not
    /// compile.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        Self::with_table_builder(options, Box::new(JsonTableBuilder))
    }

    /// Build the stages with a custom table builder.
    pub fn with_table_builder(
        options: PipelineOptions,
        builder: Box<dyn TableBuilder>,
    ) -> Result<Self> {
        let mut stages: Vec<Box<dyn Stage>> = Vec::new();

        if options.rewrite_references {
            stages.push(Box::new(ReferenceRewriter::new(&options.references)?));
        }
        if options.inject_comments {
            stages.push(Box::new(CommentInjector::new(options.injection.clone())));
        }
        if options.normalize_attributes {
            stages.push(Box::new(AttributeNormalizer::new(&options.attributes)?));
        }
        if options.shift_headings {
            stages.push(Box::new(HeadingShifter::new(&options.headings)));
        }
        if options.fill_empty_sections {
            stages.push(Box::new(SectionFiller::new(&options.headings)));
        }
        if options.repair_tables {
            stages.push(Box::new(TabularRepairer::new(options.tabular.clone())));
        }
        if let Some(prefix) = options.footnote_prefix.as_deref().filter(|p| !p.is_empty()) {
            stages.push(Box::new(FootnotePrefixer::new(prefix)));
        }
        if !options.legislation.is_empty() {
            stages.push(Box::new(CitationLinker::new(&options.legislation)));
        }
        if !options.table_replacements.is_empty() {
            stages.push(Box::new(TableReplacer::new(
                options.table_replacements.clone(),
                builder,
            )));
        }
        if let Some(title) = &options.title {
            stages.push(Box::new(Frontmatter::new(title.as_str())));
        }

        Ok(Self { options, stages })
    }

    /// Get the options the pipeline was built from.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Names of the enabled stages, in order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage over the draft.
    ///
    /// The draft is normalized (line endings, Unicode NFC) first so that it
    /// compares equal to the normalized source.
    pub fn run(&self, draft: &str, facts: &SourceFacts) -> PipelineResult {
        let mut stats = PipelineStats::new();
        let mut doc = Document::normalized(draft);

        for stage in &self.stages {
            log::debug!("Running stage '{}'", stage.name());
            doc = stage.apply(&doc, facts, &mut stats);
        }

        PipelineResult::new(doc.into_string(), stats)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
