//! # tex2qmd
//!
//! LaTeX to Quarto Markdown conversion for book chapters.
//!
//! The conversion itself is delegated to an external transducer (Pandoc).
//! This library mines the facts the transducer loses from the LaTeX source
//! and repairs the draft it produces.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tex2qmd::repair;
//!
//! fn main() -> tex2qmd::Result<()> {
//!     let source = std::fs::read_to_string("5-Indirecte.tex")?;
//!     let draft = std::fs::read_to_string("5-Indirecte.md")?;
//!
//!     let result = repair(&source, &draft)?;
//!     println!("{}", result.content);
//!     println!("{} comments re-injected", result.stats.comments_injected());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Source comments**: `%` comments survive as HTML comments
//! - **Cross-references**: link texts replaced by the target's caption
//! - **Attribute cleanup**: labelled spans reduced to bare ids
//! - **Headings**: demoted one level, empty sections filled
//! - **Tables**: raw `tabular` blocks rebuilt as pipe tables
//! - **Books**: manifest-driven batch conversion, in parallel with Rayon

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;

// Re-export commonly used types
pub use convert::{
    convert_book, BookManifest, BookOptions, BookReport, ChapterOutcome, ConvertResult,
    Converter, PandocTransducer, Transducer,
};
pub use detect::{decode_source, read_source, SourceEncoding};
pub use error::{Error, Result};
pub use model::{CommentBlock, Document, LabelCaptionEntry, LabelCaptionMap, TabularBlock};
pub use parser::{MinerOptions, SourceFacts, SourceMiner};
pub use pipeline::{
    LegislationEntry, Pipeline, PipelineOptions, PipelinePreset, PipelineResult, PipelineStats,
    TableReplacement,
};

use std::path::Path;
use std::sync::Arc;

/// Mine comments and captions from LaTeX source text.
///
/// # Example
///
/// ```
/// use tex2qmd::mine_source;
///
/// let facts = mine_source("% Source : INSEE\nLe PIB progresse.\n");
/// assert_eq!(facts.comments[0].anchor, "Le PIB progresse.");
/// ```
pub fn mine_source(source: &str) -> SourceFacts {
    SourceMiner::new().mine(source)
}

/// Repair a transducer draft using facts mined from its source.
///
/// # Arguments
///
/// * `source` - LaTeX source text
/// * `draft` - Markdown produced by the transducer from that source
pub fn repair(source: &str, draft: &str) -> Result<PipelineResult> {
    repair_with_options(source, draft, PipelineOptions::default())
}

/// Repair a transducer draft with custom options.
///
/// # Example
///
/// ```
/// use tex2qmd::{repair_with_options, PipelineOptions};
///
/// let options = PipelineOptions::minimal().with_footnote_prefix("revenu");
/// let result = repair_with_options("", "# Impôt[^1]\n", options).unwrap();
/// assert_eq!(result.content, "# Impôt [^revenu-1]\n");
/// ```
pub fn repair_with_options(
    source: &str,
    draft: &str,
    options: PipelineOptions,
) -> Result<PipelineResult> {
    let facts = SourceMiner::with_options(options.miner.clone())?.mine(source);
    let pipeline = Pipeline::new(options)?;
    Ok(pipeline.run(draft, &facts))
}

/// Builder for converting LaTeX chapters.
///
/// # Example
///
/// ```no_run
/// use tex2qmd::Tex2Qmd;
///
/// let result = Tex2Qmd::new()
///     .with_pandoc("/usr/local/bin/pandoc")
///     .with_title("La fiscalité indirecte")
///     .with_footnote_prefix("indirecte")
///     .convert("5-Indirecte.tex")?;
/// std::fs::write("indirecte.qmd", result.content)?;
/// # Ok::<(), tex2qmd::Error>(())
/// ```
pub struct Tex2Qmd {
    options: PipelineOptions,
    transducer: Arc<dyn Transducer>,
}

impl Tex2Qmd {
    /// Create a builder using `pandoc` from `PATH`.
    pub fn new() -> Self {
        Self {
            options: PipelineOptions::default(),
            transducer: Arc::new(PandocTransducer::new()),
        }
    }

    /// Use a preset.
    pub fn with_preset(mut self, preset: PipelinePreset) -> Self {
        let miner = self.options.miner.clone();
        self.options = PipelineOptions::from_preset(preset).with_miner(miner);
        self
    }

    /// Leave heading levels as the transducer emitted them.
    pub fn minimal(self) -> Self {
        self.with_preset(PipelinePreset::Minimal)
    }

    /// Set the frontmatter title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.options = self.options.with_title(title);
        self
    }

    /// Set the footnote label prefix.
    pub fn with_footnote_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options = self.options.with_footnote_prefix(prefix);
        self
    }

    /// Set the placeholder for empty sections.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.options = self.options.with_placeholder(placeholder);
        self
    }

    /// Link legislation phrases.
    pub fn with_legislation(mut self, entries: Vec<LegislationEntry>) -> Self {
        self.options = self.options.with_legislation(entries);
        self
    }

    /// Run Pandoc from another path.
    pub fn with_pandoc(mut self, program: impl Into<std::path::PathBuf>) -> Self {
        self.transducer = Arc::new(PandocTransducer::new().with_program(program));
        self
    }

    /// Use another transducer.
    pub fn with_transducer(mut self, transducer: Arc<dyn Transducer>) -> Self {
        self.transducer = transducer;
        self
    }

    /// Get the pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Convert a LaTeX file.
    pub fn convert<P: AsRef<Path>>(&self, path: P) -> Result<ConvertResult> {
        Converter::new(Arc::clone(&self.transducer)).convert(path.as_ref(), &self.options)
    }

    /// Repair an existing draft without running the transducer.
    pub fn repair(&self, source: &str, draft: &str) -> Result<PipelineResult> {
        repair_with_options(source, draft, self.options.clone())
    }
}

impl Default for Tex2Qmd {
    fn default() -> Self {
        Self::new()
    }
}
