//! Manifest-driven conversion of a whole book.
//!
//! A [`BookManifest`] lists the chapters of a book. Each chapter is converted
//! on its own: a missing source or a failing transducer is recorded in the
//! [`BookReport`] and never stops the other chapters.

use super::Converter;
use crate::error::{Error, Result};
use crate::pipeline::{
    render_bibliography, LegislationEntry, PipelineOptions, PipelineStats, TableReplacement,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One chapter of the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterEntry {
    /// LaTeX source, relative to the source directory
    pub source: PathBuf,

    /// Output file name; its stem names the chapter
    pub output: String,

    /// Chapter title, written to the frontmatter
    pub title: String,

    /// Table blocks to replace with generated tables
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableReplacement>,
}

impl ChapterEntry {
    /// Create a chapter entry.
    pub fn new(
        source: impl Into<PathBuf>,
        output: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            title: title.into(),
            tables: Vec::new(),
        }
    }

    /// Add a table replacement.
    pub fn with_table(mut self, table: TableReplacement) -> Self {
        self.tables.push(table);
        self
    }

    /// Chapter name: the output file stem.
    pub fn name(&self) -> &str {
        Path::new(&self.output)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.output)
    }
}

/// The chapters of a book and what they share.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookManifest {
    /// Chapters, in reading order
    pub chapters: Vec<ChapterEntry>,

    /// Legislation linked in every chapter
    #[serde(default)]
    pub legislation: Vec<LegislationEntry>,

    /// File name of the generated `.bib`, relative to the output directory
    #[serde(default)]
    pub bibliography: Option<String>,
}

impl BookManifest {
    /// Load a manifest from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json)?;
        Ok(manifest)
    }

    /// Check the manifest before converting anything.
    ///
    /// # Errors
    /// * `Error::Manifest` for an empty or duplicated chapter name
    /// * `Error::InvalidDate` for a legislation date that does not parse
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for chapter in &self.chapters {
            let name = chapter.name();
            if name.is_empty() {
                return Err(Error::Manifest(format!(
                    "chapter '{}' has no output name",
                    chapter.source.display()
                )));
            }
            if !names.insert(name) {
                return Err(Error::Manifest(format!("duplicate chapter '{}'", name)));
            }
        }
        for entry in &self.legislation {
            entry.issued_date()?;
        }
        Ok(())
    }
}

/// Options for book conversion.
#[derive(Debug, Clone)]
pub struct BookOptions {
    /// Directory chapter sources are relative to
    pub source_dir: PathBuf,

    /// Directory receiving `chapters/` and the bibliography
    pub output_dir: PathBuf,

    /// Convert one chapter at a time
    pub sequential: bool,

    /// Options shared by every chapter
    pub pipeline: PipelineOptions,
}

impl BookOptions {
    /// Create options for the given directories.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            sequential: false,
            pipeline: PipelineOptions::default(),
        }
    }

    /// Set sequential mode.
    pub fn with_sequential(mut self, sequential: bool) -> Self {
        self.sequential = sequential;
        self
    }

    /// Set the shared pipeline options.
    pub fn with_pipeline(mut self, pipeline: PipelineOptions) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Output path of a chapter.
    pub fn chapter_output(&self, name: &str) -> PathBuf {
        self.output_dir
            .join("chapters")
            .join(name)
            .join(format!("{}.qmd", name))
    }
}

/// What happened to one chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChapterOutcome {
    /// Written to its output
    Converted {
        /// Pipeline counters
        stats: PipelineStats,
    },
    /// Not attempted
    Skipped {
        /// Why
        reason: String,
    },
    /// Attempted and failed
    Failed {
        /// Error message
        error: String,
    },
}

/// Report for one chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterReport {
    /// Chapter name
    pub name: String,
    /// Resolved source path
    pub source: PathBuf,
    /// Output path
    pub output: PathBuf,
    /// Outcome
    pub outcome: ChapterOutcome,
}

impl ChapterReport {
    /// Check if the chapter was written.
    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, ChapterOutcome::Converted { .. })
    }
}

/// Report for a whole book.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookReport {
    /// Chapter reports, in manifest order
    pub chapters: Vec<ChapterReport>,

    /// Bibliography written, if any
    pub bibliography: Option<PathBuf>,
}

impl BookReport {
    /// Number of converted chapters.
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Converted { .. }))
    }

    /// Number of skipped chapters.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Skipped { .. }))
    }

    /// Number of failed chapters.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ChapterOutcome::Failed { .. }))
    }

    /// Counters summed over converted chapters.
    pub fn total_stats(&self) -> PipelineStats {
        let mut total = PipelineStats::default();
        for chapter in &self.chapters {
            if let ChapterOutcome::Converted { stats } = &chapter.outcome {
                total.merge(stats);
            }
        }
        total
    }

    fn count(&self, pred: impl Fn(&ChapterOutcome) -> bool) -> usize {
        self.chapters.iter().filter(|c| pred(&c.outcome)).count()
    }
}

/// Convert every chapter of the manifest.
pub fn convert_book(
    manifest: &BookManifest,
    options: &BookOptions,
    converter: &Converter,
) -> Result<BookReport> {
    convert_book_with_progress(manifest, options, converter, |_| {})
}

/// Convert every chapter, calling `on_chapter` as each one finishes.
///
/// # Errors
/// Only a manifest that fails validation, an output directory that cannot
/// be created or a bibliography that cannot be written abort the book.
pub fn convert_book_with_progress<F>(
    manifest: &BookManifest,
    options: &BookOptions,
    converter: &Converter,
    on_chapter: F,
) -> Result<BookReport>
where
    F: Fn(&ChapterReport) + Sync,
{
    manifest.validate()?;
    fs::create_dir_all(&options.output_dir)?;
    log::info!(
        "Converting {} chapters into {}",
        manifest.chapters.len(),
        options.output_dir.display()
    );

    let run = |chapter: &ChapterEntry| {
        let report = convert_chapter(chapter, manifest, options, converter);
        on_chapter(&report);
        report
    };

    let chapters: Vec<ChapterReport> = if options.sequential {
        manifest.chapters.iter().map(run).collect()
    } else {
        manifest.chapters.par_iter().map(run).collect()
    };

    let bibliography = match &manifest.bibliography {
        Some(file) if !manifest.legislation.is_empty() => {
            let path = options.output_dir.join(file);
            fs::write(&path, render_bibliography(&manifest.legislation)?)?;
            log::info!("Wrote bibliography {}", path.display());
            Some(path)
        }
        _ => None,
    };

    Ok(BookReport {
        chapters,
        bibliography,
    })
}

fn convert_chapter(
    chapter: &ChapterEntry,
    manifest: &BookManifest,
    options: &BookOptions,
    converter: &Converter,
) -> ChapterReport {
    let name = chapter.name().to_string();
    let source = options.source_dir.join(&chapter.source);
    let output = options.chapter_output(&name);

    let outcome = if !source.exists() {
        log::warn!("Skipping {}: {} not found", name, source.display());
        ChapterOutcome::Skipped {
            reason: format!("source not found: {}", source.display()),
        }
    } else {
        let mut pipeline = options
            .pipeline
            .clone()
            .with_footnote_prefix(name.as_str())
            .with_title(chapter.title.as_str())
            .with_legislation(manifest.legislation.clone());
        pipeline.table_replacements.extend(chapter.tables.iter().cloned());

        match write_chapter(converter, &source, &output, &pipeline) {
            Ok(stats) => ChapterOutcome::Converted { stats },
            Err(Error::SourceNotFound(path)) => ChapterOutcome::Skipped {
                reason: format!("source not found: {}", path.display()),
            },
            Err(e) => {
                log::warn!("Failed to convert {}: {}", name, e);
                ChapterOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    };

    ChapterReport {
        name,
        source,
        output,
        outcome,
    }
}

fn write_chapter(
    converter: &Converter,
    source: &Path,
    output: &Path,
    pipeline: &PipelineOptions,
) -> Result<PipelineStats> {
    let result = converter.convert(source, pipeline)?;
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, &result.content)?;
    log::info!("Wrote {}", output.display());
    Ok(result.stats)
}
