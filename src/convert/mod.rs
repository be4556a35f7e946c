//! Document conversion: the external transducer and the repair pipeline.
//!
//! The LaTeX → Markdown step is delegated to a [`Transducer`], by default
//! Pandoc run as a subprocess. A [`Converter`] reads the source, mines its
//! facts, runs the transducer and repairs the draft.
//!
//! # Example
//!
//! ```no_run
//! use tex2qmd::convert::{Converter, PandocTransducer};
//! use tex2qmd::PipelineOptions;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! fn main() -> tex2qmd::Result<()> {
//!     let converter = Converter::new(Arc::new(PandocTransducer::new()));
//!     let options = PipelineOptions::default().with_title("La fiscalité indirecte");
//!     let result = converter.convert(Path::new("5-Indirecte.tex"), &options)?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

pub mod book;

pub use book::{
    convert_book, convert_book_with_progress, BookManifest, BookOptions, BookReport,
    ChapterEntry, ChapterOutcome, ChapterReport,
};

use crate::detect::{decode_draft, read_source, SourceEncoding};
use crate::error::{Error, Result};
use crate::parser::{SourceFacts, SourceMiner};
use crate::pipeline::{Pipeline, PipelineOptions, PipelineStats};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

/// Converts a LaTeX source file into a draft Markdown document.
///
/// Implement this trait to plug in another converter or a test double.
pub trait Transducer: Send + Sync {
    /// Name of this transducer.
    fn name(&self) -> &str;

    /// Convert the file at `path`. A failure aborts the conversion of that
    /// document only.
    fn transduce(&self, path: &Path) -> Result<String>;
}

/// Runs `pandoc <file> -f latex -t markdown`.
#[derive(Debug, Clone)]
pub struct PandocTransducer {
    program: PathBuf,
    from: String,
    to: String,
    extra_args: Vec<String>,
}

impl PandocTransducer {
    /// Use `pandoc` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
            from: "latex".to_string(),
            to: "markdown".to_string(),
            extra_args: Vec::new(),
        }
    }

    /// Use another executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Append extra arguments.
    pub fn with_args<S: Into<String>>(mut self, args: impl IntoIterator<Item = S>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Get the executable.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for PandocTransducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Transducer for PandocTransducer {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn transduce(&self, path: &Path) -> Result<String> {
        log::debug!("Running {} on {}", self.program.display(), path.display());
        let output = Command::new(&self.program)
            .arg(path)
            .args(["-f", &self.from, "-t", &self.to])
            .args(&self.extra_args)
            .output()
            .map_err(|source| Error::TransducerUnavailable {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::Transducer {
                name: self.name().to_string(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(decode_draft(&output.stdout))
    }
}

/// Result of converting one document.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    /// Repaired Markdown
    pub content: String,

    /// What the pipeline changed
    pub stats: PipelineStats,

    /// Encoding the source was read with
    pub encoding: SourceEncoding,

    /// Number of comment blocks mined from the source
    pub comments_mined: usize,

    /// Number of captions recovered from the source
    pub captions_mined: usize,
}

impl ConvertResult {
    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }
}

/// Converts single documents through a transducer and the pipeline.
#[derive(Clone)]
pub struct Converter {
    transducer: Arc<dyn Transducer>,
}

impl Converter {
    /// Create a converter around a transducer.
    pub fn new(transducer: Arc<dyn Transducer>) -> Self {
        Self { transducer }
    }

    /// Get the transducer.
    pub fn transducer(&self) -> &dyn Transducer {
        self.transducer.as_ref()
    }

    /// Convert one source file with the given pipeline options.
    ///
    /// # Errors
    /// * `Error::SourceNotFound` if the source does not exist
    /// * `Error::TransducerUnavailable` / `Error::Transducer` if the
    ///   transducer cannot run or fails
    /// * `Error::InvalidPattern` if a configured pattern does not compile
    pub fn convert(&self, path: &Path, options: &PipelineOptions) -> Result<ConvertResult> {
        let miner = SourceMiner::with_options(options.miner.clone())?;
        let pipeline = Pipeline::new(options.clone())?;
        self.convert_with(path, &miner, &pipeline)
    }

    /// Convert one source file with a prepared miner and pipeline.
    pub fn convert_with(
        &self,
        path: &Path,
        miner: &SourceMiner,
        pipeline: &Pipeline,
    ) -> Result<ConvertResult> {
        let source = read_source(path)?;
        let facts: SourceFacts = miner.mine(&source.text);
        log::debug!(
            "Mined {} comments and {} captions from {}",
            facts.comments.len(),
            facts.captions.len(),
            path.display()
        );

        let draft = self.transducer.transduce(path)?;
        let result = pipeline.run(&draft, &facts);
        log::info!("Converted {}", path.display());

        Ok(ConvertResult {
            content: result.content,
            stats: result.stats,
            encoding: source.encoding,
            comments_mined: facts.comments.len(),
            captions_mined: facts.captions.len(),
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Arc::new(PandocTransducer::new()))
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("transducer", &self.transducer.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct EchoTransducer;

    impl Transducer for EchoTransducer {
        fn name(&self) -> &str {
            "echo"
        }

        fn transduce(&self, path: &Path) -> Result<String> {
            let text = std::fs::read_to_string(path)?;
            Ok(text.replace("\\section{", "# ").replace('}', ""))
        }
    }

    #[test]
    fn test_pandoc_builder() {
        let pandoc = PandocTransducer::new()
            .with_program("/opt/pandoc/bin/pandoc")
            .with_args(["--wrap=none"]);
        assert_eq!(pandoc.program(), Path::new("/opt/pandoc/bin/pandoc"));
        assert_eq!(pandoc.extra_args, vec!["--wrap=none"]);
        assert_eq!(pandoc.name(), "pandoc");
    }

    #[test]
    fn test_missing_program() {
        let pandoc = PandocTransducer::new().with_program("tex2qmd-no-such-program");
        let err = pandoc.transduce(Path::new("chapitre.tex")).unwrap_err();
        assert!(matches!(err, Error::TransducerUnavailable { .. }));
    }

    #[test]
    fn test_convert_with_mock() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\\section{{Les droits}}\n% Source : douanes\nLe droit d'accise.\n").unwrap();

        let converter = Converter::new(Arc::new(EchoTransducer));
        let result = converter
            .convert(file.path(), &PipelineOptions::minimal())
            .unwrap();
        assert_eq!(result.encoding, SourceEncoding::Utf8);
        assert_eq!(result.comments_mined, 1);
        assert!(result.content.contains("<!-- Source : douanes -->\nLe droit d'accise."));
        assert_eq!(result.stats.comments_anchored, 1);
    }

    #[test]
    fn test_convert_missing_source() {
        let converter = Converter::new(Arc::new(EchoTransducer));
        let err = converter
            .convert(Path::new("/nonexistent/1-Presentation.tex"), &PipelineOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}
