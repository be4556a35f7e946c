//! Integration tests for document and book conversion.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tex2qmd::convert::{convert_book_with_progress, ChapterEntry};
use tex2qmd::error::Result;
use tex2qmd::{
    convert_book, BookManifest, BookOptions, ChapterOutcome, Converter, Error, LegislationEntry,
    PipelineOptions, SourceEncoding, Tex2Qmd, Transducer,
};

/// Turns `\section{X}` into `# X`, drops comment lines and copies the rest.
/// Sources containing `\fail` are rejected.
struct MockTransducer;

impl Transducer for MockTransducer {
    fn name(&self) -> &str {
        "mock"
    }

    fn transduce(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path)?;
        if text.contains("\\fail") {
            return Err(Error::Transducer {
                name: self.name().to_string(),
                status: Some(64),
                stderr: "unexpected control sequence".to_string(),
            });
        }

        let mut out = String::new();
        for line in text.lines() {
            if line.trim_start().starts_with('%') {
                continue;
            }
            match line.strip_prefix("\\section{").and_then(|l| l.strip_suffix('}')) {
                Some(title) => out.push_str(&format!("# {}\n", title)),
                None => out.push_str(&format!("{}\n", line)),
            }
        }
        Ok(out)
    }
}

fn converter() -> Converter {
    Converter::new(Arc::new(MockTransducer))
}

fn write_sources(dir: &Path) {
    fs::write(
        dir.join("1-Presentation.tex"),
        "\\section{Origines}\n% Relu en 2014\nLa loi du 15 juillet 1914 institue l'impôt[^1].\n\n[^1]: Note.\n",
    )
    .unwrap();
    fs::write(dir.join("3-Cotisations.tex"), "\\section{Cotisations}\n\\fail\n").unwrap();
}

fn manifest() -> BookManifest {
    BookManifest {
        chapters: vec![
            ChapterEntry::new("1-Presentation.tex", "presentation.qmd", "Présentation"),
            ChapterEntry::new("2-Revenu.tex", "revenu.qmd", "L'impôt sur le revenu"),
            ChapterEntry::new("3-Cotisations.tex", "cotisations.qmd", "Les cotisations sociales"),
        ],
        legislation: vec![LegislationEntry::new(
            "loi1914",
            ["loi du 15 juillet 1914"],
            "Loi du 15 juillet 1914",
            "1914-07-15",
        )],
        bibliography: Some("legislation.bib".to_string()),
    }
}

#[test]
fn test_convert_single_document() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let result = converter()
        .convert(
            &dir.path().join("1-Presentation.tex"),
            &PipelineOptions::default().with_footnote_prefix("presentation"),
        )
        .unwrap();

    assert_eq!(result.encoding, SourceEncoding::Utf8);
    assert_eq!(result.comments_mined, 1);
    assert_eq!(
        result.content,
        "## Origines\n<!-- Relu en 2014 -->\n\
         La loi du 15 juillet 1914 institue l'impôt [^presentation-1].\n\n\
         [^presentation-1]: Note.\n"
    );
    assert_eq!(result.content_len(), result.content.len());
}

#[test]
fn test_transducer_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let err = converter()
        .convert(&dir.path().join("3-Cotisations.tex"), &PipelineOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Transducer { status: Some(64), .. }));
}

#[test]
fn test_builder_with_transducer() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path());

    let result = Tex2Qmd::new()
        .with_transducer(Arc::new(MockTransducer))
        .minimal()
        .with_title("Présentation")
        .convert(dir.path().join("1-Presentation.tex"))
        .unwrap();
    assert!(result.content.starts_with("---\ntitle: \"Présentation\"\n---\n\n# Origines\n"));
}

#[test]
fn test_book_isolates_chapters() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path());

    let options = BookOptions::new(src.path(), out.path());
    let report = convert_book(&manifest(), &options, &converter()).unwrap();

    assert_eq!(report.chapters.len(), 3);
    assert_eq!(report.converted(), 1);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 1);

    assert_eq!(report.chapters[0].name, "presentation");
    assert!(report.chapters[0].is_converted());
    assert!(matches!(
        report.chapters[1].outcome,
        ChapterOutcome::Skipped { .. }
    ));
    match &report.chapters[2].outcome {
        ChapterOutcome::Failed { error } => assert!(error.contains("unexpected control sequence")),
        other => panic!("expected failure, got {:?}", other),
    }

    assert!(!out.path().join("chapters/revenu").exists());
    assert!(!out.path().join("chapters/cotisations/cotisations.qmd").exists());
}

#[test]
fn test_book_chapter_output() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path());

    let options = BookOptions::new(src.path(), out.path()).with_sequential(true);
    let report = convert_book(&manifest(), &options, &converter()).unwrap();

    let written =
        fs::read_to_string(out.path().join("chapters/presentation/presentation.qmd")).unwrap();
    assert!(written.starts_with("---\ntitle: \"Présentation\"\n---\n\n## Origines\n"));
    assert!(written.contains("La loi du 15 juillet 1914 [@loi1914] institue l'impôt [^presentation-1]."));
    assert!(written.contains("[^presentation-1]: Note."));

    let total = report.total_stats();
    assert_eq!(total.citations_linked, 1);
    assert_eq!(total.footnotes_prefixed, 2);
}

#[test]
fn test_book_bibliography() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path());

    let report = convert_book(
        &manifest(),
        &BookOptions::new(src.path(), out.path()),
        &converter(),
    )
    .unwrap();

    let bib_path = out.path().join("legislation.bib");
    assert_eq!(report.bibliography.as_deref(), Some(bib_path.as_path()));
    let bib = fs::read_to_string(bib_path).unwrap();
    assert!(bib.contains("@misc{loi1914,"));
    assert!(bib.contains("  type = {legislation},"));
}

#[test]
fn test_book_progress_called_per_chapter() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(src.path());

    let seen = AtomicUsize::new(0);
    convert_book_with_progress(
        &manifest(),
        &BookOptions::new(src.path(), out.path()),
        &converter(),
        |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        },
    )
    .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_book_rejects_invalid_manifest() {
    let out = tempfile::tempdir().unwrap();
    let mut manifest = manifest();
    manifest.legislation[0].issued = "1914-13-45".to_string();

    let err = convert_book(
        &manifest,
        &BookOptions::new(out.path(), out.path()),
        &converter(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidDate(_)));
    assert!(!out.path().join("chapters").exists());
}

#[test]
fn test_manifest_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    fs::write(
        &path,
        r#"{"chapters": [{"source": "5-Indirecte.tex", "output": "indirecte.qmd",
            "title": "La fiscalité indirecte",
            "tables": [{"table_id": "table:historique-taux-tva",
                        "params": {"header": ["Année"], "rows": [["2014"]]}}]}]}"#,
    )
    .unwrap();

    let manifest = BookManifest::from_path(&path).unwrap();
    assert_eq!(manifest.chapters[0].tables.len(), 1);
    assert!(manifest.legislation.is_empty());
    assert!(manifest.bibliography.is_none());
}
