//! tex2qmd CLI - LaTeX to Quarto Markdown conversion tool

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use tex2qmd::convert::{convert_book_with_progress, ChapterReport};
use tex2qmd::{
    read_source, BookManifest, BookOptions, ChapterOutcome, Converter, PandocTransducer,
    PipelineOptions, PipelineStats, SourceMiner,
};

#[derive(Parser)]
#[command(name = "tex2qmd")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert LaTeX chapters to Quarto Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a LaTeX file with Pandoc, then repair the result
    Convert {
        /// Input LaTeX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input name with a .qmd extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Title written to the YAML frontmatter
        #[arg(long)]
        title: Option<String>,

        /// Prefix for footnote labels
        #[arg(long, value_name = "PREFIX")]
        footnote_prefix: Option<String>,

        /// Pandoc executable
        #[arg(long, value_name = "PATH", default_value = "pandoc")]
        pandoc: PathBuf,
    },

    /// Repair an existing Pandoc draft using its LaTeX source
    Repair {
        /// LaTeX source file
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Markdown draft produced from SOURCE
        #[arg(value_name = "DRAFT")]
        draft: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Title written to the YAML frontmatter
        #[arg(long)]
        title: Option<String>,

        /// Prefix for footnote labels
        #[arg(long, value_name = "PREFIX")]
        footnote_prefix: Option<String>,

        /// Keep heading levels and empty sections as they are
        #[arg(long)]
        minimal: bool,
    },

    /// Convert every chapter listed in a book manifest
    Book {
        /// Manifest file (JSON)
        #[arg(value_name = "MANIFEST")]
        manifest: PathBuf,

        /// Directory chapter sources are relative to (defaults to the manifest's directory)
        #[arg(long, value_name = "DIR", env = "TEX2QMD_SOURCE_DIR")]
        source_dir: Option<PathBuf>,

        /// Output directory
        #[arg(long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,

        /// Convert chapters one at a time
        #[arg(long)]
        sequential: bool,

        /// Pandoc executable
        #[arg(long, value_name = "PATH", default_value = "pandoc")]
        pandoc: PathBuf,
    },

    /// Show the comments and captions mined from a LaTeX file
    Inspect {
        /// Input LaTeX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            title,
            footnote_prefix,
            pandoc,
        }) => cmd_convert(&input, output.as_deref(), title, footnote_prefix, pandoc),
        Some(Commands::Repair {
            source,
            draft,
            output,
            title,
            footnote_prefix,
            minimal,
        }) => cmd_repair(
            &source,
            &draft,
            output.as_deref(),
            title,
            footnote_prefix,
            minimal,
        ),
        Some(Commands::Book {
            manifest,
            source_dir,
            output_dir,
            sequential,
            pandoc,
        }) => cmd_book(&manifest, source_dir, output_dir, sequential, pandoc),
        Some(Commands::Inspect { input, json }) => cmd_inspect(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: tex2qmd <COMMAND>".yellow());
            println!("       tex2qmd --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn pipeline_options(
    title: Option<String>,
    footnote_prefix: Option<String>,
    minimal: bool,
) -> PipelineOptions {
    let mut options = if minimal {
        PipelineOptions::minimal()
    } else {
        PipelineOptions::standard()
    };
    if let Some(title) = title {
        options = options.with_title(title);
    }
    if let Some(prefix) = footnote_prefix {
        options = options.with_footnote_prefix(prefix);
    }
    options
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    title: Option<String>,
    footnote_prefix: Option<String>,
    pandoc: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| input.with_extension("qmd"));

    let converter = Converter::new(Arc::new(PandocTransducer::new().with_program(pandoc)));
    let options = pipeline_options(title, footnote_prefix, false);
    let result = converter.convert(input, &options)?;

    fs::write(&output, &result.content)?;
    println!("{} {}", "Saved to".green(), output.display());
    println!("{}: {}", "Encoding".bold(), result.encoding);
    print_stats(&result.stats);

    Ok(())
}

fn cmd_repair(
    source: &Path,
    draft: &Path,
    output: Option<&Path>,
    title: Option<String>,
    footnote_prefix: Option<String>,
    minimal: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(source)?;
    let draft = fs::read(draft)?;
    let draft = tex2qmd::detect::decode_draft(&draft);

    let options = pipeline_options(title, footnote_prefix, minimal);
    let result = tex2qmd::repair_with_options(&source.text, &draft, options)?;

    if let Some(path) = output {
        fs::write(path, &result.content)?;
        println!("{} {}", "Saved to".green(), path.display());
        print_stats(&result.stats);
    } else {
        print!("{}", result.content);
    }

    Ok(())
}

fn cmd_book(
    manifest_path: &Path,
    source_dir: Option<PathBuf>,
    output_dir: PathBuf,
    sequential: bool,
    pandoc: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = BookManifest::from_path(manifest_path)?;
    log::debug!(
        "Loaded {} chapters from {}",
        manifest.chapters.len(),
        manifest_path.display()
    );
    let source_dir = source_dir.unwrap_or_else(|| {
        manifest_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    });

    let converter = Converter::new(Arc::new(PandocTransducer::new().with_program(pandoc)));
    let options = BookOptions::new(source_dir, output_dir).with_sequential(sequential);

    let pb = ProgressBar::new(manifest.chapters.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb.set_message("Converting chapters...");

    let report = convert_book_with_progress(&manifest, &options, &converter, |chapter| {
        pb.set_message(chapter.name.clone());
        pb.inc(1);
    })?;

    pb.finish_with_message("Done!");

    println!("\n{}", "Chapters:".green().bold());
    let last = report.chapters.len().saturating_sub(1);
    for (i, chapter) in report.chapters.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), describe_chapter(chapter));
    }

    if let Some(ref bib) = report.bibliography {
        println!("\n{} {}", "Bibliography".green(), bib.display());
    }

    println!(
        "\n{} {} converted, {} skipped, {} failed",
        "Done!".green().bold(),
        report.converted(),
        report.skipped(),
        report.failed()
    );

    if report.failed() > 0 {
        return Err(format!("{} chapter(s) failed", report.failed()).into());
    }
    Ok(())
}

fn describe_chapter(chapter: &ChapterReport) -> String {
    match &chapter.outcome {
        ChapterOutcome::Converted { .. } => {
            format!("{} {}", chapter.name, chapter.output.display().to_string().dimmed())
        }
        ChapterOutcome::Skipped { reason } => {
            format!("{} {}", chapter.name, format!("skipped: {}", reason).yellow())
        }
        ChapterOutcome::Failed { error } => {
            format!("{} {}", chapter.name, format!("failed: {}", error).red())
        }
    }
}

fn cmd_inspect(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = read_source(input)?;
    let facts = SourceMiner::new().mine(&source.text);

    if json {
        println!("{}", serde_json::to_string_pretty(&facts)?);
        return Ok(());
    }

    println!("{}", "Source Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Encoding".bold(), source.encoding);
    println!("{}: {}", "Lines".bold(), source.text.lines().count());

    println!();
    println!("{}", "Comments".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for comment in &facts.comments {
        println!("{}", comment.text);
        if comment.is_anchored() {
            println!("  {} {}", "→".dimmed(), comment.anchor.dimmed());
        } else {
            println!("  {} {}", "→".dimmed(), "(end of document)".dimmed());
        }
    }
    println!("{}: {}", "Total".bold(), facts.comments.len());

    println!();
    println!("{}", "Captions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (label, caption) in facts.captions.iter() {
        println!("{}: {}", label.bold(), caption);
    }
    println!("{}: {}", "Total".bold(), facts.captions.len());

    Ok(())
}

fn print_stats(stats: &PipelineStats) {
    println!();
    println!("{}", "Repairs".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "{}: {} anchored, {} appended",
        "Comments".bold(),
        stats.comments_anchored,
        stats.comments_appended
    );
    println!(
        "{}: {} rewritten, {} unresolved",
        "References".bold(),
        stats.references_rewritten,
        stats.references_unresolved
    );
    println!("{}: {}", "Attribute blocks".bold(), stats.attribute_blocks_simplified);
    println!("{}: {}", "Headings shifted".bold(), stats.headings_shifted);
    println!("{}: {}", "Placeholders".bold(), stats.placeholders_inserted);
    println!(
        "{}: {} repaired, {} flagged",
        "Tables".bold(),
        stats.tables_repaired,
        stats.tables_flagged
    );
    if stats.footnotes_prefixed > 0 {
        println!("{}: {}", "Footnotes prefixed".bold(), stats.footnotes_prefixed);
    }
}

fn cmd_version() {
    println!("{} {}", "tex2qmd".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("LaTeX to Quarto Markdown conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/tex2qmd".dimmed());
    println!("License: MIT");
}
