//! Reconstruction of raw tabular blocks.
//!
//! The transducer gives up on some `tabular` environments and emits them as
//! a fenced `::: tabular` div holding the LaTeX rows verbatim:
//!
//! ```text
//! ::: tabular
//! \|c\|c\| Année & Taux \\
//! 2001 & 19,6 % \\
//! :::
//! ```
//!
//! Each such block is rebuilt as a pipe table. Rows before the first row
//! that looks like data (a year in the first cell, or a currency amount
//! anywhere) are header rows and are merged column by column.

use super::edit::EditPlan;
use super::options::TabularOptions;
use super::result::PipelineStats;
use super::Stage;
use crate::model::{normalize_bold_artifact, Document, Row, TabularBlock};
use crate::parser::SourceFacts;
use regex::Regex;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:19|20)\d{2}$").expect("valid year regex"));
static EARLY_2000S_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^200[1-9]$").expect("valid year regex"));
static BOLD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*[^*]+\*\*$").expect("valid bold regex"));
// Column specification leaked into the first cell: `\|c\|c\|` or `c\|c\|`.
static COLSPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\\|(?:c\\\|)+\\?\s*").expect("valid colspec regex"));
static BARE_COLSPEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^c\\\|(?:c\\\|)*\s*").expect("valid colspec regex"));

/// A fenced block found in the draft, as line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    /// Opener line
    pub open: usize,
    /// Closer line
    pub close: usize,
}

/// Rebuilds `::: tabular` blocks as pipe tables.
#[derive(Debug, Clone, Default)]
pub struct TabularRepairer {
    options: TabularOptions,
}

impl TabularRepairer {
    /// Create a repairer.
    pub fn new(options: TabularOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &TabularOptions {
        &self.options
    }

    /// Replace every terminated tabular block. A block without any usable
    /// row is replaced by an empty line.
    pub fn repair(&self, text: &str, stats: &mut PipelineStats) -> String {
        self.repair_lines(&Document::from(text).lines_with_endings(), stats)
    }

    fn repair_lines(&self, lines: &[&str], stats: &mut PipelineStats) -> String {
        let fences = self.find_fences(lines);
        if fences.is_empty() {
            return lines.concat();
        }

        let mut plan = EditPlan::new();
        for fence in fences {
            let body: Vec<&str> = lines[fence.open + 1..fence.close]
                .iter()
                .map(|line| line.trim())
                .collect();
            let terminator = if lines[fence.close].ends_with('\n') { "\n" } else { "" };

            let rendered = match self.build_block(&body) {
                Some(block) => {
                    let (table, flagged) = self.render_block(&block);
                    stats.tables_repaired += 1;
                    if flagged {
                        log::debug!("Table at line {} flagged as malformed", fence.open + 1);
                        stats.tables_flagged += 1;
                    }
                    table
                }
                None => String::new(),
            };
            plan.replace(fence.open, fence.close + 1, format!("{}{}", rendered, terminator));
        }
        plan.apply(lines)
    }

    /// Locate opener/closer pairs. An opener without a closer ends the
    /// search and its block is left alone.
    pub fn find_fences(&self, lines: &[&str]) -> Vec<Fence> {
        let mut fences = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if !self.is_opener(lines[i]) {
                i += 1;
                continue;
            }
            match (i + 1..lines.len()).find(|&j| lines[j].trim() == ":::") {
                Some(close) => {
                    fences.push(Fence { open: i, close });
                    i = close + 1;
                }
                None => {
                    log::debug!("Unterminated tabular block at line {}", i + 1);
                    break;
                }
            }
        }
        fences
    }

    fn is_opener(&self, line: &str) -> bool {
        line.trim()
            .strip_prefix(":::")
            .is_some_and(|rest| rest.trim() == self.options.fence_name)
    }

    /// Parse the body lines of a block into header and data rows, with rows
    /// padded to the widest one. Returns `None` when no row has content.
    pub fn build_block(&self, body: &[&str]) -> Option<TabularBlock> {
        let mut rows: Vec<Row> = Vec::new();
        for line in body.iter().filter(|line| !line.is_empty()) {
            let mut cells: Row = line
                .split(self.options.delimiter)
                .map(|cell| self.clean_cell(cell))
                .collect();
            if cells.iter().all(String::is_empty) {
                continue;
            }
            if rows.is_empty() {
                cells[0] = strip_column_spec(&cells[0]);
            }
            rows.push(cells);
        }
        if rows.is_empty() {
            return None;
        }

        // The first row is the header when no row looks like data or when
        // the very first one does.
        let split = rows
            .iter()
            .position(|row| self.is_data_row(row))
            .unwrap_or(1)
            .max(1);
        let data_rows = rows.split_off(split);
        let mut block = TabularBlock {
            header_rows: rows,
            data_rows,
            caption: None,
        };
        block.pad_rows();

        if self.options.repair_missing_year && fill_missing_leading_year(&mut block.data_rows) {
            log::debug!("Restored missing leading year 2000");
        }
        Some(block)
    }

    /// Render a block, preceded by the warning comment when its header
    /// looks malformed. Also returns whether the warning was emitted.
    pub fn render_block(&self, block: &TabularBlock) -> (String, bool) {
        let flagged = is_likely_malformed(&block.header(), &self.options);
        let table = block.to_markdown();
        if flagged {
            (format!("{}\n{}", self.options.malformed_warning, table), true)
        } else {
            (table, false)
        }
    }

    /// A row is data when its first cell is a year or any cell holds a
    /// currency amount.
    pub fn is_data_row(&self, row: &[String]) -> bool {
        row.first().is_some_and(|first| YEAR.is_match(first))
            || row
                .iter()
                .any(|cell| cell.contains(self.options.currency_symbols.as_slice()))
    }

    fn clean_cell(&self, cell: &str) -> String {
        cell.trim()
            .trim_end_matches(self.options.continuation)
            .trim()
            .to_string()
    }
}

impl Stage for TabularRepairer {
    fn name(&self) -> &'static str {
        "tabular"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.repair_lines(&doc.lines_with_endings(), stats))
    }
}

/// Rebuild tabular blocks with the default options.
pub fn repair_tables(text: &str) -> String {
    TabularRepairer::default().repair(text, &mut PipelineStats::default())
}

fn strip_column_spec(cell: &str) -> String {
    let cell = COLSPEC.replace(cell, "");
    let cell = BARE_COLSPEC.replace(cell.trim(), "");
    normalize_bold_artifact(&cell)
}

/// Fill a blank first cell of the first data row with `2000` when the next
/// year found in the first column is `2001`.
///
/// The transducer sometimes drops the leading year of a table starting in
/// 2000. Returns whether the cell was filled.
pub fn fill_missing_leading_year(rows: &mut [Row]) -> bool {
    let Some((first, rest)) = rows.split_first_mut() else {
        return false;
    };
    if first.len() < 2 || first.first().is_some_and(|cell| !cell.trim().is_empty()) {
        return false;
    }

    let next_year = rest
        .iter()
        .filter_map(|row| row.first())
        .map(|cell| cell.trim())
        .find(|cell| EARLY_2000S_YEAR.is_match(cell));
    if next_year == Some("2001") {
        first[0] = "2000".to_string();
        true
    } else {
        false
    }
}

/// Whether a synthesized header probably lost or split cells.
///
/// Single-column tables are never flagged. Otherwise the header is
/// malformed when too few columns are filled, when exactly one of more than
/// two columns is filled, or when any cell is a fragment.
pub fn is_likely_malformed(header: &[String], options: &TabularOptions) -> bool {
    let ncols = header.len();
    if ncols <= 1 {
        return false;
    }

    let filled = header.iter().filter(|cell| !cell.trim().is_empty()).count();
    let sparse = (filled as f32) < ncols as f32 * options.min_filled_ratio;
    let lone = filled == 1 && ncols > 2;
    sparse || lone || header.iter().any(|cell| is_fragment(cell.trim(), options))
}

fn is_fragment(cell: &str, options: &TabularOptions) -> bool {
    if cell.is_empty() {
        return false;
    }
    let chars = cell.chars().count();
    let bold_only = cell.starts_with("**") && cell.ends_with("**");
    if bold_only {
        return chars <= options.bold_fragment_max_chars;
    }
    chars <= options.fragment_max_chars && !is_clean_token(cell)
}

// Bold-wrapped text, or a capitalised word such as `Taux` or `TVA`.
fn is_clean_token(cell: &str) -> bool {
    if BOLD_TOKEN.is_match(cell) {
        return true;
    }
    let mut chars = cell.chars();
    chars.next().is_some_and(char::is_uppercase) && chars.all(char::is_alphabetic)
}
