//! Table types.

use serde::{Deserialize, Serialize};

/// A row of cell texts.
pub type Row = Vec<String>;

/// A reconstructed table.
///
/// Header rows are kept as found; the single Markdown header row is
/// synthesized from them column by column, which simulates spanning header
/// cells that the transducer split over several rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularBlock {
    /// Raw header rows, top to bottom (may be empty)
    pub header_rows: Vec<Row>,

    /// Data rows in document order
    pub data_rows: Vec<Row>,

    /// Table caption
    pub caption: Option<String>,
}

impl TabularBlock {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table with a single header row.
    pub fn with_header<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header_rows: vec![header.into_iter().map(Into::into).collect()],
            ..Self::new()
        }
    }

    /// Add a data row.
    pub fn add_row<S: Into<String>>(&mut self, row: impl IntoIterator<Item = S>) {
        self.data_rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Set the caption and return self.
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Number of columns: the widest header or data row.
    pub fn column_count(&self) -> usize {
        self.header_rows
            .iter()
            .chain(&self.data_rows)
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.data_rows.len()
    }

    /// Check if the table has neither header nor data.
    pub fn is_empty(&self) -> bool {
        self.header_rows.is_empty() && self.data_rows.is_empty()
    }

    /// Pad every row with empty cells up to the column count.
    pub fn pad_rows(&mut self) {
        let ncols = self.column_count();
        for row in self.header_rows.iter_mut().chain(self.data_rows.iter_mut()) {
            row.resize(ncols, String::new());
        }
    }

    /// Synthesize one header row: for each column, the first non-blank cell
    /// found scanning the header rows top to bottom.
    pub fn header(&self) -> Row {
        (0..self.column_count())
            .map(|col| {
                self.header_rows
                    .iter()
                    .filter_map(|row| row.get(col))
                    .map(|cell| cell.trim())
                    .find(|cell| !cell.is_empty())
                    .map(normalize_bold_artifact)
                    .unwrap_or_default()
            })
            .collect()
    }

    /// Render as a pipe table. Every row is padded or truncated to the
    /// column count.
    pub fn to_markdown(&self) -> String {
        let ncols = self.column_count();
        if ncols == 0 {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.data_rows.len() + 2);
        lines.push(render_row(&self.header(), ncols));
        lines.push(format!("|{}|", vec!["---"; ncols].join("|")));
        for row in &self.data_rows {
            lines.push(render_row(row, ncols));
        }
        lines.join("\n")
    }
}

fn render_row(row: &[String], ncols: usize) -> String {
    let cells: Vec<&str> = (0..ncols)
        .map(|i| row.get(i).map(String::as_str).unwrap_or(""))
        .collect();
    format!("| {} |", cells.join(" | "))
}

/// Restore bold markup mangled into an escaped asterisk (`\***x` → `**x`).
pub(crate) fn normalize_bold_artifact(cell: &str) -> String {
    match cell.strip_prefix("\\***") {
        Some(rest) => format!("**{}", rest),
        None => cell.to_string(),
    }
}
