//! Generated tables replacing converted table blocks.
//!
//! Some tables are better produced from structured data than recovered from
//! the transducer's output. A [`TableBuilder`] turns parameters into a
//! [`TabularBlock`], and the fenced `::: tab` block carrying the table id is
//! swapped for the rendered result.

use super::edit::EditPlan;
use super::result::PipelineStats;
use super::Stage;
use crate::model::{Document, TabularBlock};
use crate::parser::SourceFacts;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Builds a table from parameters.
pub trait TableBuilder: Send + Sync {
    /// Builder name, for logging.
    fn name(&self) -> &str;

    /// Build the table, or `None` when the parameters do not describe one.
    fn build_table(&self, params: &Value) -> Option<TabularBlock>;
}

/// Builds a table from inline JSON:
/// `{ "header": ["Année", "Taux"], "rows": [["2001", "19,6 %"]], "caption": "..." }`.
///
/// Cells may be strings, numbers or booleans; `null` is an empty cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTableBuilder;

impl TableBuilder for JsonTableBuilder {
    fn name(&self) -> &str {
        "json"
    }

    fn build_table(&self, params: &Value) -> Option<TabularBlock> {
        let header = cells(params.get("header")?)?;
        let mut block = TabularBlock::with_header(header);
        for row in params.get("rows")?.as_array()? {
            block.add_row(cells(row)?);
        }
        if let Some(caption) = params.get("caption").and_then(Value::as_str) {
            block = block.caption(caption);
        }
        Some(block)
    }
}

fn cells(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|cell| match cell {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => Some(String::new()),
            _ => None,
        })
        .collect()
}

/// A table block to replace with a generated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableReplacement {
    /// Id found in the block to replace, e.g. `table:historique-taux-tva`
    pub table_id: String,

    /// Caption of the generated table (overrides the builder's)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,

    /// Builder parameters
    #[serde(default)]
    pub params: Value,
}

impl TableReplacement {
    /// Create a replacement.
    pub fn new(table_id: impl Into<String>, params: Value) -> Self {
        Self {
            table_id: table_id.into(),
            caption: None,
            params,
        }
    }

    /// Set the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Render the built table with its caption and id.
    pub fn render(&self, block: &TabularBlock) -> String {
        let table = block.to_markdown();
        match self.caption.as_deref().or(block.caption.as_deref()) {
            Some(caption) => format!("{}\n\n: {} {{#{}}}", table, caption, self.table_id),
            None => table,
        }
    }
}

/// Replaces table blocks with generated tables.
pub struct TableReplacer {
    replacements: Vec<TableReplacement>,
    builder: Box<dyn TableBuilder>,
}

impl TableReplacer {
    /// Create a replacer using the given builder.
    pub fn new(replacements: Vec<TableReplacement>, builder: Box<dyn TableBuilder>) -> Self {
        Self {
            replacements,
            builder,
        }
    }

    /// Apply every replacement in order. A replacement whose parameters do
    /// not build a table leaves the document unchanged.
    pub fn replace(&self, text: &str, stats: &mut PipelineStats) -> String {
        let mut content = text.to_string();
        for replacement in &self.replacements {
            let Some(block) = self.builder.build_table(&replacement.params) else {
                log::warn!(
                    "Builder '{}' produced no table for {}",
                    self.builder.name(),
                    replacement.table_id
                );
                continue;
            };
            let (replaced, count) =
                replace_blocks(&content, &replacement.table_id, &replacement.render(&block));
            if count == 0 {
                log::debug!("No table block with id {}", replacement.table_id);
            }
            stats.tables_replaced += count;
            content = replaced;
        }
        content
    }
}

impl std::fmt::Debug for TableReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableReplacer")
            .field("replacements", &self.replacements)
            .field("builder", &self.builder.name())
            .finish()
    }
}

impl Stage for TableReplacer {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn apply(&self, doc: &Document, _facts: &SourceFacts, stats: &mut PipelineStats) -> Document {
        Document::new(self.replace(doc.as_str(), stats))
    }
}

/// Replace every `::: tab` (or `:::: tab`) block whose text contains
/// `table_id` with `replacement`. Blocks without a closing fence are kept.
pub fn replace_table_block(content: &str, table_id: &str, replacement: &str) -> String {
    replace_blocks(content, table_id, replacement).0
}

fn replace_blocks(content: &str, table_id: &str, replacement: &str) -> (String, u32) {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut plan = EditPlan::new();
    let mut count = 0;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if !(line.starts_with("::: tab") || line.starts_with(":::: tab")) {
            i += 1;
            continue;
        }
        let close = (i + 1..lines.len()).find(|&j| matches!(lines[j].trim(), ":::" | "::::"));
        let Some(close) = close else {
            i += 1;
            continue;
        };

        if lines[i..=close].iter().any(|l| l.contains(table_id)) {
            let terminator = if lines[close].ends_with('\n') { "\n" } else { "" };
            plan.replace(
                i,
                close + 1,
                format!("{}{}", replacement.trim_end_matches('\n'), terminator),
            );
            count += 1;
        }
        i = close + 1;
    }

    (plan.apply(&lines), count)
}
