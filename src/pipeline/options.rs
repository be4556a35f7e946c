//! Pipeline options and configuration.
//!
//! Every constant a stage relies on (patterns, thresholds, marker texts) is
//! a field here, so each stage can be run and tested with overridden
//! values.

use super::citations::LegislationEntry;
use super::tables::TableReplacement;
use crate::parser::MinerOptions;
use serde::{Deserialize, Serialize};

/// Pipeline preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelinePreset {
    /// Structural repairs only: references, comments, attribute blocks,
    /// tables. Heading levels are left as the transducer emitted them.
    Minimal,
    /// Everything, with headings demoted for inclusion in a book
    #[default]
    Standard,
}

/// Options for the reference rewriter.
#[derive(Debug, Clone)]
pub struct ReferenceOptions {
    /// Value of the `reference-type` attribute to rewrite
    pub reference_type: String,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        Self {
            reference_type: "ref".to_string(),
        }
    }
}

/// Options for the comment injector.
#[derive(Debug, Clone)]
pub struct InjectionOptions {
    /// Length of the anchor prefix tried when the full anchor is not found
    pub fallback_prefix_len: usize,
}

impl Default for InjectionOptions {
    fn default() -> Self {
        Self {
            fallback_prefix_len: 50,
        }
    }
}

/// A regex substitution applied to the whole draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRule {
    /// Regular expression
    pub pattern: String,
    /// Replacement, `$1`-style group references allowed
    pub replacement: String,
}

impl CorrectionRule {
    /// Create a new rule.
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Options for the attribute-block normalizer.
#[derive(Debug, Clone)]
pub struct AttributeOptions {
    /// Text corrections applied after attribute blocks are simplified
    pub rules: Vec<CorrectionRule>,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            rules: vec![
                // The transducer drops `\er` from "1\er janvier"
                CorrectionRule::new(r"(\D)1\s+janvier\b", "${1}1er janvier"),
                // Footnote reference glued to the preceding word
                CorrectionRule::new(r"([a-zA-Zàâäéèêëïîôùûüç])\[\^", "$1 [^"),
            ],
        }
    }
}

/// Options for heading shifting and empty-section filling.
#[derive(Debug, Clone)]
pub struct HeadingOptions {
    /// Levels added to every heading
    pub shift: u8,
    /// Deepest level a shifted heading may reach (1-6)
    pub max_depth: u8,
    /// Body inserted under headings without content
    pub placeholder: String,
}

impl Default for HeadingOptions {
    fn default() -> Self {
        Self {
            shift: 1,
            max_depth: 6,
            placeholder: "*[À rédiger.]*".to_string(),
        }
    }
}

/// Options for tabular block repair.
#[derive(Debug, Clone)]
pub struct TabularOptions {
    /// Name after `:::` on the fence opening a raw tabular block
    pub fence_name: String,
    /// Cell delimiter
    pub delimiter: char,
    /// Row continuation suffix stripped from cells
    pub continuation: char,
    /// A row containing any of these starts the data rows
    pub currency_symbols: Vec<char>,
    /// Headers with fewer filled columns than this share are malformed
    pub min_filled_ratio: f32,
    /// Non-bold header cells up to this many characters may be fragments
    pub fragment_max_chars: usize,
    /// Bold-only header cells up to this many characters are fragments
    pub bold_fragment_max_chars: usize,
    /// Comment emitted before a table whose header looks malformed
    pub malformed_warning: String,
    /// Fill a blank leading year with 2000 when the next year is 2001
    pub repair_missing_year: bool,
}

impl Default for TabularOptions {
    fn default() -> Self {
        Self {
            fence_name: "tabular".to_string(),
            delimiter: '&',
            continuation: '\\',
            currency_symbols: vec!['€', '£'],
            min_filled_ratio: 0.5,
            fragment_max_chars: 4,
            bold_fragment_max_chars: 9,
            malformed_warning: "<!-- Tableau converti depuis LaTeX : en-têtes potentiellement \
                incomplets ou mal fusionnés (vérifier et corriger si besoin). -->"
                .to_string(),
            repair_missing_year: true,
        }
    }
}

/// Options for the whole pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Source fact mining
    pub miner: MinerOptions,

    /// Rewrite cross-reference link texts with captions
    pub rewrite_references: bool,

    /// Re-inject source comments
    pub inject_comments: bool,

    /// Simplify attribute blocks and apply text corrections
    pub normalize_attributes: bool,

    /// Demote headings
    pub shift_headings: bool,

    /// Insert placeholders under empty headings
    pub fill_empty_sections: bool,

    /// Rebuild raw tabular blocks
    pub repair_tables: bool,

    /// Reference rewriter options
    pub references: ReferenceOptions,

    /// Comment injector options
    pub injection: InjectionOptions,

    /// Attribute normalizer options
    pub attributes: AttributeOptions,

    /// Heading options
    pub headings: HeadingOptions,

    /// Tabular repair options
    pub tabular: TabularOptions,

    /// Prefix making footnote labels unique across chapters
    pub footnote_prefix: Option<String>,

    /// Legislation phrases to link to citation keys
    pub legislation: Vec<LegislationEntry>,

    /// Table blocks to replace with generated tables
    pub table_replacements: Vec<TableReplacement>,

    /// Title written to the YAML frontmatter
    pub title: Option<String>,
}

impl PipelineOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: PipelinePreset) -> Self {
        match preset {
            PipelinePreset::Minimal => Self::minimal(),
            PipelinePreset::Standard => Self::standard(),
        }
    }

    /// Structural repairs only.
    pub fn minimal() -> Self {
        Self {
            shift_headings: false,
            fill_empty_sections: false,
            ..Self::standard()
        }
    }

    /// All passes enabled.
    pub fn standard() -> Self {
        Self {
            miner: MinerOptions::default(),
            rewrite_references: true,
            inject_comments: true,
            normalize_attributes: true,
            shift_headings: true,
            fill_empty_sections: true,
            repair_tables: true,
            references: ReferenceOptions::default(),
            injection: InjectionOptions::default(),
            attributes: AttributeOptions::default(),
            headings: HeadingOptions::default(),
            tabular: TabularOptions::default(),
            footnote_prefix: None,
            legislation: Vec::new(),
            table_replacements: Vec::new(),
            title: None,
        }
    }

    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the miner options.
    pub fn with_miner(mut self, miner: MinerOptions) -> Self {
        self.miner = miner;
        self
    }

    /// Set the heading options.
    pub fn with_headings(mut self, headings: HeadingOptions) -> Self {
        self.headings = headings;
        self
    }

    /// Set the placeholder for empty sections.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.headings.placeholder = placeholder.into();
        self
    }

    /// Set the tabular options.
    pub fn with_tabular(mut self, tabular: TabularOptions) -> Self {
        self.tabular = tabular;
        self
    }

    /// Set the text correction rules.
    pub fn with_correction_rules(mut self, rules: Vec<CorrectionRule>) -> Self {
        self.attributes.rules = rules;
        self
    }

    /// Set the footnote label prefix.
    pub fn with_footnote_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.footnote_prefix = Some(prefix.into());
        self
    }

    /// Set the legislation entries.
    pub fn with_legislation(mut self, entries: Vec<LegislationEntry>) -> Self {
        self.legislation = entries;
        self
    }

    /// Add a table block replacement.
    pub fn with_table_replacement(mut self, replacement: TableReplacement) -> Self {
        self.table_replacements.push(replacement);
        self
    }

    /// Set the frontmatter title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let minimal = PipelineOptions::from_preset(PipelinePreset::Minimal);
        assert!(!minimal.shift_headings);
        assert!(!minimal.fill_empty_sections);
        assert!(minimal.repair_tables);

        let standard = PipelineOptions::default();
        assert!(standard.shift_headings);
        assert!(standard.inject_comments);
    }

    #[test]
    fn test_builder() {
        let options = PipelineOptions::new()
            .with_title("La fiscalité indirecte")
            .with_footnote_prefix("indirecte")
            .with_placeholder("TODO");

        assert_eq!(options.title.as_deref(), Some("La fiscalité indirecte"));
        assert_eq!(options.footnote_prefix.as_deref(), Some("indirecte"));
        assert_eq!(options.headings.placeholder, "TODO");
    }

    #[test]
    fn test_tabular_defaults() {
        let options = TabularOptions::default();
        assert_eq!(options.delimiter, '&');
        assert_eq!(options.fragment_max_chars, 4);
        assert!(options.malformed_warning.starts_with("<!--"));
        assert!(options.malformed_warning.ends_with("-->"));
    }
}
