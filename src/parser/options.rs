//! Fact mining options and configuration.

/// Options for mining facts from a LaTeX source.
#[derive(Debug, Clone)]
pub struct MinerOptions {
    /// Character opening a full-line comment
    pub comment_marker: char,

    /// Maximum anchor length in characters
    pub anchor_len: usize,

    /// Command opening a caption (`\caption{`)
    pub caption_command: String,

    /// Environments whose first mandatory argument is a title
    /// (`\begin{tab}[h]{Title ...}`)
    pub title_environments: Vec<String>,

    /// Command marking a cross-reference target (`\label{id}`)
    pub label_command: String,
}

impl MinerOptions {
    /// Create new miner options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the comment marker.
    pub fn with_comment_marker(mut self, marker: char) -> Self {
        self.comment_marker = marker;
        self
    }

    /// Set the anchor length.
    pub fn with_anchor_len(mut self, len: usize) -> Self {
        self.anchor_len = len;
        self
    }

    /// Set the caption command name (without backslash).
    pub fn with_caption_command(mut self, name: impl Into<String>) -> Self {
        self.caption_command = name.into();
        self
    }

    /// Set the title-bearing environments.
    pub fn with_title_environments<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.title_environments = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set the label command name (without backslash).
    pub fn with_label_command(mut self, name: impl Into<String>) -> Self {
        self.label_command = name.into();
        self
    }
}

impl Default for MinerOptions {
    fn default() -> Self {
        Self {
            comment_marker: '%',
            anchor_len: 70,
            caption_command: "caption".to_string(),
            title_environments: vec!["tab".to_string(), "fig".to_string()],
            label_command: "label".to_string(),
        }
    }
}
