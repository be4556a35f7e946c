//! Label to caption associations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One recovered `\label{...}` with the title text preceding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCaptionEntry {
    /// Cross-reference key
    pub label: String,
    /// Raw title text, LaTeX markup preserved
    pub caption: String,
}

impl LabelCaptionEntry {
    /// Create a new entry.
    pub fn new(label: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            caption: caption.into(),
        }
    }
}

/// Map from cross-reference key to caption.
///
/// Keys are unique; inserting an existing key replaces its caption, so the
/// last entry in scan order wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelCaptionMap {
    entries: BTreeMap<String, String>,
}

impl LabelCaptionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry, replacing any previous caption for the label.
    pub fn insert(&mut self, entry: LabelCaptionEntry) -> Option<String> {
        self.entries.insert(entry.label, entry.caption)
    }

    /// Look up the caption for a key.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no label was recovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(label, caption)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<LabelCaptionEntry> for LabelCaptionMap {
    fn from_iter<I: IntoIterator<Item = LabelCaptionEntry>>(iter: I) -> Self {
        let mut map = Self::new();
        for entry in iter {
            map.insert(entry);
        }
        map
    }
}

impl Extend<LabelCaptionEntry> for LabelCaptionMap {
    fn extend<I: IntoIterator<Item = LabelCaptionEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_writer_wins() {
        let mut map = LabelCaptionMap::new();
        map.insert(LabelCaptionEntry::new("table:tva", "Premier"));
        let previous = map.insert(LabelCaptionEntry::new("table:tva", "Second"));
        assert_eq!(previous.as_deref(), Some("Premier"));
        assert_eq!(map.get("table:tva"), Some("Second"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_from_iter() {
        let map: LabelCaptionMap = vec![
            LabelCaptionEntry::new("b", "B"),
            LabelCaptionEntry::new("a", "A"),
        ]
        .into_iter()
        .collect();
        let labels: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let map: LabelCaptionMap = std::iter::once(LabelCaptionEntry::new("fig:x", "Courbe"))
            .collect();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"fig:x":"Courbe"}"#);
    }
}
