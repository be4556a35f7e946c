//! Label/caption recovery by brace-depth scanning.
//!
//! A title opener (`\caption{`, `\begin{tab}[...]{`, `\begin{fig}[...]{`)
//! starts a region that ends at its matching closing brace. Inside it, every
//! `\label{id}` met at depth 1 records the text scanned since the opener as
//! the caption of `id`.

use super::MinerOptions;
use crate::error::Result;
use crate::model::{LabelCaptionEntry, LabelCaptionMap};
use regex::Regex;

/// Labels recovered from one title region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleScan {
    /// Entries in the order their labels appear
    pub entries: Vec<LabelCaptionEntry>,
    /// Byte offset just past the closing brace
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    ScanningForOpen { from: usize },
    InsideTitle { start: usize },
    Exiting { resume: usize },
}

/// Scanner for title openers and the labels inside them.
#[derive(Debug, Clone)]
pub struct CaptionScanner {
    opener: Regex,
    label: Regex,
}

impl CaptionScanner {
    /// Build the opener and label patterns from the options.
    pub fn new(options: &MinerOptions) -> Result<Self> {
        let mut alternatives = vec![format!(
            r"\\{}\s*\{{",
            regex::escape(&options.caption_command)
        )];
        if !options.title_environments.is_empty() {
            let envs: Vec<String> = options
                .title_environments
                .iter()
                .map(|e| regex::escape(e))
                .collect();
            alternatives.push(format!(
                r"\\begin\s*\{{\s*(?:{})\s*\}}\s*(?:\[[^\]]*\])?\s*\{{",
                envs.join("|")
            ));
        }
        let opener = Regex::new(&alternatives.join("|"))?;
        let label = Regex::new(&format!(
            r"^\\{}\s*\{{\s*([^}}]+)\}}",
            regex::escape(&options.label_command)
        ))?;
        Ok(Self { opener, label })
    }

    /// Recover all label/caption pairs. Later entries replace earlier ones
    /// with the same label.
    pub fn scan(&self, text: &str) -> LabelCaptionMap {
        self.scan_entries(text).into_iter().collect()
    }

    /// Recover label/caption pairs in scan order.
    ///
    /// Scanning for the next opener resumes right after the previous
    /// opener's brace, so a title nested inside another is scanned again on
    /// its own.
    pub fn scan_entries(&self, text: &str) -> Vec<LabelCaptionEntry> {
        let mut entries = Vec::new();
        let mut state = ScanState::ScanningForOpen { from: 0 };

        loop {
            state = match state {
                ScanState::ScanningForOpen { from } => match self.opener.find_at(text, from) {
                    Some(m) => ScanState::InsideTitle { start: m.end() },
                    None => break,
                },
                ScanState::InsideTitle { start } => {
                    match scan_title(text, start, &self.label) {
                        Some(scan) => entries.extend(scan.entries),
                        None => log::debug!("Unbalanced title at byte {}, ignored", start),
                    }
                    ScanState::Exiting { resume: start }
                }
                ScanState::Exiting { resume } => ScanState::ScanningForOpen { from: resume },
            };
        }

        log::debug!("Recovered {} label/caption pairs", entries.len());
        entries
    }
}

/// Scan one title region starting at `start` (the byte after its opening
/// brace).
///
/// Escaped braces `\{` and `\}` are literal text and never change depth.
/// Returns `None` when the region is not closed before the end of `text`.
pub fn scan_title(text: &str, start: usize, label: &Regex) -> Option<TitleScan> {
    let bytes = text.as_bytes();
    let mut depth = 1usize;
    let mut entries = Vec::new();
    let mut j = start;

    while j < bytes.len() {
        match bytes[j] {
            b'\\' if j + 1 < bytes.len() => {
                if depth == 1 {
                    if let Some(caps) = label.captures(&text[j..]) {
                        let caption = clean_caption(&text[start..j]);
                        if !caption.is_empty() {
                            entries.push(LabelCaptionEntry::new(caps[1].trim(), caption));
                        }
                        j += caps[0].len();
                        continue;
                    }
                }
                j += match bytes[j + 1] {
                    b'{' | b'}' => 2,
                    _ => 1,
                };
            }
            b'{' => {
                depth += 1;
                j += 1;
            }
            b'}' => {
                depth -= 1;
                j += 1;
                if depth == 0 {
                    return Some(TitleScan { entries, end: j });
                }
            }
            _ => j += 1,
        }
    }
    None
}

/// Trim, then drop one trailing stray backslash.
fn clean_caption(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_suffix('\\').unwrap_or(trimmed).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> CaptionScanner {
        CaptionScanner::new(&MinerOptions::default()).unwrap()
    }

    #[test]
    fn test_escaped_braces_preserved() {
        let map = scanner().scan(r"\caption{Taux \{élevé\} de TVA\label{table:x}}");
        assert_eq!(map.get("table:x"), Some(r"Taux \{élevé\} de TVA"));
    }

    #[test]
    fn test_tab_environment_with_options() {
        let source = "\\begin{tab}[htbp]{Évolution des taux de TVA\\label{table:historique tva}}\n...\\end{tab}";
        let map = scanner().scan(source);
        assert_eq!(
            map.get("table:historique tva"),
            Some("Évolution des taux de TVA")
        );
    }

    #[test]
    fn test_environment_without_option_group() {
        let map = scanner().scan(r"\begin{fig}{Courbe de Laffer\label{fig:laffer}}");
        assert_eq!(map.get("fig:laffer"), Some("Courbe de Laffer"));
    }

    #[test]
    fn test_nested_braces_kept() {
        let map = scanner().scan(r"\caption{Taux \emph{réduit} en 2012\label{t:r}}");
        assert_eq!(map.get("t:r"), Some(r"Taux \emph{réduit} en 2012"));
    }

    #[test]
    fn test_label_inside_nested_group_ignored() {
        let map = scanner().scan(r"\caption{Titre {\label{inner}} fin}");
        assert!(map.is_empty());
    }

    #[test]
    fn test_trailing_backslash_trimmed() {
        let map = scanner().scan("\\caption{Titre \\\n\\label{t}}");
        assert_eq!(map.get("t"), Some("Titre"));
    }

    #[test]
    fn test_no_label_not_recorded() {
        assert!(scanner().scan(r"\caption{Sans étiquette}").is_empty());
    }

    #[test]
    fn test_empty_caption_not_recorded() {
        assert!(scanner().scan(r"\caption{\label{vide}}").is_empty());
    }

    #[test]
    fn test_unbalanced_not_recorded() {
        assert!(scanner().scan(r"\caption{Titre ouvert \label{x} {").is_empty());
    }

    #[test]
    fn test_multiple_labels_in_one_title() {
        let entries = scanner().scan_entries(r"\caption{Titre\label{a} suite\label{b}}");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], LabelCaptionEntry::new("a", "Titre"));
        assert_eq!(entries[1].label, "b");
        assert!(entries[1].caption.starts_with("Titre"));
    }

    #[test]
    fn test_nested_title_scanned_again() {
        let source = r"\begin{tab}[h]{Tableau \caption{Interne\label{a}}\label{b}}";
        let entries = scanner().scan_entries(source);
        let labels: Vec<_> = entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
        assert_eq!(entries[1].caption, "Interne");
    }

    #[test]
    fn test_last_label_wins_in_scan_order() {
        let source = r"\caption{Premier\label{k}} \caption{Second\label{k}}";
        assert_eq!(scanner().scan(source).get("k"), Some("Second"));
    }

    #[test]
    fn test_scan_title_end_offset() {
        let text = r"\caption{A\label{a}} reste";
        let label = Regex::new(r"^\\label\s*\{\s*([^}]+)\}").unwrap();
        let scan = scan_title(text, "\\caption{".len(), &label).unwrap();
        assert_eq!(&text[scan.end..], " reste");
        assert_eq!(scan.entries, vec![LabelCaptionEntry::new("a", "A")]);
    }

    #[test]
    fn test_custom_environments() {
        let options = MinerOptions::new().with_title_environments(["tableau"]);
        let scanner = CaptionScanner::new(&options).unwrap();
        let map = scanner.scan(r"\begin{tableau}[h]{Recettes\label{t:rec}} \begin{tab}[h]{X\label{t:x}}");
        assert_eq!(map.get("t:rec"), Some("Recettes"));
        assert!(map.get("t:x").is_none());
    }
}
