//! Source encoding detection and text normalization.
//!
//! LaTeX chapters are not always UTF-8. The transducer falls back to
//! Latin-1 for such files, so anchors mined from the source only match the
//! draft when both sides are decoded the same way and normalized to one
//! Unicode form.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Encoding a source file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceEncoding {
    /// Valid UTF-8
    Utf8,
    /// UTF-8 with a byte order mark (stripped)
    Utf8Bom,
    /// Anything else, read byte-for-byte as ISO-8859-1
    Latin1,
}

impl std::fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceEncoding::Utf8 => write!(f, "UTF-8"),
            SourceEncoding::Utf8Bom => write!(f, "UTF-8 (BOM)"),
            SourceEncoding::Latin1 => write!(f, "Latin-1"),
        }
    }
}

/// A decoded and normalized source text.
#[derive(Debug, Clone)]
pub struct DecodedSource {
    /// Normalized text (LF line endings, NFC)
    pub text: String,
    /// Encoding detected on the raw bytes
    pub encoding: SourceEncoding,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Detect the encoding of raw source bytes.
pub fn detect_encoding(data: &[u8]) -> SourceEncoding {
    if let Some(rest) = data.strip_prefix(UTF8_BOM) {
        if std::str::from_utf8(rest).is_ok() {
            return SourceEncoding::Utf8Bom;
        }
    } else if std::str::from_utf8(data).is_ok() {
        return SourceEncoding::Utf8;
    }
    SourceEncoding::Latin1
}

/// Decode raw source bytes and normalize the result.
pub fn decode_source(data: &[u8]) -> DecodedSource {
    let encoding = detect_encoding(data);
    let raw = match encoding {
        SourceEncoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
        SourceEncoding::Utf8Bom => String::from_utf8_lossy(&data[UTF8_BOM.len()..]).into_owned(),
        SourceEncoding::Latin1 => data.iter().map(|&b| b as char).collect(),
    };
    DecodedSource {
        text: normalize_text(&raw),
        encoding,
    }
}

/// Read and decode a source file.
///
/// # Errors
/// * `Error::SourceNotFound` if the path does not exist
/// * `Error::Io` if the file cannot be read
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<DecodedSource> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    let decoded = decode_source(&data);
    log::debug!("Decoded {} as {}", path.display(), decoded.encoding);
    Ok(decoded)
}

/// Decode transducer output, replacing invalid sequences.
pub fn decode_draft(data: &[u8]) -> String {
    normalize_text(&String::from_utf8_lossy(data))
}

/// Normalize line endings to LF and Unicode to NFC.
pub fn normalize_text(text: &str) -> String {
    let unified = if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    };
    unified.nfc().collect()
}
