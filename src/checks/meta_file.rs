//! `meta.txt` decoding
//!
//! Submissions are written by hand in whatever editor the contributor has, so
//! the file is read as latin-1 (every byte is a character) and each line is a
//! loose `key: value` pair.

use serde::Serialize;

/// One `key: value` line from meta.txt, both sides trimmed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaEntry {
  pub line: usize,
  pub key: String,
  pub value: String,
}

/// Result of parsing a whole meta.txt
#[derive(Debug, Clone, Default)]
pub struct ParsedMeta {
  pub entries: Vec<MetaEntry>,
  /// 1-based numbers of non-blank lines with no `:` separator
  pub skipped: Vec<usize>,
}

/// Decode bytes as latin-1
pub fn decode_latin1(bytes: &[u8]) -> String {
  bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse raw meta.txt bytes into ordered entries
///
/// The value is everything after the first colon, so URLs survive intact.
pub fn parse_meta(bytes: &[u8]) -> ParsedMeta {
  let text = decode_latin1(bytes);
  let mut parsed = ParsedMeta::default();

  for (idx, raw) in text.lines().enumerate() {
    let line = idx + 1;
    if raw.trim().is_empty() {
      continue;
    }
    match raw.split_once(':') {
      Some((key, value)) => parsed.entries.push(MetaEntry {
        line,
        key: key.trim().to_string(),
        value: value.trim().to_string(),
      }),
      None => parsed.skipped.push(line),
    }
  }

  parsed
}
