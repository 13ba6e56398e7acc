//! Parser and serializer for the `user-agents.txt` text format.
//!
//! One entry per line:
//!
//! ```text
//! # comment
//! Windows / Chrome: Mozilla/5.0 (Windows NT 10.0; Win64; x64) ...
//! ```
//!
//! Everything before the first `:` is the (percent-encoded) label, everything
//! after it is the user-agent string. Lines without a `:` are kept as
//! [`Entry::Invalid`] so that a file survives a parse/serialize cycle.

use std::borrow::Cow;

use log::debug;

use crate::entry::{Entry, EntryList};

const SEPARATOR: char = ':';
const COMMENT_PREFIX: char = '#';

/// Parse `text` into a fresh entry list.
pub fn parse_entries(text: &str) -> EntryList {
    let mut entries = Vec::new();
    parse_entries_into(&mut entries, text, false);
    entries
}

/// Parse `text` into `entries`.
///
/// Unless `append` is set the list is cleared first. Returns the number of
/// entries added.
pub fn parse_entries_into(entries: &mut EntryList, text: &str, append: bool) -> usize {
    if !append {
        entries.clear();
    }

    let before = entries.len();
    // Only '\n' splits lines; a stray '\r' is removed by the trim.
    for raw_line in text.split('\n') {
        entries.push(parse_line(raw_line));
    }

    entries.len() - before
}

/// Classify a single line. Never fails.
pub fn parse_line(raw_line: &str) -> Entry {
    let line = raw_line.trim();

    if line.is_empty() {
        return Entry::Empty;
    }

    if let Some(text) = line.strip_prefix(COMMENT_PREFIX) {
        return Entry::Comment {
            text: text.to_string(),
        };
    }

    match line.split_once(SEPARATOR) {
        Some((label, value)) => Entry::Override {
            label: decode_label(label).trim().to_string(),
            value: value.trim().to_string(),
        },
        None => Entry::Invalid {
            text: line.to_string(),
        },
    }
}

/// Serialize entries back into the text format.
///
/// Lines are joined with `\n`; there is no trailing newline.
pub fn serialize_entries(entries: &[Entry]) -> String {
    let mut out = String::new();

    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match entry {
            Entry::Empty => {}
            Entry::Comment { text } => {
                out.push(COMMENT_PREFIX);
                out.push_str(text);
            }
            Entry::Invalid { text } => out.push_str(text),
            Entry::Override { label, value } => {
                out.push_str(&encode_label(label));
                out.push_str(": ");
                out.push_str(value);
            }
        }
    }

    out
}

// =============================================================================
// Label Escaping
// =============================================================================

/// Percent-decode a label.
///
/// Malformed escapes are kept literally. If the decoded bytes are not UTF-8
/// the label is returned undecoded.
pub fn decode_label(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = hex_pair(bytes, i + 1) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    match String::from_utf8(out) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => {
            debug!("label {raw:?} does not decode to UTF-8, keeping it as written");
            Cow::Borrowed(raw)
        }
    }
}

/// Percent-encode a label so that [`decode_label`] gives it back unchanged.
///
/// Escapes `:` (the separator), a leading `#` (would start a comment), line
/// feeds, and any `%` that would otherwise be read as an escape.
pub fn encode_label(label: &str) -> Cow<'_, str> {
    let bytes = label.as_bytes();
    let needs_escape = label.contains(SEPARATOR)
        || label.contains('\n')
        || label.starts_with(COMMENT_PREFIX)
        || bytes
            .iter()
            .enumerate()
            .any(|(i, &b)| b == b'%' && hex_pair(bytes, i + 1).is_some());
    if !needs_escape {
        return Cow::Borrowed(label);
    }

    let mut out = String::with_capacity(label.len() + 8);
    for (i, ch) in label.char_indices() {
        match ch {
            ':' => out.push_str("%3A"),
            '\n' => out.push_str("%0A"),
            '#' if i == 0 => out.push_str("%23"),
            '%' if hex_pair(bytes, i + 1).is_some() => out.push_str("%25"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Byte encoded by the two hex digits at `pos`, if both are present.
#[inline]
fn hex_pair(bytes: &[u8], pos: usize) -> Option<u8> {
    let hi = hex_value(*bytes.get(pos)?)?;
    let lo = hex_value(*bytes.get(pos + 1)?)?;
    Some((hi << 4) | lo)
}

// =============================================================================
// List Statistics
// =============================================================================

/// Per-variant counts for a parsed list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListStats {
    pub lines: usize,
    pub overrides: usize,
    pub comments: usize,
    pub empty: usize,
    /// 1-based line numbers of invalid lines
    pub invalid_lines: Vec<usize>,
}

impl ListStats {
    /// Count entries, assuming one entry per source line.
    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut stats = Self {
            lines: entries.len(),
            ..Self::default()
        };
        for (idx, entry) in entries.iter().enumerate() {
            match entry {
                Entry::Empty => stats.empty += 1,
                Entry::Comment { .. } => stats.comments += 1,
                Entry::Invalid { .. } => stats.invalid_lines.push(idx + 1),
                Entry::Override { .. } => stats.overrides += 1,
            }
        }
        stats
    }

    pub fn invalid(&self) -> usize {
        self.invalid_lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_sample_text() {
        let text = "# comment\nChrome / Windows: Mozilla/5.0 Chrome\n\nmalformedline";
        let entries = parse_entries(text);
        assert_eq!(
            entries,
            vec![
                Entry::new_comment(" comment"),
                Entry::new_override("Chrome / Windows", "Mozilla/5.0 Chrome"),
                Entry::Empty,
                Entry::new_invalid("malformedline"),
            ]
        );
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let entry = parse_line("Bot :  Mozilla/5.0 (compatible; +http://example.com/bot)  ");
        assert_eq!(
            entry,
            Entry::new_override("Bot", "Mozilla/5.0 (compatible; +http://example.com/bot)")
        );
    }

    #[test]
    fn test_label_is_percent_decoded() {
        assert_eq!(parse_line("A%3AB: ua"), Entry::new_override("A:B", "ua"));
        assert_eq!(parse_line("Caf%C3%A9: ua"), Entry::new_override("Café", "ua"));
    }

    #[test]
    fn test_malformed_escape_kept_literally() {
        assert_eq!(parse_line("50%: ua"), Entry::new_override("50%", "ua"));
        assert_eq!(parse_line("%FF: ua"), Entry::new_override("%FF", "ua"));
        assert_eq!(parse_line("a%41%zz: ua"), Entry::new_override("aA%zz", "ua"));
    }

    #[test]
    fn test_carriage_return_is_trimmed() {
        let entries = parse_entries("# one\r\nLabel: UA\r\n");
        assert_eq!(
            entries,
            vec![
                Entry::new_comment(" one"),
                Entry::new_override("Label", "UA"),
                Entry::Empty,
            ]
        );
    }

    #[test]
    fn test_empty_text_is_one_empty_line() {
        assert_eq!(parse_entries(""), vec![Entry::Empty]);
    }

    #[test]
    fn test_parse_into_append_and_replace() {
        let mut entries = vec![Entry::new_comment("keep")];

        let added = parse_entries_into(&mut entries, "A: 1", true);
        assert_eq!(added, 1);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], Entry::new_comment("keep"));

        parse_entries_into(&mut entries, "B: 2", false);
        assert_eq!(entries, vec![Entry::new_override("B", "2")]);
    }

    #[test]
    fn test_serialize_format() {
        let entries = vec![
            Entry::new_comment(" header"),
            Entry::Empty,
            Entry::new_override("Win:10", "UA: with colon"),
            Entry::new_invalid("stray"),
        ];
        assert_eq!(
            serialize_entries(&entries),
            "# header\n\nWin%3A10: UA: with colon\nstray"
        );
        assert_eq!(serialize_entries(&[]), "");
    }

    #[test]
    fn test_encode_label_escapes_every_separator() {
        assert_eq!(encode_label("a:b:c"), "a%3Ab%3Ac");
        assert_eq!(encode_label("#1 pick"), "%231 pick");
        assert_eq!(encode_label("mid#dle"), "mid#dle");
        assert_eq!(encode_label("100%25"), "100%2525");
        assert_eq!(encode_label("50% off"), "50% off");
        assert!(matches!(encode_label("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_round_trip_tricky_labels() {
        let entries = vec![
            Entry::new_override("#hash", "x"),
            Entry::new_override("pct %41", "y"),
            Entry::new_override("", ""),
            Entry::new_override("multi\nline", "z"),
            Entry::new_comment(""),
        ];
        assert_eq!(parse_entries(&serialize_entries(&entries)), entries);
    }

    #[test]
    fn test_list_stats() {
        let entries = parse_entries("# c\nA: 1\n\nbad\nB: 2\nworse");
        let stats = ListStats::from_entries(&entries);
        assert_eq!(stats.lines, 6);
        assert_eq!(stats.overrides, 2);
        assert_eq!(stats.comments, 1);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.invalid_lines, vec![4, 6]);
        assert_eq!(stats.invalid(), 2);
    }

    proptest! {
        #[test]
        fn proptest_parse_serialize_round_trip(lines in prop::collection::vec("[ -~\t\r]{0,24}", 1..12)) {
            let text = lines.join("\n");
            let entries = parse_entries(&text);
            let again = parse_entries(&serialize_entries(&entries));
            prop_assert_eq!(again, entries);
        }

        #[test]
        fn proptest_override_round_trip(label in "[ -~]{0,16}", value in "[!-~]([ -~]{0,30}[!-~])?") {
            let entries = parse_entries(&serialize_entries(&[Entry::new_override(label.trim(), value.clone())]));
            prop_assert_eq!(entries, vec![Entry::new_override(label.trim(), value)]);
        }
    }
}
