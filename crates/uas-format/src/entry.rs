//! Entry model shared by the text format and the persisted option records.

use serde::{Deserialize, Serialize};

/// One line of a user-agent list.
///
/// The serde form matches the records the extension keeps in
/// `browser.storage.local`, e.g. `{"type": "user-agent", "label": .., "string": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Entry {
    /// Blank line
    Empty,
    /// `#` line; `text` is everything after the `#`
    Comment { text: String },
    /// Line without a `:` separator, kept verbatim
    Invalid { text: String },
    /// `label: value` line
    #[serde(rename = "user-agent")]
    Override {
        label: String,
        #[serde(rename = "string")]
        value: String,
    },
}

/// Ordered list of entries. Order is file order and lookup order.
pub type EntryList = Vec<Entry>;

impl Entry {
    /// Create an override entry.
    pub fn new_override(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Override {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Create a comment entry. `text` should not include the leading `#`.
    pub fn new_comment(text: impl Into<String>) -> Self {
        Self::Comment { text: text.into() }
    }

    /// Create an invalid entry.
    pub fn new_invalid(text: impl Into<String>) -> Self {
        Self::Invalid { text: text.into() }
    }

    #[inline]
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Override { .. })
    }

    /// Label and value if this is an override entry.
    #[inline]
    pub fn as_override(&self) -> Option<(&str, &str)> {
        match self {
            Self::Override { label, value } => Some((label, value)),
            _ => None,
        }
    }
}

/// Iterate `(label, value)` pairs of the override entries in list order.
pub fn overrides(entries: &[Entry]) -> impl Iterator<Item = (&str, &str)> {
    entries.iter().filter_map(Entry::as_override)
}

/// Label of the first override entry whose value equals `value`.
pub fn label_for_value<'a>(entries: &'a [Entry], value: &str) -> Option<&'a str> {
    overrides(entries)
        .find(|(_, v)| *v == value)
        .map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_storage_records() {
        let entries = vec![
            Entry::Empty,
            Entry::new_comment(" hi"),
            Entry::new_invalid("junk"),
            Entry::new_override("Linux / Firefox", "Mozilla/5.0 (X11)"),
        ];
        let json = serde_json::to_string(&entries).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"empty"},{"type":"comment","text":" hi"},{"type":"invalid","text":"junk"},{"type":"user-agent","label":"Linux / Firefox","string":"Mozilla/5.0 (X11)"}]"#
        );

        let back: EntryList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entries);
    }

    #[test]
    fn test_label_for_value_first_match_wins() {
        let entries = vec![
            Entry::new_comment("x"),
            Entry::new_override("First", "UA"),
            Entry::new_override("Second", "UA"),
        ];
        assert_eq!(label_for_value(&entries, "UA"), Some("First"));
        assert_eq!(label_for_value(&entries, "other"), None);
    }
}
