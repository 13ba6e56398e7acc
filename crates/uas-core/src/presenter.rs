//! Toolbar icon presentation
//!
//! Turns the active override into what the browser action shows: a short
//! badge derived from the entry label, a title, and the icon to use.

use uas_format::{label_for_value, Entry};

use crate::options::Options;

/// Badge text for the active override.
///
/// Empty when no override is active, or when no entry carries the active
/// string (a custom string set elsewhere still shows as empty).
pub fn badge_text(entries: &[Entry], active: Option<&str>) -> String {
    active
        .and_then(|value| label_for_value(entries, value))
        .map(abbreviate_label)
        .unwrap_or_default()
}

/// Abbreviate an entry label for the badge.
///
/// - `"Windows / Chrome"` -> `"W/C"` (first two `/` parts)
/// - `"Mobile Safari iOS"` -> `"MSI"` (first three words)
/// - `"Googlebot"` -> `"GO"`
pub fn abbreviate_label(label: &str) -> String {
    if label.contains('/') {
        label
            .split('/')
            .take(2)
            .map(|part| first_char(part.trim()))
            .collect::<Vec<_>>()
            .join("/")
            .to_uppercase()
    } else if label.contains(char::is_whitespace) {
        label
            .split_whitespace()
            .take(3)
            .map(first_char)
            .collect::<String>()
            .to_uppercase()
    } else {
        label.chars().take(2).collect::<String>().to_uppercase()
    }
}

#[inline]
fn first_char(s: &str) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}

/// Whether request headers and scripts need rewriting at all.
pub fn processing_enabled(options: &Options) -> bool {
    !options.domains.is_empty() || options.current.is_some()
}

/// Static strings and paths for the browser action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconConfig {
    pub app_name: String,
    pub enabled_message: String,
    pub disabled_message: String,
    pub enabled_icon: String,
    pub disabled_icon: String,
    pub badge_color: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            app_name: "User Agent Switcher".to_string(),
            enabled_message: "Enabled".to_string(),
            disabled_message: "Disabled".to_string(),
            enabled_icon: "assets/icon.svg".to_string(),
            disabled_icon: "assets/icon-disabled.svg".to_string(),
            badge_color: "darkgray".to_string(),
        }
    }
}

/// Everything the browser action displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconState {
    pub title: String,
    pub badge: String,
    pub icon_path: String,
    pub badge_color: String,
}

#[derive(Debug, Clone, Default)]
pub struct IconPresenter {
    config: IconConfig,
}

impl IconPresenter {
    pub fn new(config: IconConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IconConfig {
        &self.config
    }

    /// Title: `"<app> – <Enabled|Disabled>"`, plus `" (<badge>)"` when enabled.
    pub fn title(&self, entries: &[Entry], active: Option<&str>) -> String {
        match active {
            Some(_) => format!(
                "{} – {} ({})",
                self.config.app_name,
                self.config.enabled_message,
                badge_text(entries, active)
            ),
            None => format!("{} – {}", self.config.app_name, self.config.disabled_message),
        }
    }

    pub fn state(&self, entries: &[Entry], active: Option<&str>) -> IconState {
        let icon_path = if active.is_some() {
            &self.config.enabled_icon
        } else {
            &self.config.disabled_icon
        };

        IconState {
            title: self.title(entries, active),
            badge: badge_text(entries, active),
            icon_path: icon_path.clone(),
            badge_color: self.config.badge_color.clone(),
        }
    }

    /// Icon state for the global override in `options`.
    pub fn for_options(&self, options: &Options) -> IconState {
        self.state(options.entries(), options.current.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<Entry> {
        vec![
            Entry::new_comment(" browsers"),
            Entry::new_override("Chrome / Windows", "UA-CW"),
            Entry::new_override("Googlebot", "UA-G"),
            Entry::new_override("Mobile Safari iOS", "UA-MSI"),
            Entry::new_override("Duplicate", "UA-G"),
        ]
    }

    #[test]
    fn test_abbreviate_label() {
        assert_eq!(abbreviate_label("Chrome / Windows"), "C/W");
        assert_eq!(abbreviate_label("Googlebot"), "GO");
        assert_eq!(abbreviate_label("Mobile Safari iOS"), "MSI");
        assert_eq!(abbreviate_label("one two three four"), "OTT");
        assert_eq!(abbreviate_label("a/b/c"), "A/B");
        assert_eq!(abbreviate_label("/tail"), "/T");
        assert_eq!(abbreviate_label("x"), "X");
        assert_eq!(abbreviate_label(""), "");
    }

    #[test]
    fn test_badge_text() {
        let entries = entries();
        assert_eq!(badge_text(&entries, None), "");
        assert_eq!(badge_text(&entries, Some("UA-CW")), "C/W");
        assert_eq!(badge_text(&entries, Some("UA-MSI")), "MSI");
        // first match wins
        assert_eq!(badge_text(&entries, Some("UA-G")), "GO");
        assert_eq!(badge_text(&entries, Some("custom")), "");
    }

    #[test]
    fn test_icon_state() {
        let presenter = IconPresenter::default();
        let entries = entries();

        let on = presenter.state(&entries, Some("UA-CW"));
        assert_eq!(on.title, "User Agent Switcher – Enabled (C/W)");
        assert_eq!(on.badge, "C/W");
        assert_eq!(on.icon_path, "assets/icon.svg");
        assert_eq!(on.badge_color, "darkgray");

        let off = presenter.state(&entries, None);
        assert_eq!(off.title, "User Agent Switcher – Disabled");
        assert_eq!(off.badge, "");
        assert_eq!(off.icon_path, "assets/icon-disabled.svg");
    }

    #[test]
    fn test_processing_enabled() {
        let mut options = Options::default();
        assert!(!processing_enabled(&options));

        options.domains.insert("example.com".to_string(), "UA".to_string());
        assert!(processing_enabled(&options));

        options.domains.clear();
        options.current = Some("UA".to_string());
        assert!(processing_enabled(&options));
    }
}
