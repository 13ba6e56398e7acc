//! Core type definitions for UA Switcher

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Domain to override-string mapping.
///
/// Keys are matched exactly as stored. Domains added through
/// [`Options::assign_domain`](crate::options::Options::assign_domain) are
/// lower-cased on entry; request hosts are not lower-cased before lookup.
pub type OverrideTable = BTreeMap<String, String>;

/// Which editor the options page shows for the entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Table,
    Text,
}

impl EditMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Text => "text",
        }
    }
}

bitflags::bitflags! {
    /// Option fields touched by a storage change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OptionFields: u8 {
        const CURRENT = 1 << 0;
        const DOMAINS = 1 << 1;
        const AVAILABLE = 1 << 2;
        const AVAILABLE_CHANGED = 1 << 3;
        const EDIT_MODE = 1 << 4;
        /// Fields that affect which override applies
        const RESOLUTION = Self::CURRENT.bits() | Self::DOMAINS.bits();
        /// Fields that affect the toolbar icon
        const ICON = Self::CURRENT.bits() | Self::AVAILABLE.bits();
    }
}
