//! Extension options state
//!
//! All options the background script needs to answer a request live in one
//! explicit [`Options`] value. It is loaded once at startup
//! ([`Options::bootstrap`]) and afterwards only updated through
//! [`Options::apply_changes`] when the store reports a change.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use uas_format::{parse_entries, Entry, EntryList};

use crate::error::{ResolveError, StorageError};
use crate::resolver::resolve;
use crate::store::{decode_field, KeyValueStore, StorageChanges, StoreRecord};
use crate::types::{EditMode, OptionFields, OverrideTable};

/// Store keys.
pub mod keys {
    pub const CURRENT: &str = "current";
    pub const DOMAINS: &str = "domains";
    pub const AVAILABLE: &str = "available";
    pub const AVAILABLE_CHANGED: &str = "available-changed";
    pub const EDIT_MODE: &str = "edit-mode";

    pub const ALL: [&str; 5] = [CURRENT, DOMAINS, AVAILABLE, AVAILABLE_CHANGED, EDIT_MODE];
}

/// Storage area the options live in.
pub const LOCAL_AREA: &str = "local";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Options {
    /// Global override; `None` sends the browser's own string
    pub current: Option<String>,
    /// Per-domain overrides
    pub domains: OverrideTable,
    /// Entries offered in the popup
    pub available: Option<EntryList>,
    /// Whether the user has edited `available`
    pub available_changed: bool,
    pub edit_mode: EditMode,
}

impl Options {
    /// Read all options, falling back to the default for missing or
    /// undecodable keys.
    pub async fn load<S>(store: &S) -> Result<Self, StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        let record = store.get(&keys::ALL).await?;
        Ok(Self::from_record(&record))
    }

    /// Build from a record as returned by `storage.local.get()`.
    pub fn from_record(record: &StoreRecord) -> Self {
        Self {
            current: lenient_field(record, keys::CURRENT),
            domains: lenient_field(record, keys::DOMAINS).unwrap_or_default(),
            available: lenient_field(record, keys::AVAILABLE),
            available_changed: lenient_field(record, keys::AVAILABLE_CHANGED).unwrap_or_default(),
            edit_mode: lenient_field(record, keys::EDIT_MODE).unwrap_or_default(),
        }
    }

    /// Replace `available` with the parsed defaults unless the user has
    /// edited it. Returns whether the defaults were used.
    pub fn refresh_available(&mut self, default_text: &str) -> bool {
        if self.available.is_some() && self.available_changed {
            return false;
        }
        let entries = parse_entries(default_text);
        debug!("using {} default entries", entries.len());
        self.available = Some(entries);
        true
    }

    /// Startup: load the options, refresh `available` from `default_text`
    /// unless the user has edited it, and write everything back.
    pub async fn bootstrap<S>(store: &S, default_text: &str) -> Result<Self, StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        let mut options = Self::load(store).await?;
        options.refresh_available(default_text);

        store.set(options.to_record()?).await?;
        Ok(options)
    }

    /// Every option as a store record.
    pub fn to_record(&self) -> Result<StoreRecord, StorageError> {
        let mut record = StoreRecord::new();
        record.insert(keys::CURRENT.to_string(), serde_json::to_value(&self.current)?);
        record.insert(keys::DOMAINS.to_string(), serde_json::to_value(&self.domains)?);
        record.insert(keys::AVAILABLE.to_string(), serde_json::to_value(&self.available)?);
        record.insert(keys::AVAILABLE_CHANGED.to_string(), Value::Bool(self.available_changed));
        record.insert(keys::EDIT_MODE.to_string(), serde_json::to_value(self.edit_mode)?);
        Ok(record)
    }

    /// Entries offered in the popup (empty until loaded).
    pub fn entries(&self) -> &[Entry] {
        self.available.as_deref().unwrap_or(&[])
    }

    /// Resolve the override for `url` against these options.
    pub fn resolve(&self, url: &str) -> Result<Option<String>, ResolveError> {
        resolve(url, &self.domains, self.current.as_deref())
    }

    // -------------------------------------------------------------------------
    // Change reducer
    // -------------------------------------------------------------------------

    /// Apply a `storage.onChanged` event. Events from other areas are ignored.
    pub fn apply_storage_event(&mut self, area: &str, changes: &StorageChanges) -> OptionFields {
        if area != LOCAL_AREA {
            return OptionFields::empty();
        }
        self.apply_changes(changes)
    }

    /// Apply changed keys and report which fields actually changed.
    ///
    /// A removed or `null` value resets the field to its default. Unknown
    /// keys are ignored; values that fail to decode leave the field as is.
    pub fn apply_changes(&mut self, changes: &StorageChanges) -> OptionFields {
        let mut touched = OptionFields::empty();

        for (key, change) in changes {
            let new_value = change.new_value.as_ref();
            let field = match key.as_str() {
                keys::CURRENT => update_field(&mut self.current, key, new_value, |v| v),
                keys::DOMAINS => update_field(&mut self.domains, key, new_value, Option::unwrap_or_default),
                keys::AVAILABLE => update_field(&mut self.available, key, new_value, |v| v),
                keys::AVAILABLE_CHANGED => {
                    update_field(&mut self.available_changed, key, new_value, Option::unwrap_or_default)
                }
                keys::EDIT_MODE => update_field(&mut self.edit_mode, key, new_value, Option::unwrap_or_default),
                _ => continue,
            };
            if field {
                touched |= field_flag(key);
            }
        }

        touched
    }

    // -------------------------------------------------------------------------
    // Popup actions
    // -------------------------------------------------------------------------

    /// Make `value` the global override. Returns the record to persist.
    pub fn select(&mut self, value: impl Into<String>) -> StoreRecord {
        self.current = Some(value.into());
        self.current_record()
    }

    /// Select the first entry with the given label.
    pub fn select_label(&mut self, label: &str) -> Option<StoreRecord> {
        let value = uas_format::overrides(self.entries())
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.to_string())?;
        Some(self.select(value))
    }

    /// Go back to the browser's own string.
    pub fn disable(&mut self) -> StoreRecord {
        self.current = None;
        self.current_record()
    }

    /// Pin the current override to `domain` (lower-cased).
    ///
    /// Returns `None` if no override is active or the domain is blank.
    pub fn assign_domain(&mut self, domain: &str) -> Option<StoreRecord> {
        let domain = domain.trim().to_lowercase();
        if domain.is_empty() {
            return None;
        }
        let current = self.current.clone()?;
        self.domains.insert(domain, current);
        Some(self.domains_record())
    }

    /// Drop the override for `domain`. Returns `None` if there was none.
    pub fn remove_domain(&mut self, domain: &str) -> Option<StoreRecord> {
        let domain = domain.trim().to_lowercase();
        self.domains.remove(&domain)?;
        Some(self.domains_record())
    }

    fn current_record(&self) -> StoreRecord {
        let mut record = StoreRecord::new();
        let value = self.current.clone().map_or(Value::Null, Value::String);
        record.insert(keys::CURRENT.to_string(), value);
        record
    }

    fn domains_record(&self) -> StoreRecord {
        let domains = self
            .domains
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let mut record = StoreRecord::new();
        record.insert(keys::DOMAINS.to_string(), Value::Object(domains));
        record
    }
}

fn field_flag(key: &str) -> OptionFields {
    match key {
        keys::CURRENT => OptionFields::CURRENT,
        keys::DOMAINS => OptionFields::DOMAINS,
        keys::AVAILABLE => OptionFields::AVAILABLE,
        keys::AVAILABLE_CHANGED => OptionFields::AVAILABLE_CHANGED,
        keys::EDIT_MODE => OptionFields::EDIT_MODE,
        _ => OptionFields::empty(),
    }
}

/// Decode `key`, logging and discarding bad values.
fn lenient_field<T: DeserializeOwned>(record: &StoreRecord, key: &str) -> Option<T> {
    match decode_field(record, key) {
        Ok(value) => value,
        Err(e) => {
            warn!("{e}; using default");
            None
        }
    }
}

/// Set `slot` from a changed value. `or_default` maps a missing value to the
/// field type. Returns whether the field changed.
fn update_field<T, D>(slot: &mut T, key: &str, new_value: Option<&Value>, or_default: fn(Option<D>) -> T) -> bool
where
    T: PartialEq,
    D: DeserializeOwned,
{
    let decoded = match new_value {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<D>(value.clone()) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring change to '{key}': {e}");
                return false;
            }
        },
    };

    let next = or_default(decoded);
    if *slot == next {
        return false;
    }
    *slot = next;
    true
}
