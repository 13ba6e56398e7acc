//! WebAssembly bindings for UA Switcher
//!
//! Entries, records and change events cross the boundary as plain JS objects
//! in the same shape `browser.storage.local` uses.

use wasm_bindgen::prelude::*;
use uas_core::{
    options::LOCAL_AREA,
    presenter::{badge_text as core_badge_text, processing_enabled as core_processing_enabled},
    resolver::resolve_host,
    url::extract_host,
    Entry, IconPresenter, IconState, Options, OverrideTable, StorageChanges, StoreRecord,
    DEFAULT_USER_AGENTS,
};
use uas_format::{parse_entries, parse_entries_into, serialize_entries};

// =============================================================================
// JS <-> serde conversion
// =============================================================================

fn from_js<T: serde::de::DeserializeOwned>(value: &JsValue, what: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return serde_json::from_str("null")
            .map_err(|e| JsValue::from_str(&format!("Missing {}: {}", what, e)));
    }
    let json: String = js_sys::JSON::stringify(value)
        .map_err(|_| JsValue::from_str(&format!("Failed to stringify {}", what)))?
        .into();
    serde_json::from_str(&json).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize: {}", e)))?;
    js_sys::JSON::parse(&json)
}

fn entries_from_js(value: &JsValue) -> Result<Vec<Entry>, JsValue> {
    let entries: Option<Vec<Entry>> = from_js(value, "entry list")?;
    Ok(entries.unwrap_or_default())
}

fn icon_state_to_js(state: &IconState) -> JsValue {
    let result = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&result, &"title".into(), &JsValue::from_str(&state.title));
    let _ = js_sys::Reflect::set(&result, &"badge".into(), &JsValue::from_str(&state.badge));
    let _ = js_sys::Reflect::set(&result, &"iconPath".into(), &JsValue::from_str(&state.icon_path));
    let _ = js_sys::Reflect::set(&result, &"badgeColor".into(), &JsValue::from_str(&state.badge_color));
    result.into()
}

// =============================================================================
// Stateless exports
// =============================================================================

/// Override string for `url`; throws if the URL has no host.
#[wasm_bindgen]
pub fn resolve(url: &str, domains: JsValue, current: Option<String>) -> Result<Option<String>, JsValue> {
    let domains: Option<OverrideTable> = from_js(&domains, "domain table")?;
    let domains = domains.unwrap_or_default();
    uas_core::resolve(url, &domains, current.as_deref())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn parse(text: &str) -> Result<JsValue, JsValue> {
    to_js(&parse_entries(text))
}

/// Parse `text` after the entries already in `entries`.
#[wasm_bindgen]
pub fn parse_append(entries: JsValue, text: &str) -> Result<JsValue, JsValue> {
    let mut entries = entries_from_js(&entries)?;
    parse_entries_into(&mut entries, text, true);
    to_js(&entries)
}

#[wasm_bindgen]
pub fn serialize(entries: JsValue) -> Result<String, JsValue> {
    Ok(serialize_entries(&entries_from_js(&entries)?))
}

#[wasm_bindgen]
pub fn checksum(entries: JsValue) -> Result<u32, JsValue> {
    Ok(uas_core::checksum(&entries_from_js(&entries)?))
}

#[wasm_bindgen]
pub fn badge_text(entries: JsValue, active: Option<String>) -> Result<String, JsValue> {
    Ok(core_badge_text(&entries_from_js(&entries)?, active.as_deref()))
}

#[wasm_bindgen]
pub fn icon_state(entries: JsValue, active: Option<String>) -> Result<JsValue, JsValue> {
    let state = IconPresenter::default().state(&entries_from_js(&entries)?, active.as_deref());
    Ok(icon_state_to_js(&state))
}

/// Whether header and script rewriting is needed for these options.
#[wasm_bindgen]
pub fn processing_enabled(domains: JsValue, current: Option<String>) -> Result<bool, JsValue> {
    let domains: Option<OverrideTable> = from_js(&domains, "domain table")?;
    let options = Options {
        domains: domains.unwrap_or_default(),
        current,
        ..Options::default()
    };
    Ok(core_processing_enabled(&options))
}

#[wasm_bindgen]
pub fn default_user_agents() -> String {
    DEFAULT_USER_AGENTS.to_string()
}

#[wasm_bindgen]
pub fn extract_host_js(url: &str) -> Option<String> {
    extract_host(url).map(|h| h.to_string())
}

// =============================================================================
// Background state
// =============================================================================

/// Options state owned by the background script.
#[wasm_bindgen]
pub struct OptionsHandle {
    options: Options,
    presenter: IconPresenter,
}

#[wasm_bindgen]
impl OptionsHandle {
    /// Build from the result of `storage.local.get()`. The default list is
    /// used unless the stored one was edited; call `record()` and write it
    /// back to finish startup.
    #[wasm_bindgen(constructor)]
    pub fn new(record: JsValue, default_text: Option<String>) -> Result<OptionsHandle, JsValue> {
        let record: Option<StoreRecord> = from_js(&record, "options record")?;
        let mut options = Options::from_record(&record.unwrap_or_default());
        options.refresh_available(default_text.as_deref().unwrap_or(DEFAULT_USER_AGENTS));

        Ok(OptionsHandle {
            options,
            presenter: IconPresenter::default(),
        })
    }

    /// All options as a record for `storage.local.set()`.
    pub fn record(&self) -> Result<JsValue, JsValue> {
        let record = self
            .options
            .to_record()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        to_js(&record)
    }

    /// Apply a `storage.onChanged` event. Returns the changed-field bits.
    pub fn apply_changes(&mut self, changes: JsValue, area: &str) -> Result<u8, JsValue> {
        let changes: Option<StorageChanges> = from_js(&changes, "storage changes")?;
        let Some(changes) = changes else {
            web_sys::console::warn_1(&JsValue::from_str("apply_changes: no changes given"));
            return Ok(0);
        };
        Ok(self.options.apply_storage_event(area, &changes).bits())
    }

    /// Override for a request or tab URL; `undefined` means leave it alone.
    pub fn resolve(&self, url: &str) -> Option<String> {
        let host = extract_host(url)?;
        resolve_host(host, &self.options.domains, self.options.current.as_deref()).map(str::to_string)
    }

    pub fn processing_enabled(&self) -> bool {
        core_processing_enabled(&self.options)
    }

    pub fn current(&self) -> Option<String> {
        self.options.current.clone()
    }

    pub fn icon_state(&self) -> JsValue {
        icon_state_to_js(&self.presenter.for_options(&self.options))
    }

    pub fn local_area() -> String {
        LOCAL_AREA.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_resolves_without_store() {
        let mut options = Options::default();
        options.refresh_available("Googlebot: UA-G");
        options.domains.insert("example.com".to_string(), "UA-G".to_string());

        let handle = OptionsHandle {
            options,
            presenter: IconPresenter::default(),
        };
        assert_eq!(handle.resolve("https://www.example.com/"), Some("UA-G".to_string()));
        assert_eq!(handle.resolve("about:blank"), None);
        assert!(handle.processing_enabled());
    }
}
