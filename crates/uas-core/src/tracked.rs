//! Change-tracked, persistable lists
//!
//! [`ChangeTracked`] wraps a plain `Vec<T>` and remembers the checksum it had
//! when it was loaded (or last marked unchanged). `changed()` is computed from
//! a fresh checksum on every call, so there is no cached flag to go stale.
//!
//! The list never talks to a store on its own; callers pass one into
//! [`ChangeTracked::load`] and [`ChangeTracked::store`].

use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uas_format::{parse_entries, serialize_entries, Entry};

use crate::error::{StorageError, TrackedError};
use crate::hash::checksum;
use crate::store::{decode_field, KeyValueStore, StoreRecord};

/// A list persisted under `key`, with a sticky "user changed this" flag under
/// `changed_key`.
#[derive(Debug, Clone)]
pub struct ChangeTracked<T> {
    items: Vec<T>,
    key: String,
    changed_key: String,
    baseline: u32,
    persisted_changed: bool,
}

/// Contents replaced by [`ChangeTracked::reset_to_defaults`].
///
/// Hand it to [`ChangeTracked::undo_reset`] to restore them. Dropping it
/// closes the undo window.
#[must_use = "dropping the token discards the undo snapshot"]
#[derive(Debug, Clone)]
pub struct ResetUndo<T> {
    previous: Vec<T>,
}

impl<T> ResetUndo<T> {
    pub fn previous(&self) -> &[T] {
        &self.previous
    }
}

impl<T> ChangeTracked<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Build from an in-memory list. The list starts unchanged.
    pub fn from_vec(key: impl Into<String>, items: Vec<T>, changed_key: impl Into<String>) -> Self {
        let mut list = Self {
            items,
            key: key.into(),
            changed_key: changed_key.into(),
            baseline: 0,
            persisted_changed: false,
        };
        list.mark_unchanged();
        list
    }

    /// Load the list stored under `key` (empty if absent).
    ///
    /// The list starts unchanged whatever `changed_key` says; the persisted
    /// flag is available from [`persisted_changed`](Self::persisted_changed).
    pub async fn load<S>(store: &S, key: &str, changed_key: &str) -> Result<Self, StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        let record = store.get(&[key, changed_key]).await?;
        let items: Vec<T> = decode_field(&record, key)?.unwrap_or_default();
        let persisted_changed = decode_field(&record, changed_key)?.unwrap_or(false);

        debug!("loaded {} items from '{key}' (changed={persisted_changed})", items.len());

        let mut list = Self::from_vec(key, items, changed_key);
        list.persisted_changed = persisted_changed;
        Ok(list)
    }

    /// Checksum of the current contents.
    #[inline]
    pub fn checksum(&self) -> u32 {
        checksum(&self.items)
    }

    /// Treat the current contents as the unchanged state.
    pub fn mark_unchanged(&mut self) {
        self.baseline = self.checksum();
    }

    /// Whether the contents differ from the unchanged state.
    pub fn changed(&self) -> bool {
        self.checksum() != self.baseline
    }

    /// The `changed_key` flag as last read from or written to the store.
    pub fn persisted_changed(&self) -> bool {
        self.persisted_changed
    }

    /// Persist the contents under `key`.
    ///
    /// If the list has changed, `true` is also written under `changed_key`.
    /// The flag is never cleared here and the baseline is left alone.
    pub async fn store<S>(&mut self, store: &S) -> Result<(), StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        let mut record = StoreRecord::new();
        record.insert(self.key.clone(), serde_json::to_value(&self.items)?);

        let changed = self.changed();
        if changed {
            record.insert(self.changed_key.clone(), Value::Bool(true));
        }

        store.set(record).await?;
        if changed {
            self.persisted_changed = true;
        }
        Ok(())
    }

    /// Restore the contents captured by a reset and persist them.
    ///
    /// Since the baseline is the reset state, the restored list usually
    /// reports `changed()` again and re-arms the persisted flag.
    pub async fn undo_reset<S>(&mut self, store: &S, undo: ResetUndo<T>) -> Result<(), StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        self.items = undo.previous;
        self.store(store).await
    }

    // -------------------------------------------------------------------------
    // Collection operations
    // -------------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Append an item and return its index.
    pub fn push(&mut self, item: T) -> usize {
        self.items.push(item);
        self.items.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<T, TrackedError> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    /// Replace the item at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, item: T) -> Result<T, TrackedError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.items[index], item))
    }

    /// Remove up to `delete_count` items at `start` and insert `items` there.
    ///
    /// `start == len()` appends. Returns the removed items.
    pub fn splice<I>(&mut self, start: usize, delete_count: usize, items: I) -> Result<Vec<T>, TrackedError>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.items.len();
        if start > len {
            return Err(TrackedError::IndexOutOfRange { index: start, len });
        }
        let end = start + delete_count.min(len - start);
        Ok(self.items.splice(start..end, items).collect())
    }

    /// Replace the whole contents, returning the old ones.
    pub fn replace_all(&mut self, items: Vec<T>) -> Vec<T> {
        std::mem::replace(&mut self.items, items)
    }

    fn check_index(&self, index: usize) -> Result<(), TrackedError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(TrackedError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl ChangeTracked<Entry> {
    /// Contents in the `user-agents.txt` text format.
    pub fn to_text(&self) -> String {
        serialize_entries(&self.items)
    }

    /// Replace the contents with the entries parsed from `text`.
    pub fn replace_from_text(&mut self, text: &str) {
        self.items = parse_entries(text);
    }

    /// Replace the contents with the shipped defaults and persist them with
    /// the changed flag cleared.
    ///
    /// Returns the previous contents for [`undo_reset`](Self::undo_reset).
    pub async fn reset_to_defaults<S>(
        &mut self,
        store: &S,
        default_text: &str,
    ) -> Result<ResetUndo<Entry>, StorageError>
    where
        S: KeyValueStore + ?Sized,
    {
        let previous = self.items.clone();
        let defaults = parse_entries(default_text);

        let mut record = StoreRecord::new();
        record.insert(self.key.clone(), serde_json::to_value(&defaults)?);
        record.insert(self.changed_key.clone(), Value::Bool(false));
        store.set(record).await?;

        self.items = defaults;
        self.mark_unchanged();
        self.persisted_changed = false;
        debug!("reset '{}' to {} default entries", self.key, self.items.len());

        Ok(ResetUndo { previous })
    }
}

impl<'a, T> IntoIterator for &'a ChangeTracked<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
