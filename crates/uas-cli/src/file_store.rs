use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use tokio::fs;

use uas_core::{KeyValueStore, StorageError, StoreRecord};

/// Key-value store kept as one JSON object in a file.
///
/// A missing file reads as an empty store. Writes go to a sibling temp file
/// first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything in the file.
    pub async fn read_all(&self) -> Result<StoreRecord, StorageError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(StoreRecord::new());
            }
            Err(e) => return Err(e.into()),
        };

        if text.trim().is_empty() {
            return Ok(StoreRecord::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(record)) => Ok(record),
            Ok(_) => Err(StorageError::Backend(format!(
                "'{}' does not contain a JSON object",
                self.path.display()
            ))),
            Err(source) => Err(StorageError::Decode {
                key: self.path.display().to_string(),
                source,
            }),
        }
    }

    async fn write_all(&self, record: &StoreRecord) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(record)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreRecord, StorageError> {
        let mut all = self.read_all().await?;
        Ok(keys
            .iter()
            .filter_map(|&key| all.remove(key).map(|v| (key.to_string(), v)))
            .collect())
    }

    async fn set(&self, record: StoreRecord) -> Result<(), StorageError> {
        let mut all = self.read_all().await?;
        all.extend(record);
        self.write_all(&all).await
    }
}
