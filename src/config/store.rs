//! Persisted key-value settings store.
//!
//! Holds the upstream base URL and API key in a small JSON file so they survive
//! restarts. This is the highest-precedence settings tier.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use super::SettingsLayer;
use crate::errors::AppError;

/// Store key for the upstream base URL.
pub const KEY_API_BASE_URL: &str = "api_base_url";
/// Store key for the upstream API key.
pub const KEY_API_KEY: &str = "api_key";

/// JSON-file backed settings store.
pub struct SettingsStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl SettingsStore {
    /// Open the store, reading the file if it exists.
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        let values = match tokio::fs::read(path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                AppError::Settings(format!(
                    "Settings file {} is not valid JSON: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: path.to_path_buf(),
            values: RwLock::new(values),
        })
    }

    /// Current store contents as a settings tier.
    pub async fn layer(&self) -> SettingsLayer {
        let values = self.values.read().await;
        SettingsLayer {
            api_base_url: values
                .get(KEY_API_BASE_URL)
                .filter(|v| !v.is_empty())
                .cloned(),
            api_key: values.get(KEY_API_KEY).filter(|v| !v.is_empty()).cloned(),
        }
    }

    /// Set one or more keys with a single write.
    ///
    /// The in-memory values only change once the file has been written, so a
    /// failed write leaves both exactly as they were.
    pub async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AppError> {
        if let Some((key, _)) = entries
            .iter()
            .find(|(key, _)| *key != KEY_API_BASE_URL && *key != KEY_API_KEY)
        {
            return Err(AppError::Validation(format!(
                "Unknown configuration key: {}",
                key
            )));
        }

        let mut values = self.values.write().await;
        let mut updated = values.clone();
        for (key, value) in entries {
            updated.insert(key.to_string(), value.trim().to_string());
        }
        self.persist(&updated).await?;
        *values = updated;

        let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
        tracing::info!("Settings store updated: {}", keys.join(", "));
        Ok(())
    }

    /// Remove every stored value and persist.
    pub async fn clear(&self) -> Result<(), AppError> {
        let mut values = self.values.write().await;
        self.persist(&BTreeMap::new()).await?;
        values.clear();
        tracing::info!("Settings store cleared");
        Ok(())
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(values)
            .map_err(|e| AppError::Internal(format!("Failed to encode settings: {}", e)))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.json"))
            .await
            .unwrap();
        assert_eq!(store.layer().await, SettingsLayer::default());
    }

    #[tokio::test]
    async fn test_set_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = SettingsStore::open(&path).await.unwrap();
        store
            .set_many(&[(KEY_API_BASE_URL, "http://proxy:4000")])
            .await
            .unwrap();
        store.set_many(&[(KEY_API_KEY, "sk-1234")]).await.unwrap();

        let reopened = SettingsStore::open(&path).await.unwrap();
        let layer = reopened.layer().await;
        assert_eq!(layer.api_base_url.as_deref(), Some("http://proxy:4000"));
        assert_eq!(layer.api_key.as_deref(), Some("sk-1234"));
    }

    #[tokio::test]
    async fn test_unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.json"))
            .await
            .unwrap();
        let result = store.set_many(&[("theme", "dark")]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_clear() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path).await.unwrap();
        store.set_many(&[(KEY_API_KEY, "sk-1234")]).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.layer().await.api_key.is_none());
        let reopened = SettingsStore::open(&path).await.unwrap();
        assert!(reopened.layer().await.api_key.is_none());
    }

    #[tokio::test]
    async fn test_set_many_writes_both_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path).await.unwrap();
        store
            .set_many(&[(KEY_API_BASE_URL, "http://proxy:4000"), (KEY_API_KEY, "sk-1")])
            .await
            .unwrap();

        let layer = SettingsStore::open(&path).await.unwrap().layer().await;
        assert_eq!(layer.api_base_url.as_deref(), Some("http://proxy:4000"));
        assert_eq!(layer.api_key.as_deref(), Some("sk-1"));
    }

    #[tokio::test]
    async fn test_set_many_rejects_unknown_key_before_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::open(&path).await.unwrap();

        let result = store
            .set_many(&[(KEY_API_KEY, "sk-1"), ("theme", "dark")])
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.layer().await.api_key.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_values() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("settings");
        let store = SettingsStore::open(&parent.join("settings.json"))
            .await
            .unwrap();
        store.set_many(&[(KEY_API_KEY, "sk-saved")]).await.unwrap();

        // Replace the parent directory with a file so every write fails.
        tokio::fs::remove_dir_all(&parent).await.unwrap();
        tokio::fs::write(&parent, b"").await.unwrap();

        let result = store
            .set_many(&[(KEY_API_BASE_URL, "http://other:4000"), (KEY_API_KEY, "sk-unsaved")])
            .await;
        assert!(matches!(result, Err(AppError::Settings(_))));
        let layer = store.layer().await;
        assert_eq!(layer.api_key.as_deref(), Some("sk-saved"));
        assert!(layer.api_base_url.is_none());

        assert!(store.clear().await.is_err());
        assert_eq!(store.layer().await.api_key.as_deref(), Some("sk-saved"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, b"not json").await.unwrap();
        assert!(matches!(
            SettingsStore::open(&path).await,
            Err(AppError::Settings(_))
        ));
    }
}
