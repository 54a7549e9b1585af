// Leafeon configuration
// Resolution order for each setting:
// 1) Environment variable override (LEAFEON_DATA_DIR, etc.)
// 2) Platform default (~/.leafeon)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::*;
use crate::error::{LeafeonError, Result};
use crate::identify::PlantNetClient;
use crate::ids::UuidGenerator;
use crate::kv::SqliteKvStore;
use crate::plants::PlantRecordStore;

#[derive(Debug, Clone, PartialEq)]
pub struct LeafeonConfig {
    pub data_dir: PathBuf,
    pub plantnet_api_key: Option<String>,
    pub plantnet_lang: String,
    pub busy_timeout: Duration,
}

impl LeafeonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_dir = match non_empty(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let busy_timeout_ms = match non_empty(ENV_DB_BUSY_TIMEOUT_MS) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                LeafeonError::Config(format!("{} must be a whole number of milliseconds, got '{}'", ENV_DB_BUSY_TIMEOUT_MS, raw))
            })?,
            None => DEFAULT_BUSY_TIMEOUT_MS,
        };

        Ok(Self {
            data_dir,
            plantnet_api_key: non_empty(ENV_PLANTNET_API_KEY),
            plantnet_lang: non_empty(ENV_PLANTNET_LANG).unwrap_or_else(|| PLANTNET_DEFAULT_LANG.to_string()),
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        })
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILENAME)
    }

    pub fn photos_dir(&self) -> PathBuf {
        self.data_dir.join(PHOTOS_FOLDER)
    }

    /// Plant store backed by the SQLite kv database in `data_dir`.
    pub fn open_store(&self) -> Result<PlantRecordStore> {
        let kv = SqliteKvStore::open_with_timeout(&self.db_path(), self.busy_timeout)?;
        Ok(PlantRecordStore::new(Arc::new(kv), Arc::new(UuidGenerator)))
    }

    pub fn plantnet_client(&self) -> Result<PlantNetClient> {
        let api_key = self.plantnet_api_key.as_deref().ok_or_else(|| {
            LeafeonError::Config(format!("Set {} to identify plants", ENV_PLANTNET_API_KEY))
        })?;
        Ok(PlantNetClient::new(api_key)?.with_lang(self.plantnet_lang.clone()))
    }
}

/// ~/.leafeon
fn default_data_dir() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| LeafeonError::Config("Could not determine home directory".to_string()))?;
    Ok(home.home_dir().join(APP_DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = LeafeonConfig::from_lookup(lookup_from(&[
            (ENV_DATA_DIR, "/tmp/leafeon-test"),
            (ENV_PLANTNET_API_KEY, "abc123"),
            (ENV_PLANTNET_LANG, "pt"),
            (ENV_DB_BUSY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/leafeon-test"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/leafeon-test").join(DB_FILENAME));
        assert_eq!(config.photos_dir(), PathBuf::from("/tmp/leafeon-test").join(PHOTOS_FOLDER));
        assert_eq!(config.plantnet_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.plantnet_lang, "pt");
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_defaults() {
        let config = LeafeonConfig::from_lookup(lookup_from(&[
            (ENV_DATA_DIR, "/tmp/leafeon-test"),
            (ENV_PLANTNET_API_KEY, "   "),
        ]))
        .unwrap();

        assert_eq!(config.plantnet_api_key, None);
        assert_eq!(config.plantnet_lang, PLANTNET_DEFAULT_LANG);
        assert_eq!(config.busy_timeout, Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS));
        assert!(matches!(config.plantnet_client(), Err(LeafeonError::Config(_))));
    }

    #[test]
    fn test_bad_timeout_is_config_error() {
        let err = LeafeonConfig::from_lookup(lookup_from(&[
            (ENV_DATA_DIR, "/tmp/leafeon-test"),
            (ENV_DB_BUSY_TIMEOUT_MS, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, LeafeonError::Config(_)));
    }

    #[test]
    fn test_open_store_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_string_lossy().to_string();
        let config = LeafeonConfig::from_lookup(lookup_from(&[(ENV_DATA_DIR, data_dir.as_str())])).unwrap();

        let store = config.open_store().unwrap();
        store.add("a.jpg", "Rosa", "red", None).unwrap();

        let reopened = config.open_store().unwrap();
        assert_eq!(reopened.load().unwrap().plants.len(), 1);
        assert!(config.db_path().exists());
    }
}
