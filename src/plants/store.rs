// Plant record store
// Owns the ordered plant collection and persists it as one JSON blob under a
// single key. Mutations hold the cache lock across the whole read-modify-write,
// so operations on one store never interleave.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::model::{decode_plants, or_placeholder, DecodedCollection, PlantMetadata, PlantRecord};
use crate::constants::{ID_MAX_ATTEMPTS, PLACEHOLDER_DESCRIPTION, PLACEHOLDER_NAME, PLANTS_KEY};
use crate::error::{LeafeonError, Result};
use crate::ids::IdGenerator;
use crate::kv::KeyValueStore;

/// Non-fatal conditions found while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// The stored blob was not a JSON array; the collection was treated as empty.
    MalformedData { detail: String },
    /// One array element could not be read and was left out.
    SkippedRecord { index: usize, detail: String },
    /// Records without a usable id were given new ones.
    IdsBackfilled { count: usize },
    /// New ids were assigned but writing them back failed. They hold for this session only.
    BackfillNotPersisted { detail: String },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedData { detail } => {
                write!(f, "Stored plants could not be read ({}); starting empty", detail)
            }
            LoadWarning::SkippedRecord { index, detail } => {
                write!(f, "Skipped unreadable plant at position {}: {}", index, detail)
            }
            LoadWarning::IdsBackfilled { count } => {
                write!(f, "Assigned new ids to {} plant(s)", count)
            }
            LoadWarning::BackfillNotPersisted { detail } => {
                write!(f, "New plant ids could not be saved: {}", detail)
            }
        }
    }
}

/// Result of `PlantRecordStore::load`.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub plants: Vec<PlantRecord>,
    pub warnings: Vec<LoadWarning>,
}

type Cache = Option<Vec<PlantRecord>>;

pub struct PlantRecordStore {
    key: String,
    kv: Arc<dyn KeyValueStore>,
    ids: Arc<dyn IdGenerator>,
    cache: Mutex<Cache>,
}

impl fmt::Debug for PlantRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loaded = self.cache.try_lock().map(|c| c.is_some()).unwrap_or(false);
        write!(f, "PlantRecordStore {{ key: {}, loaded: {} }}", self.key, loaded)
    }
}

impl PlantRecordStore {
    /// Store persisting under the well-known `plants` key.
    pub fn new(kv: Arc<dyn KeyValueStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self::with_key(PLANTS_KEY, kv, ids)
    }

    pub fn with_key(key: impl Into<String>, kv: Arc<dyn KeyValueStore>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            key: key.into(),
            kv,
            ids,
            cache: Mutex::new(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted collection, replacing the in-memory cache.
    ///
    /// Missing data loads as empty. Malformed data loads as empty with a
    /// `MalformedData` warning. Records without a usable id get a fresh one,
    /// and the backfilled collection is written back before returning unless
    /// some element was unreadable.
    pub fn load(&self) -> Result<LoadReport> {
        let mut cache = self.lock()?;
        self.load_locked(&mut cache)
    }

    /// Append a new record and persist. Blank name/description fall back to placeholders.
    pub fn add(
        &self,
        uri: &str,
        name: &str,
        description: &str,
        metadata: Option<PlantMetadata>,
    ) -> Result<PlantRecord> {
        if uri.trim().is_empty() {
            return Err(LeafeonError::Validation("A photo URI is required".to_string()));
        }

        let mut cache = self.lock()?;
        let plants = self.loaded(&mut cache)?;

        let id = self.fresh_id(|candidate| plants.iter().any(|p| p.id == candidate))?;
        let record = PlantRecord {
            id,
            uri: uri.to_string(),
            name: or_placeholder(name, PLACEHOLDER_NAME),
            description: or_placeholder(description, PLACEHOLDER_DESCRIPTION),
            metadata: metadata.unwrap_or_default(),
        };

        let mut updated = plants.clone();
        updated.push(record.clone());
        self.persist(&updated)?;
        *plants = updated;

        log::info!("Added plant {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Replace a record's name and description. Both must be non-blank.
    pub fn update(&self, id: &str, name: &str, description: &str) -> Result<PlantRecord> {
        if name.trim().is_empty() || description.trim().is_empty() {
            return Err(LeafeonError::Validation(
                "Name and description are both required".to_string(),
            ));
        }

        let mut cache = self.lock()?;
        let plants = self.loaded(&mut cache)?;

        let index = plants
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| LeafeonError::PlantNotFound(id.to_string()))?;

        let mut updated = plants.clone();
        updated[index].name = name.to_string();
        updated[index].description = description.to_string();
        self.persist(&updated)?;

        let record = updated[index].clone();
        *plants = updated;

        log::info!("Updated plant {}", id);
        Ok(record)
    }

    /// Remove a record and persist. Returns false, without writing, if `id` is unknown.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let mut cache = self.lock()?;
        let plants = self.loaded(&mut cache)?;

        if !plants.iter().any(|p| p.id == id) {
            log::debug!("Delete of unknown plant {} ignored", id);
            return Ok(false);
        }

        let updated: Vec<PlantRecord> = plants.iter().filter(|p| p.id != id).cloned().collect();
        self.persist(&updated)?;
        *plants = updated;

        log::info!("Deleted plant {}", id);
        Ok(true)
    }

    /// Records whose name or description contains `query`, ignoring case, in
    /// insertion order. Filters the last loaded collection; never reads persistence.
    pub fn search(&self, query: &str) -> Vec<PlantRecord> {
        let needle = query.to_lowercase();
        self.read_cache()
            .as_ref()
            .map(|plants| plants.iter().filter(|p| p.matches(&needle)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &str) -> Option<PlantRecord> {
        self.read_cache()
            .as_ref()
            .and_then(|plants| plants.iter().find(|p| p.id == id).cloned())
    }

    /// Snapshot of the cached collection (empty if never loaded).
    pub fn plants(&self) -> Vec<PlantRecord> {
        self.read_cache().clone().unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.read_cache().is_some()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Cache>> {
        self.cache
            .lock()
            .map_err(|_| LeafeonError::Persistence("Plant store lock poisoned".to_string()))
    }

    // The cache only changes after a successful write, so a poisoned guard
    // still holds a consistent collection.
    fn read_cache(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached collection, loading it first if needed.
    fn loaded<'a>(&self, cache: &'a mut Cache) -> Result<&'a mut Vec<PlantRecord>> {
        if cache.is_none() {
            self.load_locked(cache)?;
        }
        Ok(cache.get_or_insert_with(Vec::new))
    }

    fn load_locked(&self, cache: &mut Cache) -> Result<LoadReport> {
        let raw = self.kv.get(&self.key).map_err(|e| {
            log::error!("Failed to read plants from '{}': {}", self.key, e);
            e
        })?;

        let mut warnings = Vec::new();
        let decoded = match raw {
            None => DecodedCollection::default(),
            Some(json) => match decode_plants(&json) {
                Ok(decoded) => decoded,
                Err(e) => {
                    log::warn!("Stored plants under '{}' are malformed: {}", self.key, e);
                    warnings.push(LoadWarning::MalformedData { detail: e.to_string() });
                    DecodedCollection::default()
                }
            },
        };

        let skipped = decoded.skipped.len();
        for (index, detail) in decoded.skipped {
            log::warn!("Skipping unreadable plant at position {}: {}", index, detail);
            warnings.push(LoadWarning::SkippedRecord { index, detail });
        }

        // Ids already claimed by some record, so a backfilled id never shadows a later one
        let claimed: HashSet<String> = decoded.plants.iter().filter_map(|p| p.id.clone()).collect();
        let mut seen: HashSet<String> = HashSet::with_capacity(decoded.plants.len());
        let mut plants = Vec::with_capacity(decoded.plants.len());
        let mut backfilled = 0;

        for plant in decoded.plants {
            let id = match plant.id.clone() {
                Some(id) if !seen.contains(&id) => id,
                _ => {
                    backfilled += 1;
                    self.fresh_id(|candidate| claimed.contains(candidate) || seen.contains(candidate))?
                }
            };
            seen.insert(id.clone());
            plants.push(plant.into_record(id));
        }

        if backfilled > 0 {
            log::info!("Backfilled ids for {} plant(s) under '{}'", backfilled, self.key);
            warnings.push(LoadWarning::IdsBackfilled { count: backfilled });

            // Writing back now would drop the unreadable elements from storage
            if skipped > 0 {
                warnings.push(LoadWarning::BackfillNotPersisted {
                    detail: format!("{} unreadable plant(s) left in storage untouched", skipped),
                });
            } else if let Err(e) = self.persist(&plants) {
                warnings.push(LoadWarning::BackfillNotPersisted { detail: e.to_string() });
            }
        }

        *cache = Some(plants.clone());
        Ok(LoadReport { plants, warnings })
    }

    /// Ask the generator for an id not rejected by `taken`.
    fn fresh_id(&self, taken: impl Fn(&str) -> bool) -> Result<String> {
        for _ in 0..ID_MAX_ATTEMPTS {
            let candidate = self.ids.next_id();
            if !candidate.trim().is_empty() && !taken(&candidate) {
                return Ok(candidate);
            }
            log::warn!("Id generator returned a used id {:?}, retrying", candidate);
        }

        Err(LeafeonError::Other(format!(
            "Could not generate a unique plant id after {} attempts",
            ID_MAX_ATTEMPTS
        )))
    }

    fn persist(&self, plants: &[PlantRecord]) -> Result<()> {
        let json = serde_json::to_string(plants)?;
        self.kv.set(&self.key, &json).map_err(|e| {
            log::error!("Failed to persist {} plant(s) under '{}': {}", plants.len(), self.key, e);
            e
        })
    }
}
