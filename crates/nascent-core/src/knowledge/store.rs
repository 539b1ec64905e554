//! Snapshot persistence: a small key-value seam plus the knowledge/personality
//! snapshot store built on it.
//!
//! Writes are best-effort. A failed read yields a fresh baseline, a failed
//! write is logged and the in-memory value carries on.

use super::personality::PersonalityState;
use super::state::KnowledgeState;
use crate::shared::{KNOWLEDGE_KEY, PERSONALITY_KEY};
use dashmap::DashMap;
use sled::Db;
use std::path::Path;
use std::sync::Arc;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_PATH: &str = "./data/nascent_snapshots";
const TREE_NAME: &str = "snapshots";

/// Synchronous string key-value storage (the substrate of [`SnapshotStore`]).
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Sled-backed key-value slot; every write is flushed before returning.
pub struct SledKeyValue {
    db: Db,
    tree: sled::Tree,
}

impl SledKeyValue {
    /// Opens or creates the snapshot DB at `./data/nascent_snapshots`.
    pub fn new() -> Result<Self, sled::Error> {
        Self::open_path(DEFAULT_PATH)
    }

    /// Opens or creates the snapshot DB at the given path.
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        let tree = db.open_tree(TREE_NAME)?;
        Ok(Self { db, tree })
    }
}

impl KeyValueStore for SledKeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.tree.get(key.as_bytes())? {
            Some(iv) => Ok(Some(String::from_utf8(iv.to_vec())?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.tree.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

/// Process-local key-value slot (tests, ephemeral runs).
#[derive(Default)]
pub struct MemoryKeyValue {
    entries: DashMap<String, String>,
}

impl MemoryKeyValue {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValue {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Loads and saves the knowledge and personality snapshots.
#[derive(Clone)]
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Snapshot store over a fresh in-memory slot.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyValue::new()))
    }

    /// Returns the stored knowledge, or a freshly seeded baseline when nothing
    /// usable is stored.
    pub fn load_knowledge(&self) -> KnowledgeState {
        let raw = match self.kv.get(KNOWLEDGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return KnowledgeState::seeded(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read knowledge snapshot");
                return KnowledgeState::seeded();
            }
        };
        match serde_json::from_str::<KnowledgeState>(&raw) {
            Ok(mut state) => {
                let problems = state.validate();
                if !problems.is_empty() {
                    if cfg!(debug_assertions) {
                        tracing::error!(?problems, "Knowledge snapshot violates invariants; defaulting");
                    } else {
                        tracing::warn!(?problems, "Knowledge snapshot violates invariants; defaulting");
                    }
                }
                state.normalize();
                tracing::debug!(
                    knowledge = state.knowledge_points,
                    messages = state.total_messages,
                    "Loaded knowledge snapshot"
                );
                state
            }
            Err(e) => {
                tracing::error!(error = %e, "Knowledge snapshot unparseable; seeding new baseline");
                KnowledgeState::seeded()
            }
        }
    }

    pub fn save_knowledge(&self, state: &KnowledgeState) {
        let result = serde_json::to_string(state)
            .map_err(StoreError::from)
            .and_then(|json| self.kv.set(KNOWLEDGE_KEY, &json));
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to save knowledge snapshot");
        }
    }

    pub fn clear_knowledge(&self) {
        if let Err(e) = self.kv.remove(KNOWLEDGE_KEY) {
            tracing::error!(error = %e, "Failed to clear knowledge snapshot");
        }
    }

    /// Returns the stored personality, or all-zero traits.
    pub fn load_personality(&self) -> PersonalityState {
        match self.kv.get(PERSONALITY_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::error!(error = %e, "Personality snapshot unparseable; starting fresh");
                PersonalityState::default()
            }),
            Ok(None) => PersonalityState::default(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to read personality snapshot");
                PersonalityState::default()
            }
        }
    }

    pub fn save_personality(&self, state: &PersonalityState) {
        let result = serde_json::to_string(state)
            .map_err(StoreError::from)
            .and_then(|json| self.kv.set(PERSONALITY_KEY, &json));
        if let Err(e) = result {
            tracing::error!(error = %e, "Failed to save personality snapshot");
        }
    }

    pub fn clear_personality(&self) {
        if let Err(e) = self.kv.remove(PERSONALITY_KEY) {
            tracing::error!(error = %e, "Failed to clear personality snapshot");
        }
    }

    /// Explicit restart: forgets both snapshots.
    pub fn restart(&self) {
        self.clear_personality();
        self.clear_knowledge();
        tracing::info!("Memory and knowledge cleared for new journey");
    }
}
