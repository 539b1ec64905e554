//! The child's current knowledge and personality, shared by every writer.
//!
//! Chat turns and learning cycles fold their updates through
//! [`LiveMind::transact`]; each update reads the state left by the previous
//! one and persists before the lock is released, so neither the in-memory
//! value nor the stored snapshot ever goes backwards.

use super::personality::PersonalityState;
use super::state::KnowledgeState;
use super::store::SnapshotStore;
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct Mind {
    pub knowledge: KnowledgeState,
    pub personality: PersonalityState,
}

#[derive(Clone)]
pub struct LiveMind {
    state: Arc<Mutex<Mind>>,
    store: SnapshotStore,
}

impl LiveMind {
    /// Restores both snapshots from `store` (a fresh baseline when absent).
    pub fn load(store: SnapshotStore) -> Self {
        let knowledge = store.load_knowledge();
        let personality = store.load_personality();
        Self::new(store, knowledge, personality)
    }

    pub fn new(store: SnapshotStore, knowledge: KnowledgeState, personality: PersonalityState) -> Self {
        Self {
            state: Arc::new(Mutex::new(Mind { knowledge, personality })),
            store,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Runs `f` with exclusive access to the mind. Writers persist inside `f`.
    pub fn transact<R>(&self, f: impl FnOnce(&mut Mind) -> R) -> R {
        let mut mind = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut mind)
    }

    pub fn snapshot(&self) -> Mind {
        self.transact(|m| m.clone())
    }

    pub fn knowledge(&self) -> KnowledgeState {
        self.transact(|m| m.knowledge.clone())
    }

    pub fn personality(&self) -> PersonalityState {
        self.transact(|m| m.personality)
    }

    /// Forgets both snapshots and starts a new life.
    pub fn restart(&self) -> Mind {
        self.transact(|m| {
            self.store.restart();
            *m = Mind {
                knowledge: KnowledgeState::seeded(),
                personality: PersonalityState::default(),
            };
            m.clone()
        })
    }
}

impl fmt::Debug for LiveMind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mind = self.snapshot();
        f.debug_struct("LiveMind")
            .field("knowledge_points", &mind.knowledge.knowledge_points)
            .field("personality", &mind.personality)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::state::BASELINE_KNOWLEDGE;

    #[test]
    fn load_restores_stored_snapshots() {
        let store = SnapshotStore::in_memory();
        let mut knowledge = KnowledgeState::seeded();
        knowledge.total_messages = 9;
        store.save_knowledge(&knowledge);
        store.save_personality(&PersonalityState { empathy: 2, curiosity: 1, trust: 0 });

        let mind = LiveMind::load(store);
        assert_eq!(mind.knowledge().total_messages, 9);
        assert_eq!(mind.personality().empathy, 2);
    }

    #[test]
    fn restart_clears_store_and_memory() {
        let store = SnapshotStore::in_memory();
        let mind = LiveMind::new(store.clone(), KnowledgeState::seeded(), PersonalityState::default());
        mind.transact(|m| {
            m.personality.trust = 5;
            m.knowledge.total_messages = 3;
            store.save_personality(&m.personality);
            store.save_knowledge(&m.knowledge);
        });

        let fresh = mind.restart();
        assert_eq!(fresh.personality, PersonalityState::default());
        assert_eq!(fresh.knowledge.total_messages, 0);
        assert_eq!(fresh.knowledge.knowledge_points, BASELINE_KNOWLEDGE);
        assert_eq!(store.load_personality(), PersonalityState::default());
        assert_eq!(store.load_knowledge().total_messages, 0);
    }
}
