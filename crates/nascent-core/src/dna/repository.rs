//! Sled-backed DNA repository: one tree of records, one of avatar blobs.

use super::record::{DnaDraft, DnaRecord};
use chrono::Utc;
use serde::Serialize;
use sled::Db;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::broadcast;
use uuid::Uuid;

const DEFAULT_PATH: &str = "./data/nascent_dna";
const RECORDS_TREE: &str = "dna_records";
const AVATARS_TREE: &str = "dna_avatars";
/// Upper bound of [`DnaRepository::list`].
pub const LIST_CAP: usize = 100;
/// Largest accepted avatar image.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;
const AVATAR_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("record {0} not found")]
    NotFound(Uuid),
    #[error("invalid avatar: {0}")]
    InvalidAvatar(String),
}

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "record", rename_all = "lowercase")]
pub enum DnaChange {
    Inserted(DnaRecord),
    Updated(DnaRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectiveStats {
    #[serde(rename = "totalAIChildren")]
    pub total_children: u64,
    pub total_knowledge: u64,
    pub total_wisdom: u64,
    pub total_topics: u64,
    pub total_concepts: u64,
    pub total_autonomous_sessions: u64,
    pub total_traits: u64,
    pub average_knowledge: u64,
    pub average_wisdom: u64,
    pub average_traits: u64,
    /// Most common dominant interest; alphabetical order breaks ties.
    pub dominant_interest: String,
    pub interest_counts: BTreeMap<String, u64>,
}

pub struct DnaRepository {
    db: Db,
    records: sled::Tree,
    avatars: sled::Tree,
    changes: broadcast::Sender<DnaChange>,
}

fn rounded_avg(total: u64, n: u64) -> u64 {
    if n == 0 {
        0
    } else {
        (total as f64 / n as f64).round() as u64
    }
}

impl DnaRepository {
    /// Opens or creates the repository at `./data/nascent_dna`.
    pub fn new() -> Result<Self, sled::Error> {
        Self::open_path(DEFAULT_PATH)
    }

    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, sled::Error> {
        let db = sled::open(path)?;
        let records = db.open_tree(RECORDS_TREE)?;
        let avatars = db.open_tree(AVATARS_TREE)?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { db, records, avatars, changes })
    }

    fn notify(&self, change: DnaChange) {
        // no subscribers is fine
        let _ = self.changes.send(change);
    }

    fn write(&self, record: &DnaRecord) -> Result<(), RecordError> {
        self.records.insert(record.id.as_bytes(), record.to_bytes()?)?;
        self.db.flush()?;
        Ok(())
    }

    pub fn create(&self, draft: DnaDraft) -> Result<DnaRecord, RecordError> {
        let record = draft.into_record(Utc::now());
        self.write(&record)?;
        tracing::info!(
            id = %record.id,
            generation = %record.generation_id,
            knowledge = record.knowledge_points,
            "DNA saved to repository"
        );
        self.notify(DnaChange::Inserted(record.clone()));
        Ok(record)
    }

    fn all(&self) -> Result<Vec<DnaRecord>, RecordError> {
        let mut out = Vec::new();
        for item in self.records.iter() {
            let (_, value) = item?;
            out.push(DnaRecord::from_bytes(&value)?);
        }
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    /// Newest first, at most [`LIST_CAP`] records.
    pub fn list(&self, limit: usize) -> Result<Vec<DnaRecord>, RecordError> {
        let mut all = self.all()?;
        all.truncate(limit.min(LIST_CAP));
        Ok(all)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<DnaRecord>, RecordError> {
        self.list(limit)
    }

    pub fn get(&self, id: Uuid) -> Result<DnaRecord, RecordError> {
        match self.records.get(id.as_bytes())? {
            Some(bytes) => Ok(DnaRecord::from_bytes(&bytes)?),
            None => Err(RecordError::NotFound(id)),
        }
    }

    pub fn update_avatar(
        &self,
        id: Uuid,
        avatar_url: Option<String>,
        generated_prompt: Option<String>,
        prompt_metadata: Option<serde_json::Value>,
    ) -> Result<DnaRecord, RecordError> {
        let mut record = self.get(id)?;
        record.avatar_uploaded_at = avatar_url.as_ref().map(|_| Utc::now());
        record.avatar_url = avatar_url;
        record.generated_prompt = generated_prompt;
        record.prompt_metadata = prompt_metadata;
        self.write(&record)?;
        tracing::info!(id = %id, "Avatar URL saved to repository");
        self.notify(DnaChange::Updated(record.clone()));
        Ok(record)
    }

    pub fn collective_stats(&self) -> Result<CollectiveStats, RecordError> {
        let all = self.all()?;
        let mut stats = CollectiveStats {
            total_children: all.len() as u64,
            ..CollectiveStats::default()
        };
        for r in &all {
            stats.total_knowledge += r.knowledge_points;
            stats.total_wisdom += r.wisdom_score;
            stats.total_topics += r.topics_learned;
            stats.total_concepts += r.concepts_discovered;
            stats.total_autonomous_sessions += r.autonomous_sessions;
            stats.total_traits += r.total_traits;
            *stats.interest_counts.entry(r.dominant_interest.clone()).or_insert(0) += 1;
        }
        let n = stats.total_children;
        stats.average_knowledge = rounded_avg(stats.total_knowledge, n);
        stats.average_wisdom = rounded_avg(stats.total_wisdom, n);
        stats.average_traits = rounded_avg(stats.total_traits, n);

        let mut best: Option<(&String, u64)> = None;
        for (interest, count) in &stats.interest_counts {
            match best {
                Some((_, c)) if *count <= c => {}
                _ => best = Some((interest, *count)),
            }
        }
        stats.dominant_interest = best
            .map(|(i, _)| i.clone())
            .unwrap_or_else(|| "exploring".to_string());
        Ok(stats)
    }

    /// Stores an avatar image for `generation_id`, replacing any previous
    /// one, and returns its URL path.
    pub fn put_avatar(&self, generation_id: &str, bytes: &[u8], ext: &str) -> Result<String, RecordError> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        if !AVATAR_EXTENSIONS.contains(&ext.as_str()) {
            return Err(RecordError::InvalidAvatar(format!(
                "unsupported type '{}'; upload PNG, JPEG, or WebP",
                ext
            )));
        }
        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(RecordError::InvalidAvatar("file too large, maximum size is 5MB".to_string()));
        }
        if generation_id.is_empty() || generation_id.contains(['/', '.']) {
            return Err(RecordError::InvalidAvatar(format!("bad generation id '{}'", generation_id)));
        }
        let removed = self.remove_avatars(generation_id)?;
        if removed > 0 {
            tracing::debug!(generation = generation_id, removed, "Removed old avatar");
        }
        let file_name = format!("{}.{}", generation_id, ext);
        self.avatars.insert(file_name.as_bytes(), bytes)?;
        self.db.flush()?;
        tracing::info!(file = %file_name, size = bytes.len(), "Avatar uploaded");
        Ok(format!("/v1/avatars/{}", file_name))
    }

    /// Avatar bytes by file name (`{generation_id}.{ext}`).
    pub fn avatar(&self, file_name: &str) -> Result<Option<Vec<u8>>, RecordError> {
        Ok(self.avatars.get(file_name.as_bytes())?.map(|v| v.to_vec()))
    }

    /// Removes every avatar of `generation_id`; returns how many were removed.
    pub fn delete_avatar(&self, generation_id: &str) -> Result<usize, RecordError> {
        let removed = self.remove_avatars(generation_id)?;
        self.db.flush()?;
        Ok(removed)
    }

    fn remove_avatars(&self, generation_id: &str) -> Result<usize, RecordError> {
        let prefix = format!("{}.", generation_id);
        let mut removed = 0;
        for item in self.avatars.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            self.avatars.remove(key)?;
            removed += 1;
        }
        Ok(removed)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DnaChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{KnowledgeState, KnowledgeSummary, PersonalityState};

    fn open() -> (tempfile::TempDir, DnaRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = DnaRepository::open_path(dir.path()).unwrap();
        (dir, repo)
    }

    fn draft(knowledge: u64, interest: &str) -> DnaDraft {
        DnaDraft {
            empathy: 3,
            curiosity: 2,
            trust: 1,
            knowledge_points: knowledge,
            dominant_interest: Some(interest.to_string()),
            ..DnaDraft::default()
        }
    }

    #[test]
    fn create_fills_identity_and_totals() {
        let (_dir, repo) = open();
        let record = repo.create(draft(10, "science")).unwrap();
        assert_eq!(record.total_traits, 6);
        assert_eq!(record.generation_id.len(), 9);
        assert_eq!(record.version, "1.0");
        assert!(record.avatar_uploaded_at.is_none());
        assert_eq!(repo.get(record.id).unwrap(), record);
    }

    #[test]
    fn draft_from_snapshot_copies_summary() {
        let state = KnowledgeState::seeded();
        let summary = KnowledgeSummary::from(&state);
        let p = PersonalityState { empathy: 5, curiosity: 4, trust: 3 };
        let d = DnaDraft::from_snapshot(&p, &summary);
        assert_eq!(d.knowledge_points, state.knowledge_points);
        assert_eq!(d.empathy, 5);
        assert_eq!(d.dominant_interest.as_deref(), Some(summary.dominant_interest.as_str()));
    }

    #[test]
    fn list_is_newest_first_and_capped() {
        let (_dir, repo) = open();
        let first = repo.create(draft(1, "science")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = repo.create(draft(2, "science")).unwrap();
        let listed = repo.list(10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(repo.recent(1).unwrap().len(), 1);
    }

    #[test]
    fn missing_record_is_not_found() {
        let (_dir, repo) = open();
        let id = Uuid::new_v4();
        assert!(matches!(repo.get(id), Err(RecordError::NotFound(x)) if x == id));
    }

    #[test]
    fn collective_stats_aggregate_and_average() {
        let (_dir, repo) = open();
        assert_eq!(repo.collective_stats().unwrap().dominant_interest, "exploring");
        repo.create(draft(10, "science")).unwrap();
        repo.create(draft(11, "emotions")).unwrap();
        repo.create(draft(20, "emotions")).unwrap();
        let stats = repo.collective_stats().unwrap();
        assert_eq!(stats.total_children, 3);
        assert_eq!(stats.total_knowledge, 41);
        assert_eq!(stats.average_knowledge, 14);
        assert_eq!(stats.average_traits, 6);
        assert_eq!(stats.dominant_interest, "emotions");
        assert_eq!(stats.interest_counts["emotions"], 2);
    }

    #[test]
    fn avatar_upload_replaces_previous_and_validates() {
        let (_dir, repo) = open();
        let url = repo.put_avatar("abc123xyz", b"png-bytes", "png").unwrap();
        assert_eq!(url, "/v1/avatars/abc123xyz.png");
        repo.put_avatar("abc123xyz", b"webp-bytes", ".WEBP").unwrap();
        assert!(repo.avatar("abc123xyz.png").unwrap().is_none());
        assert_eq!(repo.avatar("abc123xyz.webp").unwrap().as_deref(), Some(&b"webp-bytes"[..]));

        assert!(matches!(repo.put_avatar("abc123xyz", b"x", "gif"), Err(RecordError::InvalidAvatar(_))));
        let huge = vec![0u8; MAX_AVATAR_BYTES + 1];
        assert!(matches!(repo.put_avatar("abc123xyz", &huge, "png"), Err(RecordError::InvalidAvatar(_))));

        assert_eq!(repo.delete_avatar("abc123xyz").unwrap(), 1);
        assert_eq!(repo.delete_avatar("abc123xyz").unwrap(), 0);
    }

    #[tokio::test]
    async fn subscribers_see_inserts_and_updates() {
        let (_dir, repo) = open();
        let mut rx = repo.subscribe();
        let record = repo.create(draft(1, "nature")).unwrap();
        let updated = repo
            .update_avatar(record.id, Some("/v1/avatars/x.png".into()), Some("a portrait".into()), None)
            .unwrap();
        assert!(updated.avatar_uploaded_at.is_some());

        assert_eq!(rx.recv().await.unwrap(), DnaChange::Inserted(record));
        assert_eq!(rx.recv().await.unwrap(), DnaChange::Updated(updated));
    }
}
