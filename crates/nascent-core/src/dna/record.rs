use crate::knowledge::{KnowledgeSummary, PersonalityState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DNA_VERSION: &str = "1.0";

/// A born AI child as stored in the shared repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaRecord {
    pub id: Uuid,
    pub generation_id: String,
    pub empathy: u64,
    pub curiosity: u64,
    pub trust: u64,
    pub total_traits: u64,
    pub knowledge_points: u64,
    pub wisdom_score: u64,
    pub topics_learned: u64,
    pub concepts_discovered: u64,
    pub dominant_interest: String,
    pub autonomous_sessions: u64,
    pub topics_explored_alone: u64,
    pub models_queried: u64,
    pub version: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub generated_prompt: Option<String>,
    #[serde(default)]
    pub prompt_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub avatar_uploaded_at: Option<DateTime<Utc>>,
}

impl DnaRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Fields supplied by the caller when a child is born; the repository fills
/// in identity and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnaDraft {
    /// Generated when absent.
    pub generation_id: Option<String>,
    pub empathy: u64,
    pub curiosity: u64,
    pub trust: u64,
    pub knowledge_points: u64,
    pub wisdom_score: u64,
    pub topics_learned: u64,
    pub concepts_discovered: u64,
    pub dominant_interest: Option<String>,
    pub autonomous_sessions: u64,
    pub topics_explored_alone: u64,
    pub models_queried: u64,
    pub version: Option<String>,
    pub avatar_url: Option<String>,
    pub generated_prompt: Option<String>,
    pub prompt_metadata: Option<serde_json::Value>,
}

impl DnaDraft {
    pub fn from_snapshot(personality: &PersonalityState, summary: &KnowledgeSummary) -> Self {
        let auto = &summary.autonomous_learning;
        Self {
            generation_id: None,
            empathy: personality.empathy,
            curiosity: personality.curiosity,
            trust: personality.trust,
            knowledge_points: summary.total_knowledge,
            wisdom_score: summary.wisdom_score,
            topics_learned: summary.topics_learned as u64,
            concepts_discovered: summary.concepts_discovered as u64,
            dominant_interest: Some(summary.dominant_interest.clone()),
            autonomous_sessions: auto.sessions_completed,
            topics_explored_alone: auto.topics_explored,
            models_queried: auto.models_queried,
            version: None,
            avatar_url: None,
            generated_prompt: None,
            prompt_metadata: None,
        }
    }

    pub(crate) fn into_record(self, now: DateTime<Utc>) -> DnaRecord {
        let avatar_uploaded_at = self.avatar_url.as_ref().map(|_| now);
        DnaRecord {
            id: Uuid::new_v4(),
            generation_id: self.generation_id.unwrap_or_else(new_generation_id),
            empathy: self.empathy,
            curiosity: self.curiosity,
            trust: self.trust,
            total_traits: self.empathy + self.curiosity + self.trust,
            knowledge_points: self.knowledge_points,
            wisdom_score: self.wisdom_score,
            topics_learned: self.topics_learned,
            concepts_discovered: self.concepts_discovered,
            dominant_interest: self.dominant_interest.unwrap_or_else(|| "unknown".to_string()),
            autonomous_sessions: self.autonomous_sessions,
            topics_explored_alone: self.topics_explored_alone,
            models_queried: self.models_queried,
            version: self.version.unwrap_or_else(|| DNA_VERSION.to_string()),
            created_at: now,
            avatar_url: self.avatar_url,
            generated_prompt: self.generated_prompt,
            prompt_metadata: self.prompt_metadata,
            avatar_uploaded_at,
        }
    }
}

/// Short random id used in avatar file names.
fn new_generation_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(9);
    id
}
