//! Autonomous learning: the child explores topics on a timer, optionally
//! asking several hosted models for their perspective.

mod scheduler;
mod topics;

pub use scheduler::{
    CycleStatus, InsightSource, LearningEvent, LearningStats, ProgressFn, SchedulerHandle,
    SchedulerOptions, StateSink, LEARNING_CONTEXT, RECENT_TOPIC_WINDOW,
};
pub use topics::LearningDomain;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One model's answer to a learning question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perspective {
    /// Provider model id, e.g. `google/gemma-7b-it:free`.
    pub model: String,
    pub model_name: String,
    pub insight: String,
}

/// Combined answers of every model that responded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiModelLearning {
    pub topic: String,
    pub perspectives: Vec<Perspective>,
    pub knowledge_gained: u64,
    pub timestamp: DateTime<Utc>,
}

/// Source of multi-model insights for a learning cycle.
///
/// `None` covers every failure (not configured, transport error, no model
/// answered); the scheduler then falls back to its canned insights.
#[async_trait::async_trait]
pub trait MultiModelLearn: Send + Sync {
    async fn learn(&self, topic: &str, context: &str) -> Option<MultiModelLearning>;
}
