//! nascent-core: the AI child's mind (knowledge scoring, personality,
//! autonomous learning, conversation, snapshots and DNA records).
//!
//! The gateway and daemon add-ons depend only on this public surface.

mod conversation;
mod dna;
mod knowledge;
mod learning;
mod shared;

// Shared
pub use shared::{CoreConfig, LearningSpeed, KNOWLEDGE_KEY, PERSONALITY_KEY};

// Knowledge
pub use knowledge::{
    achievements, format_large_number, score, Achievement, Analysis, AutonomousStats, Category,
    CategoryProgress, Depth, DepthHistogram, KeyValueStore, KnowledgeState, KnowledgeSummary,
    LiveMind, MemoryKeyValue, Mind, PersonalityState, PersonalityTracker, QuestionStats, ScoringEngine,
    SledKeyValue, SnapshotStore, StoreError, TimelineEvent, Trait, BASELINE_KNOWLEDGE,
    BASELINE_WISDOM, FOUNDATION_MODELS, PRE_TRAINED_TOKENS, TIMELINE_CAPACITY, TIMELINE_THRESHOLD,
    TRAIT_EXPRESSION_THRESHOLD,
};

// Autonomous learning
pub use learning::{
    CycleStatus, InsightSource, LearningDomain, LearningEvent, LearningStats, MultiModelLearn,
    MultiModelLearning, Perspective, ProgressFn, SchedulerHandle, SchedulerOptions, StateSink,
    LEARNING_CONTEXT, RECENT_TOPIC_WINDOW,
};

// Conversation
pub use conversation::{
    bonding_prompt, bonding_reply, companion_greeting, companion_prompt, companion_reply,
    ChatCompletion, ChatReply, ChatTurn, Conversation, ConversationMode, ReplySource, Role,
    BONDING_GREETING, HISTORY_LIMIT,
};

// DNA repository
pub use dna::{
    CollectiveStats, DnaChange, DnaDraft, DnaRecord, DnaRepository, RecordError, DNA_VERSION,
    LIST_CAP, MAX_AVATAR_BYTES,
};
