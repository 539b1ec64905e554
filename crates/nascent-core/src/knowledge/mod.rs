//! Knowledge accumulation: categories, scoring, personality and snapshots.
//!
//! ## Layout
//!
//! | Module      | Role                                                     |
//! |-------------|----------------------------------------------------------|
//! | category    | Nine fixed categories with keyword lists and weights     |
//! | state       | `KnowledgeState`, the persisted learning-progress record |
//! | scoring     | `ScoringEngine`: one message in, next state out          |
//! | personality | Empathy / curiosity / trust traits                       |
//! | summary     | User-facing summary and achievements                     |
//! | store       | Key-value seam and the snapshot store over it            |
//! | live        | `LiveMind`, the shared current state and its writer lock |

mod category;
mod live;
mod personality;
mod scoring;
mod state;
mod store;
mod summary;

pub use category::Category;
pub use live::{LiveMind, Mind};
pub use personality::{PersonalityState, PersonalityTracker, Trait, TRAIT_EXPRESSION_THRESHOLD};
pub use scoring::{score, Analysis, Depth, ScoringEngine, TIMELINE_THRESHOLD};
pub use state::{
    AutonomousStats, CategoryProgress, DepthHistogram, KnowledgeState, QuestionStats,
    TimelineEvent, BASELINE_KNOWLEDGE, BASELINE_WISDOM, FOUNDATION_MODELS, PRE_TRAINED_TOKENS,
    TIMELINE_CAPACITY,
};
pub use store::{KeyValueStore, MemoryKeyValue, SledKeyValue, SnapshotStore, StoreError};
pub use summary::{achievements, format_large_number, Achievement, KnowledgeSummary};
