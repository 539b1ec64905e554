//! KnowledgeState: the persisted learning-progress document.
//!
//! Every field defaults when absent so snapshots written by older builds (or
//! hand-edited ones) still load; [`KnowledgeState::normalize`] restores the
//! structural invariants after deserialization.

use super::category::Category;
use chrono::{DateTime, Months, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Knowledge points every new life starts with (3.2B pre-training tokens, proportionally converted).
pub const BASELINE_KNOWLEDGE: u64 = 2_487_000;
/// Wisdom every new life starts with.
pub const BASELINE_WISDOM: u64 = 1_243_000;
/// Tokens absorbed by the foundation models during pre-training.
pub const PRE_TRAINED_TOKENS: u64 = 3_200_000_000;
/// Lower bound of the per-category baseline score.
pub const CATEGORY_BASELINE_MIN: u64 = 280_000;
/// Width of the per-category baseline jitter.
pub const CATEGORY_BASELINE_JITTER: u64 = 50_000;
/// Maximum number of retained timeline events.
pub const TIMELINE_CAPACITY: usize = 50;
/// Labels of the models the simulated child is built on.
pub const FOUNDATION_MODELS: [&str; 3] = ["Meta Llama 3 8B", "Google Gemma 7B", "Mistral 7B"];

/// Score and unique topics of one category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryProgress {
    pub score: u64,
    pub topics: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionStats {
    /// Questions asked by the AI child.
    pub asked: u64,
    /// Questions from the user (the child answers them).
    pub answered: u64,
}

/// Histogram of message complexity classifications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthHistogram {
    pub superficial: u64,
    pub moderate: u64,
    pub deep: u64,
}

/// A significant learning moment (awarded at least 5 points).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub timestamp: DateTime<Utc>,
    pub points: u64,
    /// Category name, or `"general"` when no category matched.
    pub category: String,
    /// First 100 characters of the message.
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutonomousStats {
    pub sessions_completed: u64,
    pub topics_explored: u64,
    pub models_queried: u64,
    pub last_activity: Option<DateTime<Utc>>,
}

/// The accumulated learning-progress document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KnowledgeState {
    pub total_messages: u64,
    pub total_words: u64,
    pub categories: BTreeMap<Category, CategoryProgress>,
    pub concepts: BTreeSet<String>,
    pub questions: QuestionStats,
    pub depth: DepthHistogram,
    pub timeline: VecDeque<TimelineEvent>,
    pub knowledge_points: u64,
    pub wisdom_score: u64,
    /// Wisdom inherited at creation; the recomputed wisdom is added on top of it.
    pub baseline_wisdom: u64,
    pub pre_trained_tokens: Option<u64>,
    pub birth_month: Option<String>,
    pub foundation_models: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    pub autonomous_learning: AutonomousStats,
}

impl Default for KnowledgeState {
    /// An empty state: zero counters, all nine categories at score 0, no provenance.
    fn default() -> Self {
        Self {
            total_messages: 0,
            total_words: 0,
            categories: Category::all()
                .into_iter()
                .map(|c| (c, CategoryProgress::default()))
                .collect(),
            concepts: BTreeSet::new(),
            questions: QuestionStats::default(),
            depth: DepthHistogram::default(),
            timeline: VecDeque::new(),
            knowledge_points: 0,
            wisdom_score: 0,
            baseline_wisdom: 0,
            pre_trained_tokens: None,
            birth_month: None,
            foundation_models: Vec::new(),
            start_date: None,
            last_update: None,
            autonomous_learning: AutonomousStats::default(),
        }
    }
}

impl KnowledgeState {
    /// Creates a new life with the pre-trained baseline (random per-category jitter).
    pub fn seeded() -> Self {
        Self::seeded_with(&mut rand::thread_rng(), Utc::now())
    }

    /// Creates a new life using the given randomness source and clock reading.
    pub fn seeded_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> Self {
        let categories = Category::all()
            .into_iter()
            .map(|c| {
                let score = CATEGORY_BASELINE_MIN + rng.gen_range(0..CATEGORY_BASELINE_JITTER);
                (c, CategoryProgress { score, topics: BTreeSet::new() })
            })
            .collect();
        let birth = now.checked_add_months(Months::new(1)).unwrap_or(now);

        tracing::info!(
            knowledge = BASELINE_KNOWLEDGE,
            tokens = PRE_TRAINED_TOKENS,
            birth_month = %birth.format("%B %Y"),
            "Seeded new AI child with pre-trained baseline"
        );

        Self {
            categories,
            knowledge_points: BASELINE_KNOWLEDGE,
            wisdom_score: BASELINE_WISDOM,
            baseline_wisdom: BASELINE_WISDOM,
            pre_trained_tokens: Some(PRE_TRAINED_TOKENS),
            birth_month: Some(birth.format("%B %Y").to_string()),
            foundation_models: FOUNDATION_MODELS.iter().map(|s| s.to_string()).collect(),
            start_date: Some(now),
            last_update: Some(now),
            ..Self::default()
        }
    }

    /// Restores structural invariants: all nine categories present, timeline bounded.
    pub fn normalize(&mut self) {
        for c in Category::all() {
            self.categories.entry(c).or_default();
        }
        while self.timeline.len() > TIMELINE_CAPACITY {
            self.timeline.pop_front();
        }
    }

    /// Lists invariant violations found in a freshly deserialized snapshot.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for c in Category::all() {
            if !self.categories.contains_key(&c) {
                problems.push(format!("category '{}' missing", c));
            }
        }
        if self.timeline.len() > TIMELINE_CAPACITY {
            problems.push(format!(
                "timeline holds {} events (capacity {})",
                self.timeline.len(),
                TIMELINE_CAPACITY
            ));
        }
        if self.pre_trained_tokens.is_none() {
            problems.push("provenance field preTrainedTokens missing".to_string());
        }
        if self.wisdom_score < self.baseline_wisdom {
            problems.push(format!(
                "wisdomScore {} below baselineWisdom {}",
                self.wisdom_score, self.baseline_wisdom
            ));
        }
        let classified = self.depth.superficial + self.depth.moderate + self.depth.deep;
        if classified > self.total_messages {
            problems.push(format!(
                "depth histogram counts {} messages but totalMessages is {}",
                classified, self.total_messages
            ));
        }
        problems
    }

    /// Number of categories with a non-zero score.
    pub fn category_diversity(&self) -> u64 {
        self.categories.values().filter(|c| c.score > 0).count() as u64
    }

    /// Sum of all topic-set sizes.
    pub fn total_topics(&self) -> usize {
        self.categories.values().map(|c| c.topics.len()).sum()
    }

    /// Category with the highest score (earlier category wins ties).
    pub fn dominant_category(&self) -> Option<Category> {
        let mut best: Option<(Category, u64)> = None;
        for (c, progress) in &self.categories {
            match best {
                Some((_, score)) if progress.score <= score => {}
                _ => best = Some((*c, progress.score)),
            }
        }
        best.map(|(c, _)| c)
    }

    pub fn category_score(&self, category: Category) -> u64 {
        self.categories.get(&category).map(|c| c.score).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn seeded_state_has_baseline_and_all_categories() {
        let mut rng = StdRng::seed_from_u64(7);
        let state = KnowledgeState::seeded_with(&mut rng, Utc::now());
        assert_eq!(state.knowledge_points, BASELINE_KNOWLEDGE);
        assert_eq!(state.wisdom_score, BASELINE_WISDOM);
        assert_eq!(state.categories.len(), 9);
        for progress in state.categories.values() {
            assert!(progress.score >= CATEGORY_BASELINE_MIN);
            assert!(progress.score < CATEGORY_BASELINE_MIN + CATEGORY_BASELINE_JITTER);
            assert!(progress.topics.is_empty());
        }
        assert!(state.timeline.is_empty());
        assert!(state.concepts.is_empty());
        assert_eq!(state.foundation_models.len(), 3);
        assert!(state.validate().is_empty());
    }

    #[test]
    fn birth_month_is_next_month() {
        let now = DateTime::parse_from_rfc3339("2026-10-14T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let state = KnowledgeState::seeded_with(&mut StdRng::seed_from_u64(1), now);
        assert_eq!(state.birth_month.as_deref(), Some("November 2026"));
    }

    #[test]
    fn partial_snapshot_defaults_and_normalizes() {
        let json = r#"{
            "totalMessages": 3,
            "categories": { "science": { "score": 10, "topics": ["atom", "atom"] } },
            "knowledgePoints": 42
        }"#;
        let mut state: KnowledgeState = serde_json::from_str(json).unwrap();
        assert!(!state.validate().is_empty());
        state.normalize();
        assert_eq!(state.total_messages, 3);
        assert_eq!(state.knowledge_points, 42);
        assert_eq!(state.categories.len(), 9);
        assert_eq!(state.categories[&Category::Science].topics.len(), 1);
        assert_eq!(state.category_score(Category::Nature), 0);
    }

    #[test]
    fn normalize_trims_oversized_timeline_from_front() {
        let mut state = KnowledgeState::default();
        for i in 0..60 {
            state.timeline.push_back(TimelineEvent {
                timestamp: Utc::now(),
                points: i,
                category: "general".into(),
                message: String::new(),
            });
        }
        state.normalize();
        assert_eq!(state.timeline.len(), TIMELINE_CAPACITY);
        assert_eq!(state.timeline.front().map(|e| e.points), Some(10));
    }

    #[test]
    fn dominant_category_prefers_earlier_on_tie() {
        let mut state = KnowledgeState::default();
        state.categories.get_mut(&Category::Nature).unwrap().score = 5;
        state.categories.get_mut(&Category::Emotions).unwrap().score = 5;
        assert_eq!(state.dominant_category(), Some(Category::Emotions));
        assert_eq!(state.category_diversity(), 2);
    }
}
