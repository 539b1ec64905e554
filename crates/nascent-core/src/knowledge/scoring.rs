//! ScoringEngine: folds one message into the knowledge state.
//!
//! Matching is plain substring search on the lower-cased text, so `"dna"`
//! also matches inside longer words. Points are only ever added.

use super::category::Category;
use super::state::{KnowledgeState, TimelineEvent, TIMELINE_CAPACITY};
use super::store::SnapshotStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEEP_INDICATORS: &[&str] = &[
    "why", "how", "because", "therefore", "understand", "explain", "meaning", "reason", "cause",
    "effect",
];
const ABSTRACT_INDICATORS: &[&str] = &["concept", "idea", "theory", "principle", "essence", "nature"];
const ANALYTICAL_INDICATORS: &[&str] =
    &["analyze", "examine", "study", "explore", "investigate", "consider"];

const CONCEPT_STOPLIST: &[&str] = &["something", "someone", "anything", "everything"];
const CONCEPT_MIN_CHARS: usize = 6;
const EXCERPT_CHARS: usize = 100;
/// Minimum points for a message to be recorded on the timeline.
pub const TIMELINE_THRESHOLD: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Superficial,
    Moderate,
    Deep,
}

impl Depth {
    pub fn classify(depth_score: u64) -> Self {
        if depth_score >= 5 {
            Depth::Deep
        } else if depth_score >= 2 {
            Depth::Moderate
        } else {
            Depth::Superficial
        }
    }
}

/// What a single scoring call found in the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub points: u64,
    pub depth_score: u64,
    pub depth: Depth,
    pub category_deltas: BTreeMap<Category, u64>,
    /// Highest-delta category of this call; `None` when nothing matched.
    pub top_category: Option<Category>,
    pub word_count: usize,
    pub has_question: bool,
}

fn depth_score(text: &str) -> u64 {
    let weighted = |words: &[&str], w: u64| words.iter().filter(|i| text.contains(*i)).count() as u64 * w;
    weighted(DEEP_INDICATORS, 2) + weighted(ABSTRACT_INDICATORS, 3) + weighted(ANALYTICAL_INDICATORS, 2)
}

fn top_category(deltas: &BTreeMap<Category, u64>) -> Option<Category> {
    let mut best: Option<(Category, u64)> = None;
    for (c, d) in deltas {
        match best {
            Some((_, score)) if *d <= score => {}
            _ => best = Some((*c, *d)),
        }
    }
    best.map(|(c, _)| c)
}

fn excerpt(message: &str) -> String {
    message.chars().take(EXCERPT_CHARS).collect()
}

/// Pure scoring: returns the next state and what was found. Does not persist.
pub fn score(message: &str, is_from_user: bool, prior: &KnowledgeState) -> (KnowledgeState, Analysis) {
    let text = message.to_lowercase();
    let words: Vec<&str> = text.split_whitespace().collect();
    let now = Utc::now();

    let mut next = prior.clone();
    next.normalize();
    next.total_messages += 1;
    next.total_words += words.len() as u64;
    next.last_update = Some(now);

    // 1. categories
    let mut category_deltas = BTreeMap::new();
    for category in Category::all() {
        let progress = next.categories.entry(category).or_default();
        let mut delta = 0;
        for keyword in category.keywords() {
            if text.contains(keyword) {
                delta += category.weight();
                progress.topics.insert((*keyword).to_string());
            }
        }
        if delta > 0 {
            progress.score += delta;
            category_deltas.insert(category, delta);
        }
    }

    // 2. depth
    let depth_score = depth_score(&text);
    let depth = Depth::classify(depth_score);
    match depth {
        Depth::Deep => next.depth.deep += 1,
        Depth::Moderate => next.depth.moderate += 1,
        Depth::Superficial => next.depth.superficial += 1,
    }

    // 3. questions
    let has_question = text.contains('?');
    if has_question {
        if is_from_user {
            next.questions.answered += 1;
        } else {
            next.questions.asked += 1;
        }
    }

    // 4. concepts
    for word in &words {
        if word.chars().count() >= CONCEPT_MIN_CHARS && !CONCEPT_STOPLIST.contains(word) {
            next.concepts.insert((*word).to_string());
        }
    }

    // 5. points
    let mut points: u64 = category_deltas.values().sum::<u64>() + depth_score;
    if words.len() > 20 {
        points += 2;
    }
    if words.len() > 50 {
        points += 3;
    }
    if !is_from_user && has_question {
        points += 5;
    }
    next.knowledge_points += points;

    // 6. wisdom, recomputed on top of the inherited baseline
    let recomputed = (next.depth.deep + next.depth.moderate) as f64 * 2.0
        + next.questions.asked.min(next.questions.answered) as f64 * 3.0
        + next.category_diversity() as f64 * 5.0
        + next.concepts.len() as f64 * 0.5;
    let wisdom = next.baseline_wisdom + recomputed.floor() as u64;
    next.wisdom_score = next.wisdom_score.max(wisdom);

    // 7. timeline
    let top = top_category(&category_deltas);
    if points >= TIMELINE_THRESHOLD {
        next.timeline.push_back(TimelineEvent {
            timestamp: now,
            points,
            category: top.map(|c| c.as_str()).unwrap_or("general").to_string(),
            message: excerpt(message),
        });
        while next.timeline.len() > TIMELINE_CAPACITY {
            next.timeline.pop_front();
        }
    }

    let analysis = Analysis {
        points,
        depth_score,
        depth,
        category_deltas,
        top_category: top,
        word_count: words.len(),
        has_question,
    };
    (next, analysis)
}

/// Scores messages and durably saves every resulting state.
#[derive(Clone)]
pub struct ScoringEngine {
    store: SnapshotStore,
}

impl ScoringEngine {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Scores `message` against `prior`, persists and returns the new state.
    pub fn analyze(&self, message: &str, is_from_user: bool, prior: &KnowledgeState) -> KnowledgeState {
        self.analyze_detailed(message, is_from_user, prior).0
    }

    /// Like [`ScoringEngine::analyze`] but also returns the per-call breakdown.
    pub fn analyze_detailed(
        &self,
        message: &str,
        is_from_user: bool,
        prior: &KnowledgeState,
    ) -> (KnowledgeState, Analysis) {
        let (next, analysis) = score(message, is_from_user, prior);
        self.store.save_knowledge(&next);
        tracing::debug!(
            points = analysis.points,
            depth = ?analysis.depth,
            total = next.knowledge_points,
            "Knowledge updated"
        );
        (next, analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::state::BASELINE_KNOWLEDGE;

    fn baseline() -> KnowledgeState {
        KnowledgeState::seeded()
    }

    #[test]
    fn ocean_love_scenario_is_exact() {
        let prior = baseline();
        let msg = "I wonder why the ocean feels so peaceful and full of love";
        let (next, analysis) = score(msg, true, &prior);

        assert_eq!(analysis.category_deltas.get(&Category::Nature), Some(&2));
        assert_eq!(analysis.category_deltas.get(&Category::Emotions), Some(&2));
        assert_eq!(analysis.category_deltas.len(), 2);
        assert_eq!(analysis.depth_score, 2);
        assert_eq!(analysis.depth, Depth::Moderate);
        assert_eq!(analysis.word_count, 12);
        assert_eq!(analysis.points, 6);
        assert_eq!(next.knowledge_points, prior.knowledge_points + 6);

        assert!(next.concepts.contains("wonder"));
        assert!(next.concepts.contains("peaceful"));
        assert!(!next.concepts.contains("ocean"));
        assert_eq!(next.concepts.len(), 2);

        assert!(next.categories[&Category::Nature].topics.contains("ocean"));
        assert!(next.categories[&Category::Emotions].topics.contains("love"));
        assert_eq!(next.timeline.len(), 1);
        assert_eq!(next.timeline[0].category, "emotions");
        assert_eq!(next.timeline[0].points, 6);
        assert_eq!(next.depth.moderate, 1);
        assert_eq!(next.questions, prior.questions);
    }

    #[test]
    fn repeated_keyword_counts_once_per_category() {
        let (_, analysis) = score("i ponder existence", true, &baseline());
        assert_eq!(analysis.category_deltas.get(&Category::Philosophy), Some(&3));
        assert_eq!(analysis.category_deltas.len(), 1);
    }

    #[test]
    fn input_state_is_not_mutated() {
        let prior = baseline();
        let snapshot = prior.clone();
        let _ = score("quantum physics explains the universe?", false, &prior);
        assert_eq!(prior, snapshot);
    }

    #[test]
    fn points_and_wisdom_never_decrease() {
        let mut state = baseline();
        let messages = [
            "",
            "hello",
            "Why does love exist?",
            "blockchain validators secure the network through staking",
            "a b c d e f g h i j k l m n o p q r s t u v w x y z",
        ];
        for (i, msg) in messages.iter().cycle().take(25).enumerate() {
            let (next, _) = score(msg, i % 2 == 0, &state);
            assert!(next.knowledge_points >= state.knowledge_points);
            assert!(next.wisdom_score >= state.wisdom_score);
            state = next;
        }
        assert!(state.knowledge_points > BASELINE_KNOWLEDGE);
    }

    #[test]
    fn wisdom_stays_monotone_for_snapshot_without_baseline_field() {
        let mut prior = KnowledgeState::default();
        prior.wisdom_score = 1_000_000;
        let (next, _) = score("hello", true, &prior);
        assert_eq!(next.wisdom_score, 1_000_000);
    }

    #[test]
    fn topic_membership_is_idempotent() {
        let state = baseline();
        let (state, _) = score("I love you", true, &state);
        let (state, _) = score("love love love", true, &state);
        let topics = &state.categories[&Category::Emotions].topics;
        assert_eq!(topics.iter().filter(|t| t.as_str() == "love").count(), 1);
    }

    #[test]
    fn keyword_counts_once_per_call_regardless_of_occurrences() {
        let (_, analysis) = score("love love love", true, &baseline());
        assert_eq!(analysis.category_deltas.get(&Category::Emotions), Some(&2));
    }

    #[test]
    fn substring_matching_hits_inside_words() {
        let (next, analysis) = score("Excellent", true, &baseline());
        // "excellent" contains "cell"
        assert_eq!(analysis.category_deltas.get(&Category::Science), Some(&2));
        assert!(next.categories[&Category::Science].topics.contains("cell"));
    }

    #[test]
    fn timeline_keeps_fifty_most_recent() {
        let mut state = baseline();
        for i in 0..55 {
            // philosophy (truth) 3 + deep (why) 2 = 5 points
            let msg = format!("truth why {}", i);
            let (next, analysis) = score(&msg, true, &state);
            assert!(analysis.points >= TIMELINE_THRESHOLD);
            state = next;
        }
        assert_eq!(state.timeline.len(), TIMELINE_CAPACITY);
        assert_eq!(state.timeline.front().unwrap().message, "truth why 5");
        assert_eq!(state.timeline.back().unwrap().message, "truth why 54");
    }

    #[test]
    fn low_scoring_message_skips_timeline() {
        let (next, analysis) = score("hello there", true, &baseline());
        assert_eq!(analysis.points, 0);
        assert!(next.timeline.is_empty());
    }

    #[test]
    fn depth_classification_boundaries() {
        let (_, deep) = score("why how reason", true, &baseline());
        assert_eq!(deep.depth_score, 6);
        assert_eq!(deep.depth, Depth::Deep);

        let (_, moderate) = score("why", true, &baseline());
        assert_eq!(moderate.depth_score, 2);
        assert_eq!(moderate.depth, Depth::Moderate);

        let (_, shallow) = score("hello there", true, &baseline());
        assert_eq!(shallow.depth_score, 0);
        assert_eq!(shallow.depth, Depth::Superficial);
    }

    #[test]
    fn question_bucket_routing() {
        let prior = baseline();
        let (from_user, _) = score("Why?", true, &prior);
        assert_eq!(from_user.questions.answered, prior.questions.answered + 1);
        assert_eq!(from_user.questions.asked, prior.questions.asked);

        let (from_ai, analysis) = score("Why?", false, &prior);
        assert_eq!(from_ai.questions.asked, prior.questions.asked + 1);
        assert_eq!(from_ai.questions.answered, prior.questions.answered);
        // depth 2 + curiosity bonus 5
        assert_eq!(analysis.points, 7);
    }

    #[test]
    fn length_bonuses() {
        let long: String = vec!["word"; 21].join(" ");
        let (_, a) = score(&long, true, &baseline());
        assert_eq!(a.points, 2);
        let longer: String = vec!["word"; 51].join(" ");
        let (_, a) = score(&longer, true, &baseline());
        assert_eq!(a.points, 5);
    }

    #[test]
    fn empty_message_only_counts_the_message() {
        let prior = baseline();
        let (next, analysis) = score("", true, &prior);
        assert_eq!(analysis.points, 0);
        assert_eq!(next.total_messages, prior.total_messages + 1);
        assert_eq!(next.total_words, prior.total_words);
        assert_eq!(next.depth.superficial, prior.depth.superficial + 1);
    }

    #[test]
    fn stoplisted_words_are_not_concepts() {
        let (next, _) = score("everything something anything someone galaxy", true, &baseline());
        assert_eq!(next.concepts.len(), 1);
        assert!(next.concepts.contains("galaxy"));
    }

    #[test]
    fn timeline_excerpt_keeps_original_case_and_truncates() {
        let msg = format!("TRUTH why {}", "x".repeat(200));
        let (next, _) = score(&msg, true, &baseline());
        let event = next.timeline.back().unwrap();
        assert_eq!(event.message.chars().count(), 100);
        assert!(event.message.starts_with("TRUTH why"));
        assert_eq!(event.category, "philosophy");
    }

    #[test]
    fn no_category_match_is_recorded_as_general() {
        // two analytical indicators + one deep = 6 points, no category keyword
        let (next, analysis) = score("examine and consider why", true, &baseline());
        assert_eq!(analysis.top_category, None);
        assert_eq!(next.timeline.back().unwrap().category, "general");
    }

    #[test]
    fn engine_persists_each_call() {
        let store = SnapshotStore::in_memory();
        let engine = ScoringEngine::new(store.clone());
        let prior = store.load_knowledge();
        let next = engine.analyze("truth why", true, &prior);
        assert_eq!(store.load_knowledge(), next);
    }
}
