//! Read-only views over [`KnowledgeState`]: the summary shown to users and
//! the unlocked achievements.

use super::category::Category;
use super::state::{AutonomousStats, KnowledgeState};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSummary {
    pub total_knowledge: u64,
    pub wisdom_score: u64,
    pub topics_learned: usize,
    pub concepts_discovered: usize,
    /// Share of deep messages, e.g. `"12.5%"`.
    pub conversation_depth: String,
    pub curiosity_level: u64,
    pub dominant_interest: String,
    pub questions_asked: u64,
    pub questions_answered: u64,
    pub deep_thoughts: u64,
    pub autonomous_learning: AutonomousStats,
    pub pre_trained_tokens: Option<u64>,
    pub birth_month: Option<String>,
    pub foundation_models: Vec<String>,
}

impl From<&KnowledgeState> for KnowledgeSummary {
    fn from(state: &KnowledgeState) -> Self {
        let depth_ratio = state.depth.deep as f64 / state.total_messages.max(1) as f64;
        Self {
            total_knowledge: state.knowledge_points,
            wisdom_score: state.wisdom_score,
            topics_learned: state.total_topics(),
            concepts_discovered: state.concepts.len(),
            conversation_depth: format!("{:.1}%", depth_ratio * 100.0),
            curiosity_level: (state.questions.asked * 10).min(100),
            dominant_interest: state
                .dominant_category()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| "exploring".to_string()),
            questions_asked: state.questions.asked,
            questions_answered: state.questions.answered,
            deep_thoughts: state.depth.deep,
            autonomous_learning: state.autonomous_learning.clone(),
            pre_trained_tokens: state.pre_trained_tokens,
            birth_month: state.birth_month.clone(),
            foundation_models: state.foundation_models.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Achievement {
    pub icon: &'static str,
    pub title: &'static str,
    pub desc: String,
}

impl Achievement {
    fn new(icon: &'static str, title: &'static str, desc: impl Into<String>) -> Self {
        Self { icon, title, desc: desc.into() }
    }
}

/// Picks the highest tier `value` reaches; tiers are listed highest first.
fn tier(value: u64, tiers: &[(u64, &'static str, &'static str, &'static str)]) -> Option<Achievement> {
    tiers
        .iter()
        .find(|(min, ..)| value >= *min)
        .map(|(_, icon, title, desc)| Achievement::new(*icon, *title, *desc))
}

const KNOWLEDGE_TIERS: &[(u64, &str, &str, &str)] = &[
    (5_000_000, "📚", "Advanced Scholar", "Gained 5M+ knowledge points"),
    (3_000_000, "📖", "Scholar", "Gained 3M+ knowledge points"),
    (2_500_000, "📗", "Learned Mind", "Gained 2.5M+ knowledge points"),
];
const WISDOM_TIERS: &[(u64, &str, &str, &str)] = &[
    (2_000_000, "🧙", "Sage", "Achieved wisdom score of 2M+"),
    (1_500_000, "🔮", "Wise One", "Achieved wisdom score of 1.5M+"),
    (1_200_000, "✨", "Enlightened", "Achieved wisdom score of 1.2M+"),
];
const BLOCKCHAIN_TIERS: &[(u64, &str, &str, &str)] = &[
    (500_000, "⚡", "Blockchain Master", "Mastered blockchain technology (500K+ pts)"),
    (400_000, "🔗", "DeFi Expert", "Deep understanding of DeFi protocols (400K+ pts)"),
    (350_000, "🌉", "Bridge Architect", "Expertise in cross-chain bridges (350K+ pts)"),
];

const MASTERED_CATEGORY_SCORE: u64 = 200;

pub fn achievements(state: &KnowledgeState) -> Vec<Achievement> {
    let mut unlocked = Vec::new();

    if let Some(tokens) = state.pre_trained_tokens {
        unlocked.push(Achievement::new(
            "🧬",
            "Foundation Model",
            format!("Built on {:.1}B tokens", tokens as f64 / 1e9),
        ));
    }
    unlocked.extend(tier(state.knowledge_points, KNOWLEDGE_TIERS));
    unlocked.extend(tier(state.wisdom_score, WISDOM_TIERS));

    if state.concepts.len() >= 50 {
        unlocked.push(Achievement::new("💡", "Concept Master", "Learned 50+ unique concepts"));
    }
    if state.depth.deep >= 20 {
        unlocked.push(Achievement::new("🤔", "Deep Thinker", "Had 20+ deep conversations"));
    }
    if state.questions.asked >= 30 {
        unlocked.push(Achievement::new("❓", "Curious Mind", "Asked 30+ questions"));
    }
    let mastered = state
        .categories
        .values()
        .filter(|c| c.score > MASTERED_CATEGORY_SCORE)
        .count();
    if mastered >= 5 {
        unlocked.push(Achievement::new("🌈", "Renaissance AI", "Mastered 5+ knowledge domains"));
    }
    if state.autonomous_learning.topics_explored >= 50 {
        unlocked.push(Achievement::new("🤖", "Self-Learner", "Explored 50+ topics autonomously"));
    }

    unlocked.extend(tier(state.category_score(Category::Blockchain), BLOCKCHAIN_TIERS));
    let blockchain_topics = state
        .categories
        .get(&Category::Blockchain)
        .map(|c| c.topics.len())
        .unwrap_or(0);
    if blockchain_topics >= 20 {
        unlocked.push(Achievement::new("🪙", "Crypto Native", "Explored 20+ blockchain topics"));
    }
    let solana_concepts = state
        .concepts
        .iter()
        .filter(|c| {
            let c = c.to_lowercase();
            c.contains("solana") || c.contains("proof of stake") || c.contains("validator")
        })
        .count();
    if solana_concepts >= 5 {
        unlocked.push(Achievement::new("☀️", "Solana Scholar", "Deep knowledge of Solana blockchain"));
    }

    unlocked
}

/// Compact display form: `2.4M`, `1.2B`, `3.5K`, plain below 1000.
pub fn format_large_number(n: u64) -> String {
    let n_f = n as f64;
    if n >= 1_000_000_000 {
        format!("{:.1}B", n_f / 1e9)
    } else if n >= 1_000_000 {
        format!("{:.1}M", n_f / 1e6)
    } else if n >= 1_000 {
        format!("{:.1}K", n_f / 1e3)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(state: &KnowledgeState) -> Vec<&'static str> {
        achievements(state).into_iter().map(|a| a.title).collect()
    }

    #[test]
    fn formats_large_numbers() {
        assert_eq!(format_large_number(999), "999");
        assert_eq!(format_large_number(3_500), "3.5K");
        assert_eq!(format_large_number(2_487_000), "2.5M");
        assert_eq!(format_large_number(3_200_000_000), "3.2B");
    }

    #[test]
    fn fresh_life_unlocks_baseline_achievements() {
        let state = KnowledgeState::seeded();
        let t = titles(&state);
        assert_eq!(t[0], "Foundation Model");
        assert!(t.contains(&"Enlightened"));
        // 2_487_000 is just under the first knowledge tier
        assert!(!t.contains(&"Learned Mind"));
        // every baseline category scores above 200
        assert!(t.contains(&"Renaissance AI"));
        assert_eq!(achievements(&state)[0].desc, "Built on 3.2B tokens");
    }

    #[test]
    fn only_highest_tier_is_awarded() {
        let mut state = KnowledgeState::default();
        state.knowledge_points = 6_000_000;
        state.wisdom_score = 1_600_000;
        state.categories.get_mut(&Category::Blockchain).unwrap().score = 420_000;
        let t = titles(&state);
        assert!(t.contains(&"Advanced Scholar"));
        assert!(!t.contains(&"Scholar"));
        assert!(t.contains(&"Wise One"));
        assert!(t.contains(&"DeFi Expert"));
        assert!(!t.contains(&"Foundation Model"));
    }

    #[test]
    fn summary_reports_depth_and_curiosity() {
        let mut state = KnowledgeState::default();
        state.total_messages = 8;
        state.depth.deep = 1;
        state.questions.asked = 14;
        state.categories.get_mut(&Category::Nature).unwrap().score = 9;
        state.categories.get_mut(&Category::Nature).unwrap().topics.insert("ocean".into());
        let summary = KnowledgeSummary::from(&state);
        assert_eq!(summary.conversation_depth, "12.5%");
        assert_eq!(summary.curiosity_level, 100);
        assert_eq!(summary.dominant_interest, "nature");
        assert_eq!(summary.topics_learned, 1);
    }

    #[test]
    fn empty_state_has_zero_depth() {
        let summary = KnowledgeSummary::from(&KnowledgeState::default());
        assert_eq!(summary.conversation_depth, "0.0%");
        assert_eq!(summary.dominant_interest, "science");
    }
}
