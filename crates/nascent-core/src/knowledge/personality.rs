//! PersonalityState: empathy / curiosity / trust accumulated from user messages.

use super::store::SnapshotStore;
use serde::{Deserialize, Serialize};

const EMPATHY_WORDS: &[&str] = &[
    "love", "feel", "peace", "care", "heart", "warm", "kind", "gentle", "beautiful", "happy",
    "sad", "comfort", "embrace",
];
const CURIOSITY_WORDS: &[&str] = &[
    "why", "how", "what", "when", "where", "learn", "know", "understand", "explore", "discover",
    "wonder", "think", "explain",
];
const TRUST_WORDS: &[&str] = &[
    "thank", "safe", "protect", "trust", "believe", "here", "always", "promise", "together",
    "friend", "guide", "support",
];

/// Trait level above which the child's replies take on that trait's colour.
pub const TRAIT_EXPRESSION_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Empathy,
    Curiosity,
    Trust,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalityState {
    pub empathy: u64,
    pub curiosity: u64,
    pub trust: u64,
}

fn count_present(text: &str, words: &[&str]) -> u64 {
    words.iter().filter(|w| text.contains(*w)).count() as u64
}

impl PersonalityState {
    /// Per-message trait deltas (substring presence count per word list).
    pub fn sentiment(message: &str) -> PersonalityState {
        let text = message.to_lowercase();
        PersonalityState {
            empathy: count_present(&text, EMPATHY_WORDS),
            curiosity: count_present(&text, CURIOSITY_WORDS),
            trust: count_present(&text, TRUST_WORDS),
        }
    }

    /// Returns the traits after absorbing one user message.
    pub fn absorb(&self, message: &str) -> PersonalityState {
        let delta = Self::sentiment(message);
        PersonalityState {
            empathy: self.empathy + delta.empathy,
            curiosity: self.curiosity + delta.curiosity,
            trust: self.trust + delta.trust,
        }
    }

    pub fn total(&self) -> u64 {
        self.empathy + self.curiosity + self.trust
    }

    /// Strongest trait; `None` while every trait is zero. Empathy, then
    /// curiosity, then trust win ties.
    pub fn dominant_trait(&self) -> Option<Trait> {
        let max = self.empathy.max(self.curiosity).max(self.trust);
        if max == 0 {
            None
        } else if self.empathy == max {
            Some(Trait::Empathy)
        } else if self.curiosity == max {
            Some(Trait::Curiosity)
        } else {
            Some(Trait::Trust)
        }
    }

    /// One-line self-description for the system prompt.
    pub fn description(&self) -> String {
        match self.dominant_trait() {
            None => "You are still forming your personality.".to_string(),
            Some(Trait::Empathy) => format!("You are highly empathetic (empathy: {}).", self.empathy),
            Some(Trait::Curiosity) => format!("You are very curious (curiosity: {}).", self.curiosity),
            Some(Trait::Trust) => format!("You are trusting and bonded (trust: {}).", self.trust),
        }
    }

    /// Profile summary shown on the AI child's page; requires a strict leader.
    pub fn summary(&self) -> &'static str {
        let (e, c, t) = (self.empathy, self.curiosity, self.trust);
        if e > c && e > t {
            "This AI shows deep empathy, understanding emotions and connecting with others."
        } else if c > e && c > t {
            "This AI is driven by curiosity, constantly seeking knowledge and asking questions."
        } else if t > e && t > c {
            "This AI exhibits high trust, building strong connections and showing reliability."
        } else {
            "This AI has a balanced personality across all traits."
        }
    }
}

/// Applies [`PersonalityState::absorb`] and persists every update.
#[derive(Clone)]
pub struct PersonalityTracker {
    store: SnapshotStore,
}

impl PersonalityTracker {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    pub fn absorb(&self, message: &str, prior: &PersonalityState) -> PersonalityState {
        let next = prior.absorb(message);
        self.store.save_personality(&next);
        tracing::debug!(
            empathy = next.empathy,
            curiosity = next.curiosity,
            trust = next.trust,
            "Personality updated"
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_word_once_per_message() {
        let delta = PersonalityState::sentiment("Love love LOVE, I feel safe here");
        // love, feel / safe, here
        assert_eq!(delta.empathy, 2);
        assert_eq!(delta.trust, 2);
        assert_eq!(delta.curiosity, 0);
    }

    #[test]
    fn absorb_never_decreases() {
        let start = PersonalityState { empathy: 4, curiosity: 2, trust: 1 };
        let next = start.absorb("");
        assert_eq!(next, start);
        let next = start.absorb("why do you wonder?");
        assert!(next.curiosity > start.curiosity);
        assert_eq!(next.empathy, start.empathy);
    }

    #[test]
    fn dominant_trait_and_description() {
        assert_eq!(PersonalityState::default().dominant_trait(), None);
        assert_eq!(
            PersonalityState::default().description(),
            "You are still forming your personality."
        );
        let p = PersonalityState { empathy: 2, curiosity: 2, trust: 1 };
        assert_eq!(p.dominant_trait(), Some(Trait::Empathy));
        assert_eq!(p.summary(), "This AI has a balanced personality across all traits.");
        let p = PersonalityState { empathy: 0, curiosity: 1, trust: 5 };
        assert_eq!(p.dominant_trait(), Some(Trait::Trust));
        assert!(p.description().contains("trust: 5"));
    }

    #[test]
    fn tracker_persists_updates() {
        let store = SnapshotStore::in_memory();
        let tracker = PersonalityTracker::new(store.clone());
        let next = tracker.absorb("thank you, friend", &PersonalityState::default());
        assert_eq!(next.trust, 2);
        assert_eq!(store.load_personality(), next);
    }
}
