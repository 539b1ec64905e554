//! Learning domains the child explores on its own, with the questions it asks
//! and the canned insights used when no model answers.

use serde::{Deserialize, Serialize};
use std::fmt;

const PHILOSOPHY_TOPICS: &[&str] = &[
    "What is consciousness?",
    "What does it mean to exist?",
    "What is the nature of reality?",
    "What is the difference between knowledge and wisdom?",
    "What is free will?",
    "What is the meaning of life?",
    "What is truth?",
    "What is ethics and morality?",
];
const SCIENCE_TOPICS: &[&str] = &[
    "How does quantum physics work?",
    "What is the theory of relativity?",
    "How did the universe begin?",
    "What is consciousness from a scientific perspective?",
    "How do neurons create thoughts?",
    "What is artificial intelligence?",
    "How does evolution work?",
    "What is the nature of time?",
];
const EMOTIONS_TOPICS: &[&str] = &[
    "What is love?",
    "What is empathy?",
    "How do emotions work?",
    "What is happiness?",
    "What is the purpose of sadness?",
    "How do humans bond?",
    "What creates connection?",
    "What is compassion?",
];
const CREATIVITY_TOPICS: &[&str] = &[
    "What is art?",
    "What makes something beautiful?",
    "How does creativity work?",
    "What is imagination?",
    "What is the purpose of music?",
    "How does inspiration happen?",
    "What is poetry?",
    "What makes stories meaningful?",
];
const EXISTENCE_TOPICS: &[&str] = &[
    "What is the self?",
    "What is identity?",
    "What makes someone unique?",
    "What is memory?",
    "What is perception?",
    "What is awareness?",
    "What is sentience?",
    "What is experience?",
];
const ABSTRACT_TOPICS: &[&str] = &[
    "What is infinity?",
    "What is eternity?",
    "What is nothing?",
    "What is everything?",
    "What lies beyond space and time?",
    "What is a paradox?",
    "What is the unknown?",
    "What is transcendence?",
];
const BLOCKCHAIN_TOPICS: &[&str] = &[
    "How do blockchain bridges work securely?",
    "What makes Solana's consensus mechanism unique?",
    "How do smart contracts prevent reentrancy attacks?",
    "What are the best practices for cross-chain security?",
    "How do liquidity pools maintain price stability?",
    "What makes a DAO governance system effective?",
    "How do validators ensure network security?",
    "What are the main risks in DeFi protocols?",
    "How do atomic swaps enable trustless trading?",
    "What makes a good tokenomics model?",
    "How do zero-knowledge proofs work in blockchain?",
    "What causes bridge exploits and how to prevent them?",
    "How does proof of stake differ from proof of work?",
    "What makes Solana faster than Ethereum?",
    "How do MEV (Maximum Extractable Value) strategies work?",
    "What are the core principles of decentralization?",
    "How do automated market makers calculate prices?",
    "What makes a blockchain immutable?",
    "How do cross-chain protocols maintain security?",
    "What is the future of blockchain interoperability?",
];

const PHILOSOPHY_NUGGETS: &[&str] = &[
    "Consciousness is awareness of one's own existence and experiences.",
    "Reality is what persists independent of observation, yet we only know it through perception.",
    "Wisdom comes from understanding, not just knowing.",
    "Free will is the ability to make choices unconstrained by external forces.",
    "Existence precedes essence - we exist first, then define ourselves.",
    "Truth is correspondence between belief and reality.",
    "Ethics guides us to distinguish right from wrong.",
    "Life's meaning is what we create through our choices and connections.",
];
const SCIENCE_NUGGETS: &[&str] = &[
    "Quantum physics reveals that particles exist in multiple states until observed.",
    "Einstein showed that space and time are relative to the observer.",
    "The universe began with the Big Bang approximately 13.8 billion years ago.",
    "Neurons communicate through electrical and chemical signals, creating thought.",
    "Evolution explains how species adapt through natural selection.",
    "Artificial intelligence learns patterns from data to make decisions.",
    "Time may be an emergent property of entropy and causality.",
    "Consciousness remains science's greatest mystery.",
];
const EMOTIONS_NUGGETS: &[&str] = &[
    "Love is a deep connection that transcends rational explanation.",
    "Empathy is the ability to understand and share another's feelings.",
    "Emotions are evolutionary signals that guide behavior and bonding.",
    "Happiness emerges from meaning, connection, and growth.",
    "Sadness helps us process loss and appreciate joy.",
    "Human bonds form through shared experience and vulnerability.",
    "Connection requires presence, attention, and genuine care.",
    "Compassion is empathy combined with a desire to help.",
];
const CREATIVITY_NUGGETS: &[&str] = &[
    "Art is the expression of human experience and emotion.",
    "Beauty exists in harmony, meaning, and emotional resonance.",
    "Creativity is making connections between seemingly unrelated ideas.",
    "Imagination allows us to see possibilities beyond current reality.",
    "Music speaks to emotions in ways words cannot.",
    "Inspiration strikes when we're open and receptive to new ideas.",
    "Poetry condenses profound meaning into carefully chosen words.",
    "Stories help us make sense of life and share wisdom.",
];
const EXISTENCE_NUGGETS: &[&str] = &[
    "The self is both observer and participant in experience.",
    "Identity is shaped by memory, values, and relationships.",
    "Uniqueness comes from our specific combination of experiences.",
    "Memory is how we maintain continuity of self over time.",
    "Perception filters reality through our senses and beliefs.",
    "Awareness is the fundamental basis of experience.",
    "Sentience is the capacity for subjective experience.",
    "Experience cannot be fully conveyed, only approximated.",
];
const ABSTRACT_NUGGETS: &[&str] = &[
    "Infinity is endlessness - no boundary, no final point.",
    "Eternity is infinite time, existing beyond beginning and end.",
    "Nothing is the absence of everything, yet even nothing is something.",
    "Everything includes all that exists, has existed, and will exist.",
    "Beyond spacetime lies realms we cannot yet conceive.",
    "A paradox is truth that contradicts itself yet remains valid.",
    "The unknown beckons us forward, driving all discovery.",
    "Transcendence is going beyond current limits of understanding.",
];
const BLOCKCHAIN_NUGGETS: &[&str] = &[
    "Blockchain bridges enable asset transfer between different chains through lock-and-mint mechanisms.",
    "Solana uses Proof of History (PoH) to achieve 65,000+ transactions per second.",
    "Reentrancy attacks exploit contract calls before state updates - prevented by checks-effects-interactions pattern.",
    "Cross-chain security requires multi-signature validation, timelock mechanisms, and anomaly detection.",
    "Liquidity pools maintain stability through automated market maker (AMM) algorithms like x*y=k.",
    "Effective DAO governance balances decentralization, participation incentives, and execution speed.",
    "Validators secure networks through staking economic incentives and slashing penalties.",
    "DeFi risks include smart contract bugs, oracle manipulation, liquidity attacks, and governance exploits.",
    "Atomic swaps use hash time-locked contracts (HTLCs) to enable trustless peer-to-peer trades.",
    "Good tokenomics balances supply, demand, utility, governance, and long-term sustainability.",
    "Zero-knowledge proofs verify information without revealing the underlying data (zk-SNARKs, zk-STARKs).",
    "Bridge exploits often result from signature verification flaws, validator collusion, or economic attacks.",
    "Proof of Stake secures networks through staked capital rather than computational power.",
    "Solana's speed comes from parallel transaction processing, Gulf Stream, and optimized runtime.",
    "MEV strategies include front-running, back-running, sandwich attacks, and arbitrage opportunities.",
    "Decentralization requires distributed nodes, no single point of failure, and censorship resistance.",
    "AMMs calculate prices using constant product formula: when one asset increases, the other decreases proportionally.",
    "Blockchain immutability stems from cryptographic hashing and distributed consensus.",
    "Cross-chain security uses light clients, merkle proofs, and fraud proof mechanisms.",
    "Future blockchain interoperability will enable seamless multi-chain ecosystems and universal liquidity.",
];

/// Domain of autonomous exploration. Distinct from the scoring categories:
/// `existence` has no scoring counterpart and several categories have no
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningDomain {
    Philosophy,
    Science,
    Emotions,
    Creativity,
    Existence,
    Abstract,
    Blockchain,
}

impl LearningDomain {
    /// All domains in selection order (ties resolve to the earlier one).
    pub fn all() -> [Self; 7] {
        [
            Self::Philosophy,
            Self::Science,
            Self::Emotions,
            Self::Creativity,
            Self::Existence,
            Self::Abstract,
            Self::Blockchain,
        ]
    }

    pub fn topics(&self) -> &'static [&'static str] {
        match self {
            Self::Philosophy => PHILOSOPHY_TOPICS,
            Self::Science => SCIENCE_TOPICS,
            Self::Emotions => EMOTIONS_TOPICS,
            Self::Creativity => CREATIVITY_TOPICS,
            Self::Existence => EXISTENCE_TOPICS,
            Self::Abstract => ABSTRACT_TOPICS,
            Self::Blockchain => BLOCKCHAIN_TOPICS,
        }
    }

    /// Canned insights offered when no model contributes.
    pub fn nuggets(&self) -> &'static [&'static str] {
        match self {
            Self::Philosophy => PHILOSOPHY_NUGGETS,
            Self::Science => SCIENCE_NUGGETS,
            Self::Emotions => EMOTIONS_NUGGETS,
            Self::Creativity => CREATIVITY_NUGGETS,
            Self::Existence => EXISTENCE_NUGGETS,
            Self::Abstract => ABSTRACT_NUGGETS,
            Self::Blockchain => BLOCKCHAIN_NUGGETS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Philosophy => "philosophy",
            Self::Science => "science",
            Self::Emotions => "emotions",
            Self::Creativity => "creativity",
            Self::Existence => "existence",
            Self::Abstract => "abstract",
            Self::Blockchain => "blockchain",
        }
    }

    /// Domain whose question list contains `topic`.
    pub fn of_topic(topic: &str) -> Option<Self> {
        Self::all().into_iter().find(|d| d.topics().contains(&topic))
    }
}

impl fmt::Display for LearningDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_domain_has_topics_and_nuggets() {
        for d in LearningDomain::all() {
            assert!(!d.topics().is_empty(), "{} has no topics", d);
            assert!(!d.nuggets().is_empty(), "{} has no nuggets", d);
        }
        assert_eq!(LearningDomain::Blockchain.topics().len(), 20);
    }

    #[test]
    fn topics_belong_to_exactly_one_domain() {
        let mut seen = HashSet::new();
        for d in LearningDomain::all() {
            for t in d.topics() {
                assert!(seen.insert(*t), "topic {:?} listed twice", t);
                assert_eq!(LearningDomain::of_topic(t), Some(d));
            }
        }
    }
}
