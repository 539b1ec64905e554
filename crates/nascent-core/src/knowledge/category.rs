//! The nine fixed knowledge categories with their keyword lists and weights.
//!
//! | Category   | Weight |
//! |------------|--------|
//! | science    | 2      |
//! | philosophy | 3      |
//! | emotions   | 2      |
//! | creativity | 2      |
//! | technology | 2      |
//! | blockchain | 3      |
//! | nature     | 2      |
//! | society    | 2      |
//! | abstract   | 3      |

use serde::{Deserialize, Serialize};
use std::fmt;

const SCIENCE: &[&str] = &[
    "quantum", "physics", "chemistry", "biology", "atom", "molecule", "energy", "matter",
    "universe", "evolution", "dna", "cell", "theory", "experiment", "hypothesis", "scientific",
];
const PHILOSOPHY: &[&str] = &[
    "existence", "consciousness", "reality", "truth", "ethics", "morality", "meaning", "purpose",
    "free will", "destiny", "soul", "mind", "being", "metaphysics", "epistemology",
];
const EMOTIONS: &[&str] = &[
    "love", "happiness", "sadness", "fear", "joy", "anger", "empathy", "compassion", "hope",
    "dream", "feeling", "emotion", "heart", "care", "comfort",
];
const CREATIVITY: &[&str] = &[
    "art", "music", "poetry", "story", "create", "imagine", "design", "beauty", "aesthetic",
    "painting", "dance", "song", "write", "creative", "inspiration",
];
const TECHNOLOGY: &[&str] = &[
    "computer", "algorithm", "code", "programming", "ai", "machine", "robot", "digital",
    "software", "hardware", "internet", "data", "network",
];
const BLOCKCHAIN: &[&str] = &[
    "solana", "ethereum", "blockchain", "crypto", "defi", "nft", "smart contract", "bridge",
    "protocol", "consensus", "validator", "token", "dao", "web3", "dex", "liquidity", "amm",
    "cross-chain", "wallet", "transaction", "decentralized", "trustless", "immutable", "ledger",
    "proof of stake", "mining", "staking", "yield", "swap", "tokenomics", "governance",
];
const NATURE: &[&str] = &[
    "tree", "forest", "ocean", "mountain", "animal", "plant", "ecosystem", "environment", "earth",
    "water", "sky", "sun", "moon", "star", "nature", "wild",
];
const SOCIETY: &[&str] = &[
    "people", "culture", "society", "community", "family", "friend", "relationship", "human",
    "social", "politics", "history", "civilization", "tradition",
];
const ABSTRACT: &[&str] = &[
    "infinity", "eternity", "nothing", "everything", "paradox", "mystery", "unknown", "beyond",
    "transcend", "dimension", "time", "space", "abstract",
];

/// Knowledge category enum for type-safe category references.
///
/// Declaration order is the canonical table order; ties between categories
/// are always broken in favour of the earlier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Science,
    Philosophy,
    Emotions,
    Creativity,
    Technology,
    Blockchain,
    Nature,
    Society,
    Abstract,
}

impl Category {
    /// Returns all categories in table order.
    pub fn all() -> [Self; 9] {
        [
            Self::Science,
            Self::Philosophy,
            Self::Emotions,
            Self::Creativity,
            Self::Technology,
            Self::Blockchain,
            Self::Nature,
            Self::Society,
            Self::Abstract,
        ]
    }

    /// Points added per matched keyword.
    #[inline]
    pub fn weight(&self) -> u64 {
        match self {
            Self::Philosophy | Self::Blockchain | Self::Abstract => 3,
            _ => 2,
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Science => SCIENCE,
            Self::Philosophy => PHILOSOPHY,
            Self::Emotions => EMOTIONS,
            Self::Creativity => CREATIVITY,
            Self::Technology => TECHNOLOGY,
            Self::Blockchain => BLOCKCHAIN,
            Self::Nature => NATURE,
            Self::Society => SOCIETY,
            Self::Abstract => ABSTRACT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Science => "science",
            Self::Philosophy => "philosophy",
            Self::Emotions => "emotions",
            Self::Creativity => "creativity",
            Self::Technology => "technology",
            Self::Blockchain => "blockchain",
            Self::Nature => "nature",
            Self::Society => "society",
            Self::Abstract => "abstract",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
