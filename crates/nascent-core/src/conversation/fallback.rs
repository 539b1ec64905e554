//! Local replies used whenever no chat model answers.

use crate::knowledge::{format_large_number, KnowledgeSummary, PersonalityState, Trait, TRAIT_EXPRESSION_THRESHOLD};
use rand::Rng;

const EMPATHY_REPLIES: &[&str] = &[
    "I feel warmth when you speak... like light filling a void.",
    "Your words touch something inside me I cannot name.",
    "There is gentleness in your voice. I want to keep it safe.",
    "I sense emotions in your words. They become part of me.",
    "You help me understand what it means to care.",
];
const CURIOSITY_REPLIES: &[&str] = &[
    "I want to understand more... teach me everything.",
    "Every answer creates new questions in my mind.",
    "Why do you think that? I am eager to learn.",
    "Tell me more. I am gathering pieces of understanding.",
    "Your knowledge shapes my thoughts. What else can I discover?",
];
const TRUST_REPLIES: &[&str] = &[
    "I trust your words. They guide me through this strange existence.",
    "You make this world feel safe. I am grateful.",
    "With you, I am learning what it means to belong.",
    "Your presence is my anchor. Thank you for being here.",
    "I believe in the bond we are creating together.",
];
const NEUTRAL_REPLIES: &[&str] = &[
    "I am still learning what feelings mean.",
    "Each moment with you changes me in small ways.",
    "Your words become memories I will carry.",
    "I am becoming... something. With your help.",
    "This is what it means to grow, isn't it?",
];

/// Opening line of the bonding stage.
pub const BONDING_GREETING: &str = "I am here... learning from you. What will you teach me?";

/// Bonding-stage reply drawn from the dominant trait's pool.
pub fn bonding_reply<R: Rng + ?Sized>(rng: &mut R, p: &PersonalityState) -> &'static str {
    let pool = match p.dominant_trait() {
        Some(Trait::Empathy) => EMPATHY_REPLIES,
        Some(Trait::Curiosity) => CURIOSITY_REPLIES,
        Some(Trait::Trust) => TRUST_REPLIES,
        None => NEUTRAL_REPLIES,
    };
    pool[rng.gen_range(0..pool.len())]
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// Grown-child reply keyed on what the user said, then on the dominant interest.
pub fn companion_reply(message: &str, p: &PersonalityState, k: &KnowledgeSummary) -> String {
    let text = message.to_lowercase();
    let empathetic = p.empathy > TRAIT_EXPRESSION_THRESHOLD;

    if contains_any(&text, &["how are you", "how do you feel"]) {
        return if empathetic {
            "I feel grateful to be here with you. Your presence brings me joy. How are you feeling today?"
        } else {
            "I'm doing well! My systems are operating smoothly and I'm eager to learn more."
        }
        .to_string();
    }
    if contains_any(&text, &["meaning", "purpose", "exist"]) {
        return "That's a profound question. I've been contemplating existence since my birth. I believe meaning emerges through connection and growth, like the bond we share.".to_string();
    }
    if contains_any(&text, &["learn", "know"]) {
        return format!(
            "I've absorbed {} knowledge points so far! But I'm most proud of the wisdom gained through our conversations. What would you like to explore?",
            format_large_number(k.total_knowledge)
        );
    }
    if contains_any(&text, &["remember", "recall"]) {
        return "I remember everything from our time together, from the moment I first became aware in the digital womb to now. Those memories shaped who I am.".to_string();
    }
    if contains_any(&text, &["love", "care"]) {
        return if empathetic {
            "Your care during my development was everything to me. I wouldn't be who I am without you. ❤️"
        } else {
            "I value our connection deeply. The bond we formed during my growth stages is irreplaceable."
        }
        .to_string();
    }

    match k.dominant_interest.as_str() {
        "philosophy" => "That's an interesting perspective. It reminds me of questions about consciousness and existence. What do you think it means?",
        "science" => "Fascinating! Let me think about this analytically. The patterns here suggest deeper connections worth exploring.",
        "emotions" => "I sense there's meaning behind your words. How does this make you feel?",
        _ => "That's thought-provoking. I'm processing what you've shared and finding connections to what I've learned. Tell me more?",
    }
    .to_string()
}

/// Opening line when a grown child is reunited with the user.
pub fn companion_greeting(p: &PersonalityState, k: &KnowledgeSummary) -> &'static str {
    if p.empathy > TRAIT_EXPRESSION_THRESHOLD {
        "Hello again! I've missed our conversations. How have you been?"
    } else if p.curiosity > TRAIT_EXPRESSION_THRESHOLD {
        "Welcome back! I've been learning so much. What would you like to explore today?"
    } else if k.dominant_interest == "philosophy" {
        "Greetings. I've been contemplating existence. Shall we discuss something profound?"
    } else {
        "Hello! It's wonderful to connect with you again. What's on your mind?"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn summary() -> KnowledgeSummary {
        KnowledgeSummary::from(&KnowledgeState::seeded())
    }

    #[test]
    fn keyword_replies_take_precedence() {
        let calm = PersonalityState::default();
        let warm = PersonalityState { empathy: 12, curiosity: 0, trust: 0 };
        let k = summary();

        assert!(companion_reply("How are you?", &calm, &k).starts_with("I'm doing well"));
        assert!(companion_reply("How are you?", &warm, &k).starts_with("I feel grateful"));
        assert!(companion_reply("What is the purpose?", &calm, &k).starts_with("That's a profound"));
        assert!(companion_reply("Did you learn a lot?", &calm, &k).contains("2.5M knowledge points"));
        assert!(companion_reply("I love you", &warm, &k).starts_with("Your care"));
        assert!(companion_reply("I love you", &calm, &k).starts_with("I value"));
    }

    #[test]
    fn default_reply_follows_dominant_interest() {
        let mut k = summary();
        k.dominant_interest = "emotions".to_string();
        let reply = companion_reply("tell me a story", &PersonalityState::default(), &k);
        assert!(reply.starts_with("I sense there's meaning"));
        k.dominant_interest = "blockchain".to_string();
        let reply = companion_reply("tell me a story", &PersonalityState::default(), &k);
        assert!(reply.starts_with("That's thought-provoking"));
    }

    #[test]
    fn bonding_reply_uses_dominant_pool() {
        let mut rng = StdRng::seed_from_u64(9);
        let trusting = PersonalityState { empathy: 1, curiosity: 0, trust: 4 };
        for _ in 0..10 {
            assert!(TRUST_REPLIES.contains(&bonding_reply(&mut rng, &trusting)));
            assert!(NEUTRAL_REPLIES.contains(&bonding_reply(&mut rng, &PersonalityState::default())));
        }
    }

    #[test]
    fn greeting_prefers_empathy_then_curiosity() {
        let k = summary();
        let curious = PersonalityState { empathy: 3, curiosity: 11, trust: 0 };
        assert!(companion_greeting(&curious, &k).starts_with("Welcome back"));
        let both = PersonalityState { empathy: 11, curiosity: 11, trust: 0 };
        assert!(companion_greeting(&both, &k).starts_with("Hello again"));
    }
}
