//! Chat turns between the user and the AI child.
//!
//! Each turn absorbs personality from the user message, scores both sides of
//! the exchange and persists the results. Turns on one [`Conversation`] are
//! serialized; a second `send` waits for the first to finish. Both scoring
//! steps fold into the [`LiveMind`] as it stands at that moment, so learning
//! cycles finishing during the model call are kept.

mod fallback;
mod prompt;

pub use fallback::{bonding_reply, companion_greeting, companion_reply, BONDING_GREETING};
pub use prompt::{bonding_prompt, companion_prompt};

use crate::knowledge::{
    KnowledgeState, KnowledgeSummary, LiveMind, PersonalityState, PersonalityTracker, ScoringEngine,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Turns kept and sent to the chat model as context.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Chat model seam. `None` means unavailable and triggers the local fallback.
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    async fn complete(&self, prompt: &str, history: &[ChatTurn], system_prompt: &str) -> Option<String>;
}

/// Which stage of the child's life the conversation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    /// Personality still forming; replies come from trait pools.
    Bonding,
    /// Grown child with knowledge-aware replies.
    #[default]
    Companion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub source: ReplySource,
    pub summary: KnowledgeSummary,
    pub personality: PersonalityState,
    /// Knowledge after scoring both turns.
    #[serde(skip)]
    pub knowledge: KnowledgeState,
}

struct Session {
    history: VecDeque<ChatTurn>,
    rng: StdRng,
}

impl Session {
    fn push(&mut self, role: Role, text: &str) {
        self.history.push_back(ChatTurn { role, text: text.to_string() });
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

pub struct Conversation {
    mind: LiveMind,
    engine: ScoringEngine,
    tracker: PersonalityTracker,
    model: Option<Arc<dyn ChatCompletion>>,
    mode: ConversationMode,
    session: Mutex<Session>,
}

impl Conversation {
    pub fn new(mind: LiveMind, model: Option<Arc<dyn ChatCompletion>>, mode: ConversationMode) -> Self {
        let store = mind.store().clone();
        Self {
            mind,
            engine: ScoringEngine::new(store.clone()),
            tracker: PersonalityTracker::new(store),
            model,
            mode,
            session: Mutex::new(Session {
                history: VecDeque::with_capacity(HISTORY_LIMIT + 1),
                rng: StdRng::from_entropy(),
            }),
        }
    }

    pub fn mode(&self) -> ConversationMode {
        self.mode
    }

    pub fn mind(&self) -> &LiveMind {
        &self.mind
    }

    /// Opening line for a fresh session.
    pub fn greeting(&self) -> String {
        match self.mode {
            ConversationMode::Bonding => BONDING_GREETING.to_string(),
            ConversationMode::Companion => {
                let mind = self.mind.snapshot();
                companion_greeting(&mind.personality, &KnowledgeSummary::from(&mind.knowledge)).to_string()
            }
        }
    }

    pub async fn history(&self) -> Vec<ChatTurn> {
        self.session.lock().await.history.iter().cloned().collect()
    }

    /// Runs one turn. Returns `None` for blank input.
    pub async fn send(&self, user_message: &str) -> Option<ChatReply> {
        let message = user_message.trim();
        if message.is_empty() {
            return None;
        }
        let mut session = self.session.lock().await;

        let (personality, summary) = self.mind.transact(|m| {
            m.personality = self.tracker.absorb(message, &m.personality);
            m.knowledge = self.engine.analyze(message, true, &m.knowledge);
            (m.personality, KnowledgeSummary::from(&m.knowledge))
        });

        let system_prompt = match self.mode {
            ConversationMode::Bonding => bonding_prompt(&personality),
            ConversationMode::Companion => companion_prompt(&personality, &summary),
        };
        let history: Vec<ChatTurn> = session.history.iter().cloned().collect();
        let from_model = match &self.model {
            Some(model) => model
                .complete(message, &history, &system_prompt)
                .await
                .filter(|r| !r.trim().is_empty()),
            None => None,
        };

        let (reply, source) = match from_model {
            Some(reply) => (reply, ReplySource::Model),
            None => {
                tracing::debug!(mode = ?self.mode, "Chat model unavailable; using fallback reply");
                let reply = match self.mode {
                    ConversationMode::Bonding => bonding_reply(&mut session.rng, &personality).to_string(),
                    ConversationMode::Companion => companion_reply(message, &personality, &summary),
                };
                (reply, ReplySource::Fallback)
            }
        };

        let (knowledge, personality) = self.mind.transact(|m| {
            m.knowledge = self.engine.analyze(&reply, false, &m.knowledge);
            (m.knowledge.clone(), m.personality)
        });
        session.push(Role::User, message);
        session.push(Role::Assistant, &reply);

        tracing::info!(
            source = ?source,
            knowledge = knowledge.knowledge_points,
            "Chat turn complete"
        );
        Some(ChatReply {
            reply,
            source,
            summary: KnowledgeSummary::from(&knowledge),
            personality,
            knowledge,
        })
    }

    /// Forgets the chat history (snapshots are untouched).
    pub async fn reset(&self) {
        self.session.lock().await.history.clear();
    }
}
