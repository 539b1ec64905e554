//! Shared gateway state: the live mind, its collaborators and the learning
//! event fan-out.

use nascent_core::{
    ChatCompletion, Conversation, ConversationMode, CoreConfig, DnaRepository, KnowledgeState,
    LearningEvent, LiveMind, MultiModelLearn, ProgressFn, SchedulerHandle, SchedulerOptions,
    ScoringEngine, SnapshotStore,
};
use nascent_skills::OpenRouterClient;
use std::sync::Arc;
use tokio::sync::broadcast;

const LEARNING_EVENTS_CAPACITY: usize = 256;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<CoreConfig>,
    /// Chat turns and learning cycles both fold into this.
    pub(crate) mind: LiveMind,
    pub(crate) conversation: Arc<Conversation>,
    pub(crate) scheduler: SchedulerHandle,
    pub(crate) dna: Arc<DnaRepository>,
    pub(crate) model_available: bool,
    pub(crate) learning_tx: broadcast::Sender<LearningEvent>,
}

impl AppState {
    /// Wires the core around `store` and `dna`. With no client (or a client in
    /// mock mode) chat and learning run on local fallbacks.
    pub(crate) fn build(
        config: CoreConfig,
        store: SnapshotStore,
        dna: DnaRepository,
        client: Option<Arc<OpenRouterClient>>,
    ) -> Self {
        let model_available = client.as_ref().is_some_and(|c| c.is_available());
        let chat = client.clone().map(|c| c as Arc<dyn ChatCompletion>);
        let learner = client.map(|c| c as Arc<dyn MultiModelLearn>);
        Self::assemble(config, store, dna, chat, learner, model_available)
    }

    pub(crate) fn assemble(
        config: CoreConfig,
        store: SnapshotStore,
        dna: DnaRepository,
        chat: Option<Arc<dyn ChatCompletion>>,
        learner: Option<Arc<dyn MultiModelLearn>>,
        model_available: bool,
    ) -> Self {
        let mind = LiveMind::load(store.clone());
        let conversation = Conversation::new(mind.clone(), chat, ConversationMode::Companion);
        let scheduler = SchedulerHandle::with_options(
            ScoringEngine::new(store),
            learner,
            SchedulerOptions {
                mind: Some(mind.clone()),
                ..SchedulerOptions::default()
            },
        );
        let (learning_tx, _) = broadcast::channel(LEARNING_EVENTS_CAPACITY);

        Self {
            config: Arc::new(config),
            mind,
            conversation: Arc::new(conversation),
            scheduler,
            dna: Arc::new(dna),
            model_available,
            learning_tx,
        }
    }

    pub(crate) fn knowledge(&self) -> KnowledgeState {
        self.mind.knowledge()
    }

    /// Forwards scheduler progress to SSE subscribers.
    pub(crate) fn progress_fn(&self) -> ProgressFn {
        let tx = self.learning_tx.clone();
        Arc::new(move |event| {
            // no subscribers is fine
            let _ = tx.send(event);
        })
    }

    /// Starts the scheduler at `speed` from the current knowledge.
    pub(crate) fn start_learning(&self, speed: nascent_core::LearningSpeed) -> bool {
        self.scheduler
            .start(Some(self.progress_fn()), self.knowledge(), None, speed)
    }
}
