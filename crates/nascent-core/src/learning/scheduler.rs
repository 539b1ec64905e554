//! SchedulerHandle: timer-driven learning cycles over a [`ScoringEngine`].
//!
//! At most one cycle runs at a time per handle. `stop()` aborts the timer
//! task and bumps a cancellation epoch; a cycle that observes a newer epoch
//! returns before touching any state.
//!
//! A cycle gathers its insight first and only then folds it into the state
//! as it stands after the model call: the attached [`LiveMind`] when there
//! is one, otherwise the latest synced state.

use super::topics::LearningDomain;
use super::{MultiModelLearn, MultiModelLearning};
use crate::knowledge::{KnowledgeState, LiveMind, ScoringEngine};
use crate::shared::LearningSpeed;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Context handed to the multi-model collaborator on every cycle.
pub const LEARNING_CONTEXT: &str =
    "You are helping an AI child learn. Provide one profound insight in 1-2 sentences.";
/// Number of recent topics remembered for repeat avoidance.
pub const RECENT_TOPIC_WINDOW: usize = 20;

const BLOCKCHAIN_PRIORITY: f64 = 0.4;
const LEAST_EXPLORED_BIAS: f64 = 0.3;
const BONUS_PER_MODEL: u64 = 1500;
const INTERNAL_BONUS: u64 = 1200;
const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

pub type ProgressFn = Arc<dyn Fn(LearningEvent) + Send + Sync>;
pub type StateSink = Arc<dyn Fn(KnowledgeState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Exploring,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    MultiModel,
    Internal,
}

/// Progress notifications of a learning cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningEvent {
    Thinking {
        category: LearningDomain,
        topic: String,
        status: CycleStatus,
    },
    #[serde(rename_all = "camelCase")]
    Learned {
        category: LearningDomain,
        topic: String,
        content: String,
        /// Scored points plus the autonomous bonus.
        points: u64,
        source: InsightSource,
        models_used: usize,
        total_knowledge: u64,
        status: CycleStatus,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub sessions_completed: u64,
    pub topics_explored: u64,
    pub models_queried: u64,
    pub last_activity: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_paused: bool,
    pub current_topic: Option<String>,
    pub recent_topics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Fixed RNG seed for reproducible domain and topic picks.
    pub seed: Option<u64>,
    /// Ceiling on one multi-model call.
    pub call_timeout: Duration,
    /// Shared state cycles fold into, alongside chat turns.
    pub mind: Option<LiveMind>,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            seed: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            mind: None,
        }
    }
}

struct Inner {
    engine: ScoringEngine,
    learner: Option<Arc<dyn MultiModelLearn>>,
    call_timeout: Duration,
    mind: Option<LiveMind>,
    rng: Mutex<StdRng>,
    recent: Mutex<VecDeque<&'static str>>,
    current_topic: Mutex<Option<&'static str>>,
    /// State the next tick folds into; `Some` exactly while running.
    latest: Mutex<Option<KnowledgeState>>,
    /// Held while `running` and the timer handle change together.
    timer: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
    enabled: AtomicBool,
    in_flight: AtomicBool,
    epoch: watch::Sender<u64>,
}

/// What one cycle learned, before it is scored.
struct Insight {
    domain: LearningDomain,
    topic: &'static str,
    content: String,
    models_used: usize,
    source: InsightSource,
}

/// Resets the in-flight flag when a cycle ends, even if it is aborted.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resolves once the epoch moves past `started`.
async fn cancelled(mut rx: watch::Receiver<u64>, started: u64) {
    loop {
        if *rx.borrow_and_update() != started {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Domain with the fewest topics in the recent window; earlier domain wins ties.
fn least_explored(recent: &VecDeque<&'static str>) -> LearningDomain {
    let count = |d: LearningDomain| recent.iter().filter(|t| d.topics().contains(*t)).count();
    let mut best = LearningDomain::Philosophy;
    let mut best_count = usize::MAX;
    for d in LearningDomain::all() {
        let c = count(d);
        if c < best_count {
            best = d;
            best_count = c;
        }
    }
    best
}

fn pick_domain<R: Rng + ?Sized>(rng: &mut R, recent: &VecDeque<&'static str>) -> LearningDomain {
    if rng.gen_bool(BLOCKCHAIN_PRIORITY) {
        return LearningDomain::Blockchain;
    }
    if rng.gen_bool(LEAST_EXPLORED_BIAS) {
        return least_explored(recent);
    }
    let all = LearningDomain::all();
    all[rng.gen_range(0..all.len())]
}

/// Picks a topic of `domain`, avoiding the recent window when the domain
/// still has unexplored alternatives, and records it.
fn pick_topic<R: Rng + ?Sized>(
    rng: &mut R,
    recent: &mut VecDeque<&'static str>,
    domain: LearningDomain,
) -> &'static str {
    let topics = domain.topics();
    let mut topic = topics[rng.gen_range(0..topics.len())];
    if recent.contains(&topic) {
        let fresh: Vec<&'static str> = topics
            .iter()
            .copied()
            .filter(|t| !recent.contains(t))
            .collect();
        if !fresh.is_empty() {
            topic = fresh[rng.gen_range(0..fresh.len())];
        }
    }
    recent.push_back(topic);
    while recent.len() > RECENT_TOPIC_WINDOW {
        recent.pop_front();
    }
    topic
}

impl Inner {
    fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    fn current_epoch(&self) -> u64 {
        *self.epoch.borrow()
    }

    async fn ask_models(&self, topic: &str, started: u64) -> Result<Option<MultiModelLearning>, ()> {
        let Some(learner) = &self.learner else {
            return Ok(None);
        };
        tokio::select! {
            res = tokio::time::timeout(self.call_timeout, learner.learn(topic, LEARNING_CONTEXT)) => {
                match res {
                    Ok(learning) => Ok(learning),
                    Err(_) => {
                        tracing::warn!(target: "nascent::learning", topic, "Multi-model learning timed out");
                        Ok(None)
                    }
                }
            }
            _ = cancelled(self.epoch.subscribe(), started) => Err(()),
        }
    }

    /// Scores `insight` on top of `base`, adds the autonomous bonus and persists.
    fn apply(&self, insight: &Insight, base: &KnowledgeState) -> (KnowledgeState, u64) {
        let (mut next, analysis) = self.engine.analyze_detailed(
            &format!("{} {}", insight.topic, insight.content),
            false,
            base,
        );
        let bonus = if insight.models_used > 0 {
            BONUS_PER_MODEL * insight.models_used as u64
        } else {
            INTERNAL_BONUS
        };
        next.knowledge_points += bonus;
        let stats = &mut next.autonomous_learning;
        stats.sessions_completed += 1;
        stats.topics_explored += 1;
        stats.models_queried += insight.models_used as u64;
        stats.last_activity = Some(Utc::now());
        self.engine.store().save_knowledge(&next);
        (next, analysis.points + bonus)
    }

    /// Folds `insight` into the current state. `given` is the base when no
    /// mind is attached and the scheduler is not running.
    fn fold(
        &self,
        insight: &Insight,
        given: Option<&KnowledgeState>,
        started: u64,
    ) -> Option<(KnowledgeState, u64)> {
        if let Some(mind) = &self.mind {
            return mind.transact(|m| {
                if self.current_epoch() != started {
                    return None;
                }
                let (next, points) = self.apply(insight, &m.knowledge);
                m.knowledge = next.clone();
                Some((next, points))
            });
        }
        let mut latest = lock(&self.latest);
        if self.current_epoch() != started {
            return None;
        }
        let base = match (latest.as_ref(), given) {
            (Some(current), _) => current.clone(),
            (None, Some(given)) => given.clone(),
            (None, None) => return None,
        };
        let (next, points) = self.apply(insight, &base);
        if latest.is_some() {
            *latest = Some(next.clone());
        }
        Some((next, points))
    }

    /// One learning cycle. `None` when cancelled; no state is then touched.
    async fn cycle(
        &self,
        on_progress: Option<&ProgressFn>,
        given: Option<&KnowledgeState>,
        set_state: Option<&StateSink>,
        started: u64,
    ) -> Option<KnowledgeState> {
        let (domain, topic) = {
            let mut rng = lock(&self.rng);
            let mut recent = lock(&self.recent);
            let domain = pick_domain(&mut *rng, &recent);
            let topic = pick_topic(&mut *rng, &mut recent, domain);
            (domain, topic)
        };
        *lock(&self.current_topic) = Some(topic);

        tracing::info!(target: "nascent::learning", %domain, topic, "AI child is thinking");
        if let Some(cb) = on_progress {
            cb(LearningEvent::Thinking {
                category: domain,
                topic: topic.to_string(),
                status: CycleStatus::Exploring,
            });
        }

        let learned = match self.ask_models(topic, started).await {
            Ok(learned) => learned,
            Err(()) => {
                tracing::info!(target: "nascent::learning", topic, "Learning cycle cancelled");
                return None;
            }
        };

        let insight = match learned.filter(|l| !l.perspectives.is_empty()) {
            Some(l) => {
                let joined = l
                    .perspectives
                    .iter()
                    .map(|p| p.insight.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                tracing::info!(target: "nascent::learning", models = l.perspectives.len(), "Learned from models");
                Insight {
                    domain,
                    topic,
                    content: joined,
                    models_used: l.perspectives.len(),
                    source: InsightSource::MultiModel,
                }
            }
            None => {
                let nuggets = domain.nuggets();
                let nugget = nuggets[lock(&self.rng).gen_range(0..nuggets.len())];
                tracing::debug!(target: "nascent::learning", %domain, "Using internal knowledge");
                Insight {
                    domain,
                    topic,
                    content: nugget.to_string(),
                    models_used: 0,
                    source: InsightSource::Internal,
                }
            }
        };

        let Some((next, points)) = self.fold(&insight, given, started) else {
            tracing::info!(target: "nascent::learning", topic, "Learning cycle cancelled");
            return None;
        };
        tracing::info!(
            target: "nascent::learning",
            topic,
            points,
            total = next.knowledge_points,
            "Learned topic"
        );
        if let Some(cb) = on_progress {
            cb(LearningEvent::Learned {
                category: insight.domain,
                topic: insight.topic.to_string(),
                content: insight.content,
                points,
                source: insight.source,
                models_used: insight.models_used,
                total_knowledge: next.knowledge_points,
                status: CycleStatus::Completed,
            });
        }
        if let Some(sink) = set_state {
            sink(next.clone());
        }
        Some(next)
    }

    /// Runs a cycle unless one is already in flight.
    async fn guarded_cycle(
        &self,
        on_progress: Option<&ProgressFn>,
        given: Option<&KnowledgeState>,
        set_state: Option<&StateSink>,
        started: u64,
    ) -> Option<KnowledgeState> {
        let _guard = self.try_begin()?;
        self.cycle(on_progress, given, set_state, started).await
    }
}

/// Handle to one autonomous learner. Clones share the same scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Arc<Inner>,
}

impl SchedulerHandle {
    pub fn new(engine: ScoringEngine, learner: Option<Arc<dyn MultiModelLearn>>) -> Self {
        Self::with_options(engine, learner, SchedulerOptions::default())
    }

    pub fn with_options(
        engine: ScoringEngine,
        learner: Option<Arc<dyn MultiModelLearn>>,
        options: SchedulerOptions,
    ) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (epoch, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                engine,
                learner,
                call_timeout: options.call_timeout,
                mind: options.mind,
                rng: Mutex::new(rng),
                recent: Mutex::new(VecDeque::with_capacity(RECENT_TOPIC_WINDOW + 1)),
                current_topic: Mutex::new(None),
                latest: Mutex::new(None),
                timer: Mutex::new(None),
                running: AtomicBool::new(false),
                enabled: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                epoch,
            }),
        }
    }

    /// Starts learning at the cadence of `speed`: one cycle now, then one per
    /// period. Returns `false` (and does nothing) if already running.
    pub fn start(
        &self,
        on_progress: Option<ProgressFn>,
        initial_state: KnowledgeState,
        set_state: Option<StateSink>,
        speed: LearningSpeed,
    ) -> bool {
        self.start_every(on_progress, initial_state, set_state, speed.period())
    }

    pub(crate) fn start_every(
        &self,
        on_progress: Option<ProgressFn>,
        initial_state: KnowledgeState,
        set_state: Option<StateSink>,
        period: Duration,
    ) -> bool {
        let inner = &self.inner;
        let mut timer = lock(&inner.timer);
        if inner.running.load(Ordering::Acquire) {
            tracing::warn!(target: "nascent::learning", "Autonomous learning already active");
            return false;
        }
        inner.running.store(true, Ordering::Release);
        inner.enabled.store(true, Ordering::Release);
        *lock(&inner.latest) = Some(initial_state);
        let started = inner.current_epoch();

        tracing::info!(
            target: "nascent::learning",
            period_secs = period.as_secs_f64(),
            "Autonomous learning started"
        );

        let task_inner = Arc::clone(inner);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !task_inner.enabled.load(Ordering::Acquire) {
                    continue;
                }
                if lock(&task_inner.latest).is_none() {
                    break;
                }
                if task_inner
                    .guarded_cycle(on_progress.as_ref(), None, set_state.as_ref(), started)
                    .await
                    .is_none()
                {
                    tracing::debug!(target: "nascent::learning", "Tick skipped");
                }
            }
        });
        *timer = Some(handle);
        true
    }

    /// Stops the timer and cancels any in-flight cycle. Idempotent.
    pub fn stop(&self) {
        let inner = &self.inner;
        let mut timer = lock(&inner.timer);
        inner.epoch.send_modify(|e| *e += 1);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        *lock(&inner.latest) = None;
        inner.enabled.store(false, Ordering::Release);
        if inner.running.swap(false, Ordering::AcqRel) {
            tracing::info!(target: "nascent::learning", "Autonomous learning stopped");
        }
    }

    /// Pauses or resumes ticks without tearing down the timer; returns whether
    /// ticks are now enabled. Always `false` while stopped.
    pub fn toggle(&self) -> bool {
        let _timer = lock(&self.inner.timer);
        if !self.inner.running.load(Ordering::Acquire) {
            tracing::debug!(target: "nascent::learning", "Learning not running, toggle ignored");
            return false;
        }
        let enabled = !self.inner.enabled.fetch_xor(true, Ordering::AcqRel);
        if enabled {
            tracing::info!(target: "nascent::learning", "Learning resumed");
        } else {
            tracing::info!(target: "nascent::learning", "Learning paused");
        }
        enabled
    }

    /// Runs one cycle now. The insight lands on the attached mind, else on the
    /// running state, else on `state`. Returns `state` unchanged if a cycle is
    /// already in flight or the cycle is cancelled.
    pub async fn trigger_once(
        &self,
        on_progress: Option<ProgressFn>,
        state: KnowledgeState,
        set_state: Option<StateSink>,
    ) -> KnowledgeState {
        let started = self.inner.current_epoch();
        match self
            .inner
            .guarded_cycle(on_progress.as_ref(), Some(&state), set_state.as_ref(), started)
            .await
        {
            Some(next) => next,
            None => {
                tracing::warn!(target: "nascent::learning", "Already learning, trigger ignored");
                state
            }
        }
    }

    /// Replaces the state the next tick folds into (e.g. after a chat turn)
    /// when no mind is attached. No effect while stopped.
    pub fn sync_state(&self, state: &KnowledgeState) {
        if self.inner.running.load(Ordering::Acquire) {
            let mut latest = lock(&self.inner.latest);
            if latest.is_some() {
                *latest = Some(state.clone());
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::Acquire)
    }

    pub fn stats(&self, state: &KnowledgeState) -> LearningStats {
        let inner = &self.inner;
        let recent = lock(&inner.recent);
        let skip = recent.len().saturating_sub(5);
        let auto = &state.autonomous_learning;
        LearningStats {
            sessions_completed: auto.sessions_completed,
            topics_explored: auto.topics_explored,
            models_queried: auto.models_queried,
            last_activity: auto.last_activity,
            is_active: inner.running.load(Ordering::Acquire) || inner.in_flight.load(Ordering::Acquire),
            is_paused: !inner.enabled.load(Ordering::Acquire),
            current_topic: lock(&inner.current_topic).map(str::to_string),
            recent_topics: recent.iter().skip(skip).map(|t| t.to_string()).collect(),
        }
    }
}
