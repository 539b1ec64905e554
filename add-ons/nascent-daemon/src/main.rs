//! Headless autonomous learner: keeps the AI child studying without the gateway.
//!
//! `--once` runs a single cycle and prints the resulting knowledge summary.

use nascent_core::{
    CoreConfig, KnowledgeSummary, LearningEvent, LearningSpeed, ProgressFn, SchedulerHandle,
    ScoringEngine, SledKeyValue, SnapshotStore,
};
use nascent_skills::{LlmMode, OpenRouterClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn log_progress() -> ProgressFn {
    Arc::new(|event| match event {
        LearningEvent::Thinking { category, topic, .. } => {
            tracing::info!(target: "nascent::daemon", %category, topic, "Thinking");
        }
        LearningEvent::Learned { topic, points, models_used, total_knowledge, .. } => {
            tracing::info!(
                target: "nascent::daemon",
                topic,
                points,
                models_used,
                total_knowledge,
                "Learned"
            );
        }
    })
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[nascent-daemon] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let once = std::env::args().any(|a| a == "--once");
    let speed = std::env::args()
        .skip_while(|a| a != "--speed")
        .nth(1)
        .map(|s| LearningSpeed::parse_lenient(&s));

    if let Err(e) = run(once, speed).await {
        tracing::error!(target: "nascent::daemon", "Daemon failed: {}", e);
        eprintln!("[nascent-daemon] {}", e);
        std::process::exit(1);
    }
}

async fn run(once: bool, speed: Option<LearningSpeed>) -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::load()?;
    let kv = SledKeyValue::open_path(config.snapshot_path())?;
    let store = SnapshotStore::new(Arc::new(kv));
    let client = Arc::new(OpenRouterClient::from_env(LlmMode::parse(&config.llm_mode)));
    tracing::info!(
        target: "nascent::daemon",
        mode = ?client.mode(),
        available = client.is_available(),
        "Model client ready"
    );

    let scheduler = SchedulerHandle::new(
        ScoringEngine::new(store.clone()),
        Some(client as Arc<dyn nascent_core::MultiModelLearn>),
    );
    let knowledge = store.load_knowledge();

    if once {
        let next = scheduler.trigger_once(Some(log_progress()), knowledge, None).await;
        println!("{}", serde_json::to_string_pretty(&KnowledgeSummary::from(&next))?);
        return Ok(());
    }

    let speed = speed.unwrap_or(config.learning_speed);
    scheduler.start(Some(log_progress()), knowledge, None, speed);
    tracing::info!(target: "nascent::daemon", speed = speed.as_str(), "Daemon running; Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    scheduler.stop();
    let stats = scheduler.stats(&store.load_knowledge());
    tracing::info!(
        target: "nascent::daemon",
        sessions = stats.sessions_completed,
        topics = stats.topics_explored,
        "Daemon stopped"
    );
    Ok(())
}
