//! Axum-based API gateway for the AI child. Config-driven via CoreConfig.

mod handlers;
mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use handlers::{dna, learning, mind};
use nascent_core::{CoreConfig, DnaRepository, SledKeyValue, SnapshotStore, MAX_AVATAR_BYTES};
use nascent_skills::{LlmMode, OpenRouterClient};
use state::AppState;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Pre-flight check: both stores open and the port is free.
fn run_verify() -> Result<(), String> {
    let config = CoreConfig::load().map_err(|e| format!("Config load failed: {}", e))?;

    print!("Checking snapshot store... ");
    let kv = SledKeyValue::open_path(config.snapshot_path())
        .map_err(|e| format!("snapshot store LOCKED or inaccessible: {}", e))?;
    drop(kv);
    println!("OK");

    print!("Checking DNA repository... ");
    let repo = DnaRepository::open_path(config.dna_path())
        .map_err(|e| format!("DNA repository LOCKED or inaccessible: {}", e))?;
    let stats = repo.collective_stats().map_err(|e| format!("DNA repository unreadable: {}", e))?;
    println!("OK ({} children)", stats.total_children);

    let port = config.port;
    print!("Checking port {}... ", port);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    match std::net::TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            println!("OK (available)");
        }
        Err(e) => return Err(format!("Port {} BLOCKED: {}", port, e)),
    }

    println!("\nAll systems GO. Ready to start gateway.");
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[nascent-gateway] .env not loaded: {} (using system environment)", e);
    }

    if std::env::args().any(|a| a == "--verify") {
        match run_verify() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("PRE-FLIGHT FAILED: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("Gateway failed: {}", e);
        eprintln!("[nascent-gateway] {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CoreConfig::load()?;
    let kv = SledKeyValue::open_path(config.snapshot_path())?;
    let store = SnapshotStore::new(Arc::new(kv));
    let dna = DnaRepository::open_path(config.dna_path())?;

    let client = Arc::new(OpenRouterClient::from_env(LlmMode::parse(&config.llm_mode)));
    if config.is_live() && !client.is_available() {
        tracing::warn!("LLM mode is live but OPENROUTER_API_KEY is not configured; using local fallbacks");
    }
    tracing::info!(mode = ?client.mode(), available = client.is_available(), "Model client ready");

    let autostart = config.autostart_learning;
    let speed = config.learning_speed;
    let port = config.port;
    let app_name = config.app_name.clone();

    let state = AppState::build(config, store, dna, Some(client));
    if autostart {
        state.start_learning(speed);
    }
    let scheduler = state.scheduler.clone();
    let app = build_app(state);

    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("{} listening on {}", app_name, addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    scheduler.stop();
    Ok(())
}

fn build_app(state: AppState) -> Router {
    // Local UIs run on 3000-3099; sibling services on 8001-8099.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &axum::http::HeaderValue, _| {
            let s = origin.to_str().unwrap_or("");
            let port = s
                .rsplit(':')
                .next()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(0);
            (3000..=3099).contains(&port) || (8001..=8099).contains(&port)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::PUT, Method::DELETE])
        .allow_headers(tower_http::cors::Any)
        .expose_headers(tower_http::cors::Any);

    Router::new()
        .route("/v1/status", get(mind::status))
        .route("/v1/knowledge", get(mind::knowledge))
        .route("/v1/knowledge/achievements", get(mind::knowledge_achievements))
        .route("/v1/personality", get(mind::personality))
        .route("/v1/chat", post(mind::chat))
        .route("/v1/restart", post(mind::restart))
        .route("/v1/learning/start", post(learning::start))
        .route("/v1/learning/stop", post(learning::stop))
        .route("/v1/learning/toggle", post(learning::toggle))
        .route("/v1/learning/trigger", post(learning::trigger))
        .route("/v1/learning/stats", get(learning::stats))
        .route("/v1/learning/events", get(learning::events))
        .route("/v1/dna", post(dna::create).get(dna::list))
        .route("/v1/dna/stats", get(dna::stats))
        .route("/v1/dna/:id", get(dna::get_one))
        .route(
            "/v1/dna/:id/avatar",
            put(dna::upload_avatar)
                .delete(dna::delete_avatar)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 1)),
        )
        .route("/v1/avatars/:file", get(dna::avatar_file))
        .with_state(state)
        .layer(cors)
}
