//! Status, knowledge, personality, chat and restart.

use super::ApiError;
use crate::state::AppState;
use axum::extract::{Json, State};
use nascent_core::{achievements, Achievement, KnowledgeSummary};
use serde::Deserialize;

/// GET /v1/status – app identity and runtime mode.
pub(crate) async fn status(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let greeting = state.conversation.greeting();
    axum::Json(serde_json::json!({
        "app_name": state.config.app_name,
        "port": state.config.port,
        "llm_mode": state.config.llm_mode,
        "model_available": state.model_available,
        "conversation_mode": state.conversation.mode(),
        "learning_speed": state.config.learning_speed,
        "learning_active": state.scheduler.is_running(),
        "greeting": greeting,
    }))
}

/// GET /v1/knowledge
pub(crate) async fn knowledge(State(state): State<AppState>) -> axum::Json<KnowledgeSummary> {
    axum::Json(KnowledgeSummary::from(&state.knowledge()))
}

/// GET /v1/knowledge/achievements
pub(crate) async fn knowledge_achievements(State(state): State<AppState>) -> axum::Json<Vec<Achievement>> {
    axum::Json(achievements(&state.knowledge()))
}

/// GET /v1/personality
pub(crate) async fn personality(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let p = state.mind.personality();
    axum::Json(serde_json::json!({
        "empathy": p.empathy,
        "curiosity": p.curiosity,
        "trust": p.trust,
        "total": p.total(),
        "dominantTrait": p.dominant_trait(),
        "description": p.description(),
        "summary": p.summary(),
    }))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) message: String,
}

/// POST /v1/chat – one conversation turn; both sides are scored.
pub(crate) async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<axum::Json<nascent_core::ChatReply>, ApiError> {
    let reply = state
        .conversation
        .send(&req.message)
        .await
        .ok_or_else(|| ApiError::bad_request("message must not be empty"))?;
    Ok(axum::Json(reply))
}

/// POST /v1/restart – stops learning and forgets both snapshots.
pub(crate) async fn restart(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    state.scheduler.stop();
    state.mind.restart();
    state.conversation.reset().await;
    tracing::info!("AI child restarted");
    axum::Json(serde_json::json!({ "status": "restarted" }))
}
