//! Autonomous learning control and the progress event stream.

use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use nascent_core::{KnowledgeSummary, LearningSpeed, LearningStats};
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StartRequest {
    pub(crate) speed: Option<String>,
}

/// POST /v1/learning/start – body `{"speed": "slow" | "normal" | "fast"}` is optional.
pub(crate) async fn start(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let req: StartRequest = serde_json::from_slice(&body).unwrap_or_default();
    let speed = req
        .speed
        .as_deref()
        .map(LearningSpeed::parse_lenient)
        .unwrap_or(state.config.learning_speed);
    let started = state.start_learning(speed);
    let status = if started { StatusCode::OK } else { StatusCode::CONFLICT };
    (
        status,
        axum::Json(serde_json::json!({ "started": started, "speed": speed })),
    )
}

/// POST /v1/learning/stop
pub(crate) async fn stop(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    state.scheduler.stop();
    axum::Json(serde_json::json!({ "stopped": true }))
}

/// POST /v1/learning/toggle – pause or resume ticks.
pub(crate) async fn toggle(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    let enabled = state.scheduler.toggle();
    axum::Json(serde_json::json!({ "enabled": enabled }))
}

/// POST /v1/learning/trigger – one cycle now; returns the resulting summary.
pub(crate) async fn trigger(State(state): State<AppState>) -> axum::Json<KnowledgeSummary> {
    let next = state
        .scheduler
        .trigger_once(Some(state.progress_fn()), state.knowledge(), None)
        .await;
    axum::Json(KnowledgeSummary::from(&next))
}

/// GET /v1/learning/stats
pub(crate) async fn stats(State(state): State<AppState>) -> axum::Json<LearningStats> {
    let knowledge = state.knowledge();
    axum::Json(state.scheduler.stats(&knowledge))
}

/// GET /v1/learning/events – Server-Sent Events, one JSON event per progress notification.
pub(crate) async fn events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<Event, std::convert::Infallible>> + Send + 'static> {
    use async_stream::stream;
    let mut rx = state.learning_tx.subscribe();
    let stream = stream! {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(data) => yield Ok(Event::default().event("learning").data(data)),
                    Err(e) => tracing::warn!(error = %e, "Failed to encode learning event"),
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    yield Ok(Event::default().comment(format!("{} learning events dropped", n)));
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_util::{get, json, post_empty, post_json};
    use crate::state::testing::test_state;
    use axum::routing::{get as route_get, post};
    use axum::Router;
    use nascent_core::{BASELINE_KNOWLEDGE, LearningEvent};
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/v1/learning/start", post(start))
            .route("/v1/learning/stop", post(stop))
            .route("/v1/learning/toggle", post(toggle))
            .route("/v1/learning/trigger", post(trigger))
            .route("/v1/learning/stats", route_get(stats))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_trigger_learns_internally_without_a_model() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let mut rx = state.learning_tx.subscribe();
        let app = app(state.clone());

        let res = app.clone().oneshot(post_empty("/v1/learning/trigger")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json(res).await;
        assert!(body["totalKnowledge"].as_u64().unwrap() >= BASELINE_KNOWLEDGE + 1200);
        assert_eq!(body["autonomousLearning"]["sessionsCompleted"], 1);

        assert!(matches!(rx.recv().await.unwrap(), LearningEvent::Thinking { .. }));
        assert!(matches!(
            rx.recv().await.unwrap(),
            LearningEvent::Learned { models_used: 0, .. }
        ));

        let stats = json(app.oneshot(get("/v1/learning/stats")).await.unwrap()).await;
        assert_eq!(stats["sessionsCompleted"], 1);
        assert_eq!(stats["recentTopics"].as_array().unwrap().len(), 1);
        assert_eq!(state.knowledge().autonomous_learning.sessions_completed, 1);
    }

    #[tokio::test]
    async fn test_start_twice_conflicts_then_stop() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = app(state.clone());

        let res = app
            .clone()
            .oneshot(post_json("/v1/learning/start", serde_json::json!({ "speed": "slow" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json(res).await["speed"], "slow");
        assert!(state.scheduler.is_running());

        let res = app.clone().oneshot(post_empty("/v1/learning/start")).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = app.clone().oneshot(post_empty("/v1/learning/stop")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(!state.scheduler.is_running());
    }

    #[tokio::test]
    async fn test_toggle_pauses_and_resumes() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_state(&dir));
        app.clone()
            .oneshot(post_json("/v1/learning/start", serde_json::json!({ "speed": "slow" })))
            .await
            .unwrap();
        let first = json(app.clone().oneshot(post_empty("/v1/learning/toggle")).await.unwrap()).await;
        let second = json(app.clone().oneshot(post_empty("/v1/learning/toggle")).await.unwrap()).await;
        assert_eq!(first["enabled"], false);
        assert_eq!(second["enabled"], true);
        app.oneshot(post_empty("/v1/learning/stop")).await.unwrap();
    }

    #[tokio::test]
    async fn test_toggle_while_stopped_stays_paused() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(test_state(&dir));
        let body = json(app.clone().oneshot(post_empty("/v1/learning/toggle")).await.unwrap()).await;
        assert_eq!(body["enabled"], false);
        let stats = json(app.oneshot(get("/v1/learning/stats")).await.unwrap()).await;
        assert_eq!(stats["isPaused"], true);
        assert_eq!(stats["isActive"], false);
    }
}
