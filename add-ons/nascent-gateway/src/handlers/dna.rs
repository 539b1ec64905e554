//! DNA repository routes: births, listing, collective stats and avatars.

use super::ApiError;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use nascent_core::{CollectiveStats, DnaDraft, DnaRecord, KnowledgeSummary, LIST_CAP};
use serde::Deserialize;
use uuid::Uuid;

fn ext_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type.split(';').next().unwrap_or("").trim() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn content_type_for_file(file: &str) -> &'static str {
    match file.rsplit('.').next().unwrap_or("") {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// POST /v1/dna – saves a born child. An empty body snapshots the live mind.
pub(crate) async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let draft = if body.iter().all(u8::is_ascii_whitespace) {
        let mind = state.mind.snapshot();
        DnaDraft::from_snapshot(&mind.personality, &KnowledgeSummary::from(&mind.knowledge))
    } else {
        serde_json::from_slice::<DnaDraft>(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid DNA draft: {}", e)))?
    };
    let record = state.dna.create(draft)?;
    Ok((StatusCode::CREATED, axum::Json(record)))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    pub(crate) limit: Option<usize>,
}

/// GET /v1/dna?limit=N – newest first.
pub(crate) async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<axum::Json<Vec<DnaRecord>>, ApiError> {
    Ok(axum::Json(state.dna.list(params.limit.unwrap_or(LIST_CAP))?))
}

/// GET /v1/dna/stats
pub(crate) async fn stats(State(state): State<AppState>) -> Result<axum::Json<CollectiveStats>, ApiError> {
    Ok(axum::Json(state.dna.collective_stats()?))
}

/// GET /v1/dna/:id
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::Json<DnaRecord>, ApiError> {
    Ok(axum::Json(state.dna.get(id)?))
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AvatarParams {
    /// Prompt the image was generated from.
    pub(crate) prompt: Option<String>,
}

/// PUT /v1/dna/:id/avatar – raw image body; `Content-Type` selects the extension.
pub(crate) async fn upload_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<AvatarParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<axum::Json<DnaRecord>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let ext = ext_for_content_type(content_type).ok_or_else(|| {
        ApiError::bad_request("invalid file type; upload PNG, JPEG, or WebP")
    })?;
    let record = state.dna.get(id)?;
    let url = state.dna.put_avatar(&record.generation_id, &body, ext)?;
    let metadata = params.prompt.as_ref().map(|_| {
        serde_json::json!({ "contentType": content_type, "size": body.len() })
    });
    let updated = state.dna.update_avatar(id, Some(url), params.prompt, metadata)?;
    Ok(axum::Json(updated))
}

/// DELETE /v1/dna/:id/avatar
pub(crate) async fn delete_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<axum::Json<DnaRecord>, ApiError> {
    let record = state.dna.get(id)?;
    let removed = state.dna.delete_avatar(&record.generation_id)?;
    tracing::debug!(id = %id, removed, "Avatar deleted");
    Ok(axum::Json(state.dna.update_avatar(id, None, None, None)?))
}

/// GET /v1/avatars/:file
pub(crate) async fn avatar_file(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.dna.avatar(&file)? {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, content_type_for_file(&file))], bytes)),
        None => Err(ApiError(StatusCode::NOT_FOUND, format!("avatar {} not found", file))),
    }
}
