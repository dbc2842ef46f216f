use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::{CvUpdate, FieldOutcome};
use crate::errors::AppError;
use crate::models::cv::CvDocument;
use crate::models::letter::{CoverLetter, LetterPatch};
use crate::routes::Applied;
use crate::state::AppState;
use crate::workspace::MANUAL_SAVE_LABEL;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveRequest {
    pub title: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

// ── Live CV ─────────────────────────────────────────────────────────────────

/// GET /api/v1/cv
pub async fn handle_get_cv(State(state): State<AppState>) -> Json<CvDocument> {
    Json(state.workspace.cv().await)
}

/// PATCH /api/v1/cv
pub async fn handle_update_cv(
    State(state): State<AppState>,
    Json(update): Json<CvUpdate>,
) -> Json<FieldOutcome> {
    Json(state.workspace.update_cv(update).await)
}

/// POST /api/v1/cv/save
/// Saves, records a manual version, and tells autosave the state is clean.
pub async fn handle_save_cv(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let saved = state.workspace.save_cv(req.title.as_deref()).await?;
    let version_id = state
        .workspace
        .capture_version(&saved.document, Some(MANUAL_SAVE_LABEL.to_string()), false)
        .await?;
    state.autosave.mark_saved(saved.fingerprint).await?;
    Ok(Json(SaveResponse {
        id: saved.id,
        version_id: Some(version_id),
    }))
}

/// POST /api/v1/cv/reset
pub async fn handle_reset_cv(State(state): State<AppState>) -> Json<CvDocument> {
    Json(state.workspace.reset_cv().await)
}

/// GET /api/v1/cv/export
/// The full live CV as pretty JSON, fields in canonical order.
pub async fn handle_export_cv(State(state): State<AppState>) -> Result<String, AppError> {
    state.workspace.serialize_cv().await
}

// ── Saved CVs ───────────────────────────────────────────────────────────────

/// GET /api/v1/cvs
pub async fn handle_list_cvs(State(state): State<AppState>) -> Json<Vec<CvDocument>> {
    Json(state.workspace.saved_cvs().await)
}

/// POST /api/v1/cvs/:id/load
pub async fn handle_load_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Option<CvDocument>> {
    Json(state.workspace.load_cv(&id).await)
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Applied>, AppError> {
    let applied = state.workspace.delete_cv(&id).await?;
    Ok(Json(Applied { applied }))
}

// ── Cover letters ───────────────────────────────────────────────────────────

/// GET /api/v1/letter
pub async fn handle_get_letter(State(state): State<AppState>) -> Json<CoverLetter> {
    Json(state.workspace.letter().await)
}

/// PATCH /api/v1/letter
pub async fn handle_update_letter(
    State(state): State<AppState>,
    Json(patch): Json<LetterPatch>,
) -> Json<CoverLetter> {
    Json(state.workspace.update_letter(patch).await)
}

/// POST /api/v1/letter/save
pub async fn handle_save_letter(
    State(state): State<AppState>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<SaveResponse>, AppError> {
    let id = state.workspace.save_letter(req.title.as_deref()).await?;
    Ok(Json(SaveResponse {
        id,
        version_id: None,
    }))
}

/// POST /api/v1/letter/reset
pub async fn handle_reset_letter(State(state): State<AppState>) -> Json<CoverLetter> {
    Json(state.workspace.reset_letter().await)
}

/// GET /api/v1/letters
pub async fn handle_list_letters(State(state): State<AppState>) -> Json<Vec<CoverLetter>> {
    Json(state.workspace.saved_letters().await)
}

/// POST /api/v1/letters/:id/load
pub async fn handle_load_letter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Option<CoverLetter>> {
    Json(state.workspace.load_letter(&id).await)
}

/// DELETE /api/v1/letters/:id
pub async fn handle_delete_letter(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Applied>, AppError> {
    let applied = state.workspace.delete_letter(&id).await?;
    Ok(Json(Applied { applied }))
}
