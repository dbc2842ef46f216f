use axum::{extract::State, Json};
use serde::Deserialize;

use crate::autosave::{AutosaveStatus, ExitGuard, FlushOutcome};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AutosaveToggle {
    pub enabled: bool,
}

/// GET /api/v1/autosave
pub async fn handle_autosave_status(State(state): State<AppState>) -> Json<AutosaveStatus> {
    Json(state.autosave.status())
}

/// PUT /api/v1/autosave
pub async fn handle_set_autosave(
    State(state): State<AppState>,
    Json(req): Json<AutosaveToggle>,
) -> Result<Json<AutosaveStatus>, AppError> {
    state.autosave.set_enabled(req.enabled).await?;
    Ok(Json(state.autosave.status()))
}

/// POST /api/v1/autosave/flush
pub async fn handle_flush(State(state): State<AppState>) -> Result<Json<FlushOutcome>, AppError> {
    Ok(Json(state.autosave.flush().await?))
}

/// GET /api/v1/autosave/exit-guard
/// Asked by the page before it unloads.
pub async fn handle_exit_guard(State(state): State<AppState>) -> Json<ExitGuard> {
    Json(state.autosave.exit_guard())
}
