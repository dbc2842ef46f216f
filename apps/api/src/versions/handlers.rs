use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::cv::CvDocument;
use crate::routes::Applied;
use crate::state::AppState;
use crate::versions::Version;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SnapshotRequest {
    pub label: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub versions: Vec<Version>,
    pub current_version_id: Option<String>,
}

#[derive(Serialize)]
pub struct VersionCreated {
    pub id: String,
}

#[derive(Serialize)]
pub struct PruneResponse {
    pub evicted: usize,
}

/// GET /api/v1/versions
pub async fn handle_version_history(State(state): State<AppState>) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        versions: state.workspace.version_history().await,
        current_version_id: state.workspace.current_version_id().await,
    })
}

/// GET /api/v1/versions/latest
pub async fn handle_latest_version(State(state): State<AppState>) -> Json<Option<Version>> {
    Json(state.workspace.latest_version().await)
}

/// POST /api/v1/versions
pub async fn handle_create_version(
    State(state): State<AppState>,
    Json(req): Json<SnapshotRequest>,
) -> Result<Json<VersionCreated>, AppError> {
    let id = state.workspace.snapshot_cv(req.label).await?;
    Ok(Json(VersionCreated { id }))
}

/// POST /api/v1/versions/:id/restore
/// Replaces the live CV with the version; `null` when the version is unknown.
pub async fn handle_restore_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Option<CvDocument>> {
    Json(state.workspace.restore_version(&id).await)
}

/// DELETE /api/v1/versions/:id
pub async fn handle_delete_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Applied>, AppError> {
    let applied = state.workspace.delete_version(&id).await?;
    Ok(Json(Applied { applied }))
}

/// POST /api/v1/versions/prune
pub async fn handle_prune_versions(
    State(state): State<AppState>,
) -> Result<Json<PruneResponse>, AppError> {
    let evicted = state.workspace.prune_versions().await?;
    Ok(Json(PruneResponse { evicted }))
}
