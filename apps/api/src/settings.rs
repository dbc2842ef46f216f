//! Theme preference and the signed-in user. Both are small blobs written
//! through immediately on change.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::{AuthState, Preferences, Theme, User};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.workspace.preferences().await)
}

/// PUT /api/v1/preferences
pub async fn handle_set_preferences(
    State(state): State<AppState>,
    Json(req): Json<ThemeRequest>,
) -> Result<Json<Preferences>, AppError> {
    Ok(Json(state.workspace.set_theme(req.theme).await?))
}

/// POST /api/v1/preferences/theme/toggle
pub async fn handle_toggle_theme(
    State(state): State<AppState>,
) -> Result<Json<Preferences>, AppError> {
    Ok(Json(state.workspace.toggle_theme().await?))
}

/// GET /api/v1/auth
pub async fn handle_get_auth(State(state): State<AppState>) -> Json<AuthState> {
    Json(state.workspace.auth().await)
}

/// POST /api/v1/auth/login
/// There is no credential check; the client supplies the user profile.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<AuthState>, AppError> {
    if user.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    Ok(Json(state.workspace.login(user).await?))
}

/// POST /api/v1/auth/logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<Json<AuthState>, AppError> {
    Ok(Json(state.workspace.logout().await?))
}
