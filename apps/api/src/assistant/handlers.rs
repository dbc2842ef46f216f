use std::time::Duration;

use axum::{extract::State, Json};
use tracing::warn;

use crate::assistant::{Suggestion, SuggestionRequest};
use crate::errors::AppError;
use crate::state::AppState;

/// Upper bound on a single suggestion round-trip.
const SUGGESTION_TIMEOUT: Duration = Duration::from_secs(30);

/// POST /api/v1/ai/suggestions
pub async fn handle_suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestionRequest>,
) -> Result<Json<Suggestion>, AppError> {
    let kind = request.kind();
    match tokio::time::timeout(SUGGESTION_TIMEOUT, state.assistant.suggest(&request)).await {
        Ok(suggestion) => Ok(Json(suggestion?)),
        Err(_) => {
            warn!("{kind:?} suggestion timed out");
            Err(AppError::Assistant(format!("{kind:?} suggestion timed out")))
        }
    }
}
