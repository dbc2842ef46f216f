use std::sync::Arc;

use crate::assistant::Assistant;
use crate::autosave::AutosaveHandle;
use crate::config::Config;
use crate::workspace::Workspace;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub autosave: AutosaveHandle,
    /// Pluggable suggestion backend. Default: CannedAssistant.
    pub assistant: Arc<dyn Assistant>,
    pub config: Config,
}
