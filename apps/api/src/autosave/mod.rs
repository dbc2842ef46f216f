// Debounced autosave of the live CV.
// One tokio task per watched target; saves run inside that task so at most
// one is ever in flight.

pub mod handlers;
pub mod scheduler;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::errors::AppError;

pub use scheduler::{spawn, AutosaveHandle};

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

pub const UNSAVED_CHANGES_MESSAGE: &str =
    "You have unsaved changes. Do you really want to leave?";

#[derive(Debug, Clone, Copy)]
pub struct AutosaveConfig {
    pub enabled: bool,
    /// Quiet period after the latest change before a save fires.
    pub delay: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            delay: DEFAULT_AUTOSAVE_DELAY,
        }
    }
}

/// What a successful save wrote.
#[derive(Debug, Clone)]
pub struct Persisted<D> {
    /// Fingerprint of the state exactly as persisted.
    pub fingerprint: String,
    pub saved_at: DateTime<Utc>,
    pub document: D,
}

/// State the scheduler watches and saves.
#[async_trait]
pub trait AutosaveTarget: Send + Sync + 'static {
    type Document: Send + 'static;

    /// Ticks on every change to the watched state.
    fn subscribe(&self) -> watch::Receiver<u64>;

    /// Canonical fingerprint of the current state.
    async fn fingerprint(&self) -> String;

    async fn persist(&self) -> Result<Persisted<Self::Document>, AppError>;

    /// Records an automatic version of what was just persisted.
    async fn capture_version(&self, document: Self::Document) -> Result<String, AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SaveState {
    Idle,
    Unsaved,
    Saving,
    Saved,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveStatus {
    pub status: SaveState,
    pub enabled: bool,
    pub has_unsaved_changes: bool,
    pub last_saved: Option<DateTime<Utc>>,
}

/// Outcome of an explicit flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum FlushOutcome {
    /// Nothing changed since the last save.
    Unchanged,
    Saved,
    Failed(String),
}

/// Whether tearing down the editing surface should ask the user first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitGuard {
    pub requires_confirmation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExitGuard {
    pub fn from_status(status: &AutosaveStatus) -> Self {
        if status.has_unsaved_changes {
            Self {
                requires_confirmation: true,
                message: Some(UNSAVED_CHANGES_MESSAGE.to_string()),
            }
        } else {
            Self {
                requires_confirmation: false,
                message: None,
            }
        }
    }
}
