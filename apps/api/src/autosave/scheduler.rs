use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::autosave::{
    AutosaveConfig, AutosaveStatus, AutosaveTarget, ExitGuard, FlushOutcome, SaveState,
};
use crate::errors::AppError;

const COMMAND_BUFFER: usize = 32;

enum Command {
    Flush(oneshot::Sender<FlushOutcome>),
    /// A save happened outside the scheduler (manual save).
    MarkSaved(String),
    SetEnabled(bool),
    Shutdown,
}

/// Cheap, cloneable handle to a running scheduler.
#[derive(Clone)]
pub struct AutosaveHandle {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<AutosaveStatus>,
}

impl AutosaveHandle {
    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    pub fn exit_guard(&self) -> ExitGuard {
        ExitGuard::from_status(&self.status.borrow())
    }

    /// Saves now if the state differs from the last save.
    pub async fn flush(&self) -> Result<FlushOutcome, AppError> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Flush(reply)).await?;
        outcome
            .await
            .map_err(|_| AppError::Internal(anyhow!("autosave scheduler dropped a flush")))
    }

    pub async fn mark_saved(&self, fingerprint: String) -> Result<(), AppError> {
        self.send(Command::MarkSaved(fingerprint)).await
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<(), AppError> {
        self.send(Command::SetEnabled(enabled)).await
    }

    pub async fn shutdown(&self) {
        // A scheduler that already stopped needs no shutdown.
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<(), AppError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::Internal(anyhow!("autosave scheduler is not running")))
    }
}

/// Starts the scheduler task for `target`.
///
/// The current state counts as saved: only changes made after this call
/// schedule a save.
pub async fn spawn<T: AutosaveTarget>(target: Arc<T>, config: AutosaveConfig) -> AutosaveHandle {
    let changes = target.subscribe();
    let last_saved_fingerprint = target.fingerprint().await;

    let (status_tx, status_rx) = watch::channel(AutosaveStatus {
        status: SaveState::Idle,
        enabled: config.enabled,
        has_unsaved_changes: false,
        last_saved: None,
    });
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);

    let scheduler = Scheduler {
        target,
        delay: config.delay,
        enabled: config.enabled,
        last_saved_fingerprint,
        deadline: None,
        status: status_tx,
    };
    tokio::spawn(scheduler.run(changes, commands_rx));

    info!(
        "Autosave {} (delay {}ms)",
        if config.enabled { "enabled" } else { "disabled" },
        config.delay.as_millis()
    );

    AutosaveHandle {
        commands: commands_tx,
        status: status_rx,
    }
}

struct Scheduler<T> {
    target: Arc<T>,
    delay: Duration,
    enabled: bool,
    last_saved_fingerprint: String,
    /// When the pending save fires. `None` means nothing is pending.
    deadline: Option<Instant>,
    status: watch::Sender<AutosaveStatus>,
}

impl<T: AutosaveTarget> Scheduler<T> {
    async fn run(
        mut self,
        mut changes: watch::Receiver<u64>,
        mut commands: mpsc::Receiver<Command>,
    ) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.on_change().await;
                }
                command = commands.recv() => match command {
                    Some(Command::Flush(reply)) => {
                        let outcome = self.flush().await;
                        let _ = reply.send(outcome);
                    }
                    Some(Command::MarkSaved(fingerprint)) => self.mark_saved(fingerprint).await,
                    Some(Command::SetEnabled(enabled)) => self.set_enabled(enabled).await,
                    Some(Command::Shutdown) | None => break,
                },
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.save().await;
                }
            }
        }
        debug!("Autosave scheduler stopped");
    }

    async fn on_change(&mut self) {
        let fingerprint = self.target.fingerprint().await;
        if fingerprint == self.last_saved_fingerprint {
            // Edited back to the saved state; drop any pending save.
            self.deadline = None;
            self.publish(|s| {
                s.has_unsaved_changes = false;
                if s.status == SaveState::Unsaved {
                    s.status = SaveState::Saved;
                }
            });
            return;
        }

        if self.enabled {
            // Pure debounce: every change pushes the save out again.
            self.deadline = Some(Instant::now() + self.delay);
            debug!("Autosave scheduled in {}ms", self.delay.as_millis());
        }
        self.publish(|s| {
            s.has_unsaved_changes = true;
            if !matches!(s.status, SaveState::Error(_)) {
                s.status = SaveState::Unsaved;
            }
        });
    }

    async fn flush(&mut self) -> FlushOutcome {
        self.deadline = None;
        if self.target.fingerprint().await == self.last_saved_fingerprint {
            return FlushOutcome::Unchanged;
        }
        self.save().await
    }

    /// Failures are reported through the status and not retried; the next
    /// change re-arms the timer.
    async fn save(&mut self) -> FlushOutcome {
        self.publish(|s| s.status = SaveState::Saving);

        match self.target.persist().await {
            Ok(persisted) => {
                self.last_saved_fingerprint = persisted.fingerprint;
                if let Err(e) = self.target.capture_version(persisted.document).await {
                    warn!("Autosave succeeded but the version was not recorded: {e}");
                }
                self.publish(|s| {
                    s.status = SaveState::Saved;
                    s.has_unsaved_changes = false;
                    s.last_saved = Some(persisted.saved_at);
                });
                info!("Autosaved");
                FlushOutcome::Saved
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Autosave failed: {message}");
                self.publish(|s| s.status = SaveState::Error(message.clone()));
                FlushOutcome::Failed(message)
            }
        }
    }

    /// Records a save made outside the scheduler. Edits that landed after
    /// that save still count as unsaved and stay scheduled.
    async fn mark_saved(&mut self, fingerprint: String) {
        self.last_saved_fingerprint = fingerprint;
        self.deadline = None;
        self.publish(|s| {
            s.status = SaveState::Saved;
            s.has_unsaved_changes = false;
            s.last_saved = Some(Utc::now());
        });
        if self.target.fingerprint().await != self.last_saved_fingerprint {
            self.on_change().await;
        }
    }

    async fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.publish(|s| s.enabled = enabled);
        if enabled {
            self.on_change().await;
        } else {
            self.deadline = None;
        }
    }

    fn publish(&self, update: impl FnOnce(&mut AutosaveStatus)) {
        self.status.send_modify(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::autosave::Persisted;

    /// In-memory target that records every persistence call.
    struct FakeTarget {
        content: Mutex<String>,
        revision: watch::Sender<u64>,
        persisted: Mutex<Vec<String>>,
        versions: Mutex<Vec<String>>,
        persist_calls: AtomicUsize,
        fail: AtomicBool,
    }

    impl FakeTarget {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                content: Mutex::new("initial".to_string()),
                revision: watch::channel(0).0,
                persisted: Mutex::new(Vec::new()),
                versions: Mutex::new(Vec::new()),
                persist_calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
            })
        }

        fn edit(&self, content: &str) {
            *self.content.lock().unwrap() = content.to_string();
            self.revision.send_modify(|r| *r += 1);
        }

        fn calls(&self) -> usize {
            self.persist_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AutosaveTarget for FakeTarget {
        type Document = String;

        fn subscribe(&self) -> watch::Receiver<u64> {
            self.revision.subscribe()
        }

        async fn fingerprint(&self) -> String {
            self.content.lock().unwrap().clone()
        }

        async fn persist(&self) -> Result<Persisted<String>, AppError> {
            self.persist_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Internal(anyhow!("disk full")));
            }
            let content = self.content.lock().unwrap().clone();
            self.persisted.lock().unwrap().push(content.clone());
            Ok(Persisted {
                fingerprint: content.clone(),
                saved_at: Utc::now(),
                document: content,
            })
        }

        async fn capture_version(&self, document: String) -> Result<String, AppError> {
            self.versions.lock().unwrap().push(document);
            Ok("v-1".to_string())
        }
    }

    const DELAY: Duration = Duration::from_millis(2000);

    async fn start(target: &Arc<FakeTarget>) -> AutosaveHandle {
        spawn(
            target.clone(),
            AutosaveConfig {
                enabled: true,
                delay: DELAY,
            },
        )
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_saves_once_with_last_state() {
        let target = FakeTarget::new();
        let handle = start(&target).await;

        for i in 0..5 {
            target.edit(&format!("edit {i}"));
            time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(target.calls(), 0);

        time::sleep(DELAY).await;
        assert_eq!(target.calls(), 1);
        assert_eq!(*target.persisted.lock().unwrap(), vec!["edit 4".to_string()]);
        assert_eq!(*target.versions.lock().unwrap(), vec!["edit 4".to_string()]);

        let status = handle.status();
        assert_eq!(status.status, SaveState::Saved);
        assert!(!status.has_unsaved_changes);
        assert!(status.last_saved.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_state_never_saves() {
        let target = FakeTarget::new();
        let _handle = start(&target).await;

        target.edit("initial");
        time::sleep(DELAY * 2).await;
        assert_eq!(target.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverting_cancels_pending_save() {
        let target = FakeTarget::new();
        let handle = start(&target).await;

        target.edit("typo");
        time::sleep(Duration::from_millis(100)).await;
        assert!(handle.exit_guard().requires_confirmation);

        target.edit("initial");
        time::sleep(DELAY * 2).await;
        assert_eq!(target.calls(), 0);
        assert!(!handle.exit_guard().requires_confirmation);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_flush_is_noop() {
        let target = FakeTarget::new();
        let handle = start(&target).await;

        target.edit("changed");
        assert_eq!(handle.flush().await.unwrap(), FlushOutcome::Saved);
        assert_eq!(handle.flush().await.unwrap(), FlushOutcome::Unchanged);
        time::sleep(DELAY * 2).await;
        assert_eq!(target.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reports_error_without_retry() {
        let target = FakeTarget::new();
        let handle = start(&target).await;
        target.fail.store(true, Ordering::SeqCst);

        target.edit("doomed");
        time::sleep(DELAY * 3).await;
        assert_eq!(target.calls(), 1);
        assert!(matches!(handle.status().status, SaveState::Error(_)));
        assert!(handle.exit_guard().requires_confirmation);
        assert!(target.versions.lock().unwrap().is_empty());

        // The next change re-arms the timer.
        target.fail.store(false, Ordering::SeqCst);
        target.edit("recovered");
        time::sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(target.calls(), 2);
        assert_eq!(handle.status().status, SaveState::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_tracks_changes_without_saving() {
        let target = FakeTarget::new();
        let handle = spawn(
            target.clone(),
            AutosaveConfig {
                enabled: false,
                delay: DELAY,
            },
        )
        .await;

        target.edit("manual mode");
        time::sleep(DELAY * 2).await;
        assert_eq!(target.calls(), 0);
        assert_eq!(handle.status().status, SaveState::Unsaved);

        handle.set_enabled(true).await.unwrap();
        time::sleep(DELAY + Duration::from_millis(100)).await;
        assert_eq!(target.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_saved_cancels_pending_save() {
        let target = FakeTarget::new();
        let handle = start(&target).await;

        target.edit("saved by hand");
        time::sleep(Duration::from_millis(100)).await;
        handle.mark_saved("saved by hand".to_string()).await.unwrap();
        time::sleep(DELAY * 2).await;
        assert_eq!(target.calls(), 0);
        assert_eq!(handle.status().status, SaveState::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mark_saved_keeps_later_edit_scheduled() {
        let target = FakeTarget::new();
        let handle = start(&target).await;

        target.edit("A");
        target.edit("B");
        handle.mark_saved("A".to_string()).await.unwrap();
        time::sleep(Duration::from_millis(10)).await;
        assert!(handle.exit_guard().requires_confirmation);

        time::sleep(DELAY * 3).await;
        assert_eq!(target.calls(), 1);
        assert_eq!(*target.persisted.lock().unwrap(), vec!["B".to_string()]);
        assert!(!handle.status().has_unsaved_changes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_fail_after_shutdown() {
        let target = FakeTarget::new();
        let handle = start(&target).await;
        handle.shutdown().await;
        time::sleep(Duration::from_millis(10)).await;
        assert!(handle.flush().await.is_err());
    }
}
