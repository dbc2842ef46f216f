//! The workspace owns every piece of mutable application state: the live CV and
//! letter with their registries, the version history, preferences, auth state
//! and the export tracker. It is constructed once at start-up and shared by
//! handle; nothing else mutates these stores.
//!
//! Lock order, when more than one is held: cv → letters → versions.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::autosave::{AutosaveTarget, Persisted};
use crate::documents::{CvUpdate, DocumentStore, FieldOutcome, Registry};
use crate::errors::AppError;
use crate::export::backup::{self, BackupFile};
use crate::export::pdf::{default_pdf_filename, plan_pdf_layout, PdfLayout, PdfOptions};
use crate::export::ExportTracker;
use crate::models::cv::CvDocument;
use crate::models::letter::{CoverLetter, LetterPatch};
use crate::models::user::{AuthState, Preferences, Theme, User};
use crate::storage::{
    load_or_default, store_json, BlobStore, Library, StorageError, AUTH_KEY, LIBRARY_KEY,
    PREFERENCES_KEY,
};
use crate::versions::{Version, VersionStore};

pub const MANUAL_SAVE_LABEL: &str = "Manual save";

/// Result of saving the live CV.
#[derive(Debug, Clone)]
pub struct SavedCv {
    pub id: String,
    pub document: CvDocument,
    pub fingerprint: String,
}

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExport {
    pub file_name: String,
    pub layout: PdfLayout,
}

pub struct Workspace {
    cv: Mutex<DocumentStore<CvDocument>>,
    letters: Mutex<DocumentStore<CoverLetter>>,
    versions: Mutex<VersionStore>,
    preferences: Mutex<Preferences>,
    auth: Mutex<AuthState>,
    exports: Mutex<ExportTracker>,
    blobs: Arc<dyn BlobStore>,
    /// Serializes writes of the library blob so an older snapshot never
    /// overwrites a newer one.
    library_write: Mutex<()>,
    /// Bumped on every change to the live CV.
    revision: watch::Sender<u64>,
}

impl Workspace {
    /// Loads the three persisted blobs and builds the stores from them.
    pub async fn hydrate(
        blobs: Arc<dyn BlobStore>,
        max_versions: usize,
    ) -> Result<Self, StorageError> {
        let preferences: Preferences = load_or_default(blobs.as_ref(), PREFERENCES_KEY).await?;
        let auth: AuthState = load_or_default(blobs.as_ref(), AUTH_KEY).await?;
        let library: Library = load_or_default(blobs.as_ref(), LIBRARY_KEY).await?;

        info!(
            "Hydrated workspace: {} CVs, {} letters, {} versions",
            library.saved_cvs.len(),
            library.saved_letters.len(),
            library.history.versions.len()
        );

        let (revision, _) = watch::channel(0);
        Ok(Self {
            cv: Mutex::new(DocumentStore::new(Registry::from_entries(library.saved_cvs))),
            letters: Mutex::new(DocumentStore::new(Registry::from_entries(
                library.saved_letters,
            ))),
            versions: Mutex::new(VersionStore::from_ledger(library.history, max_versions)),
            preferences: Mutex::new(preferences),
            auth: Mutex::new(auth),
            exports: Mutex::new(ExportTracker::default()),
            blobs,
            library_write: Mutex::new(()),
            revision,
        })
    }

    fn mark_changed(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    async fn persist_library(&self) -> Result<(), StorageError> {
        let _guard = self.library_write.lock().await;
        let library = {
            let cv = self.cv.lock().await;
            let letters = self.letters.lock().await;
            let versions = self.versions.lock().await;
            Library {
                saved_cvs: cv.registry().list().to_vec(),
                saved_letters: letters.registry().list().to_vec(),
                history: versions.to_ledger(),
            }
        };
        store_json(self.blobs.as_ref(), LIBRARY_KEY, &library).await
    }

    // ── CV ──────────────────────────────────────────────────────────────────

    pub async fn cv(&self) -> CvDocument {
        self.cv.lock().await.current().clone()
    }

    pub async fn cv_fingerprint(&self) -> String {
        self.cv.lock().await.fingerprint()
    }

    pub async fn update_cv(&self, update: CvUpdate) -> FieldOutcome {
        let outcome = self.cv.lock().await.update_field(update);
        self.mark_changed();
        outcome
    }

    /// Upserts the live CV into the registry and writes the library blob.
    /// The in-memory registry keeps the save even if the write fails.
    pub async fn save_cv(&self, title: Option<&str>) -> Result<SavedCv, AppError> {
        let saved = {
            let mut cv = self.cv.lock().await;
            let id = cv.save(title);
            SavedCv {
                id,
                document: cv.current().clone(),
                fingerprint: cv.fingerprint(),
            }
        };
        self.mark_changed();
        self.persist_library().await?;
        Ok(saved)
    }

    pub async fn load_cv(&self, id: &str) -> Option<CvDocument> {
        let loaded = {
            let mut cv = self.cv.lock().await;
            cv.load(id).then(|| cv.current().clone())
        };
        if loaded.is_some() {
            self.mark_changed();
        }
        loaded
    }

    /// Returns whether an entry was removed.
    pub async fn delete_cv(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.cv.lock().await.remove(id);
        self.mark_changed();
        if removed {
            info!("Deleted {id}");
            self.persist_library().await?;
        }
        Ok(removed)
    }

    pub async fn reset_cv(&self) -> CvDocument {
        let doc = {
            let mut cv = self.cv.lock().await;
            cv.reset();
            cv.current().clone()
        };
        self.mark_changed();
        doc
    }

    pub async fn serialize_cv(&self) -> Result<String, AppError> {
        Ok(self.cv.lock().await.serialize()?)
    }

    pub async fn saved_cvs(&self) -> Vec<CvDocument> {
        self.cv.lock().await.registry().list().to_vec()
    }

    // ── Cover letters ───────────────────────────────────────────────────────

    pub async fn letter(&self) -> CoverLetter {
        self.letters.lock().await.current().clone()
    }

    pub async fn update_letter(&self, patch: LetterPatch) -> CoverLetter {
        let mut letters = self.letters.lock().await;
        letters.modify(|letter| letter.apply(patch));
        letters.current().clone()
    }

    pub async fn save_letter(&self, title: Option<&str>) -> Result<String, AppError> {
        let id = self.letters.lock().await.save(title);
        self.persist_library().await?;
        Ok(id)
    }

    pub async fn load_letter(&self, id: &str) -> Option<CoverLetter> {
        let mut letters = self.letters.lock().await;
        letters.load(id).then(|| letters.current().clone())
    }

    pub async fn delete_letter(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.letters.lock().await.remove(id);
        if removed {
            self.persist_library().await?;
        }
        Ok(removed)
    }

    pub async fn reset_letter(&self) -> CoverLetter {
        let mut letters = self.letters.lock().await;
        letters.reset();
        letters.current().clone()
    }

    pub async fn saved_letters(&self) -> Vec<CoverLetter> {
        self.letters.lock().await.registry().list().to_vec()
    }

    // ── Versions ────────────────────────────────────────────────────────────

    /// Snapshots `document` and writes the library blob.
    pub async fn capture_version(
        &self,
        document: &CvDocument,
        label: Option<String>,
        is_auto_save: bool,
    ) -> Result<String, AppError> {
        let id = self
            .versions
            .lock()
            .await
            .create_version(document, label, is_auto_save);
        self.persist_library().await?;
        Ok(id)
    }

    /// Snapshots the live CV as a manual version.
    pub async fn snapshot_cv(&self, label: Option<String>) -> Result<String, AppError> {
        let document = self.cv().await;
        let label = label.or_else(|| Some(MANUAL_SAVE_LABEL.to_string()));
        self.capture_version(&document, label, false).await
    }

    pub async fn version_history(&self) -> Vec<Version> {
        self.versions.lock().await.version_history()
    }

    pub async fn latest_version(&self) -> Option<Version> {
        self.versions.lock().await.last_version().cloned()
    }

    pub async fn current_version_id(&self) -> Option<String> {
        self.versions
            .lock()
            .await
            .current_version_id()
            .map(str::to_string)
    }

    /// Replaces the live CV with a copy of the version. `None` on a miss.
    pub async fn restore_version(&self, id: &str) -> Option<CvDocument> {
        let restored = {
            let mut cv = self.cv.lock().await;
            let restored = self.versions.lock().await.restore_version(id)?;
            cv.replace(restored);
            cv.current().clone()
        };
        info!("Restored version {id}");
        self.mark_changed();
        Some(restored)
    }

    pub async fn delete_version(&self, id: &str) -> Result<bool, AppError> {
        let removed = self.versions.lock().await.delete_version(id);
        if removed {
            self.persist_library().await?;
        }
        Ok(removed)
    }

    /// Re-applies the retention cap; returns how many versions were evicted.
    pub async fn prune_versions(&self) -> Result<usize, AppError> {
        let evicted = self.versions.lock().await.clear_old_versions();
        if evicted > 0 {
            self.persist_library().await?;
        }
        Ok(evicted)
    }

    // ── Backup ──────────────────────────────────────────────────────────────

    pub async fn export_backup(&self) -> Result<BackupFile, AppError> {
        Ok(BackupFile::new(self.cv().await))
    }

    /// Replaces the live CV with the backup's document. A rejected payload
    /// leaves the live CV untouched and returns `None`.
    pub async fn import_backup(&self, raw: &str) -> Option<CvDocument> {
        let document = backup::import_backup(raw)?;
        let imported = {
            let mut cv = self.cv.lock().await;
            cv.replace(document);
            cv.current().clone()
        };
        info!("Imported backup of {}", imported.id);
        self.mark_changed();
        Some(imported)
    }

    // ── PDF export ──────────────────────────────────────────────────────────

    pub async fn export_pdf(
        &self,
        image_width_px: u32,
        image_height_px: u32,
        options: PdfOptions,
        file_name: Option<String>,
    ) -> Result<PdfExport, AppError> {
        self.exports.lock().await.start("pdf");

        let info = self.cv.lock().await.current().personal_info.clone();
        match plan_pdf_layout(image_width_px, image_height_px, &options) {
            Ok(layout) => {
                self.exports.lock().await.finish();
                let file_name = match file_name.filter(|f| !f.trim().is_empty()) {
                    Some(name) if name.ends_with(".pdf") => name,
                    Some(name) => format!("{name}.pdf"),
                    None => default_pdf_filename(&info),
                };
                info!("Planned {} page(s) for {file_name}", layout.page_count());
                Ok(PdfExport { file_name, layout })
            }
            Err(e) => {
                self.exports.lock().await.fail();
                Err(e)
            }
        }
    }

    pub async fn export_status(&self) -> ExportTracker {
        self.exports.lock().await.clone()
    }

    // ── Preferences & auth ──────────────────────────────────────────────────

    pub async fn preferences(&self) -> Preferences {
        *self.preferences.lock().await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<Preferences, AppError> {
        let mut prefs = self.preferences.lock().await;
        self.commit_preferences(&mut prefs, Preferences { theme }).await
    }

    pub async fn toggle_theme(&self) -> Result<Preferences, AppError> {
        let mut prefs = self.preferences.lock().await;
        let next = Preferences {
            theme: prefs.theme.toggled(),
        };
        self.commit_preferences(&mut prefs, next).await
    }

    /// Writes the blob while the caller holds the preferences lock; memory
    /// only changes once the write succeeded.
    async fn commit_preferences(
        &self,
        current: &mut Preferences,
        next: Preferences,
    ) -> Result<Preferences, AppError> {
        store_json(self.blobs.as_ref(), PREFERENCES_KEY, &next).await?;
        *current = next;
        Ok(next)
    }

    pub async fn auth(&self) -> AuthState {
        self.auth.lock().await.clone()
    }

    pub async fn login(&self, user: User) -> Result<AuthState, AppError> {
        self.commit_auth(AuthState::signed_in(user)).await
    }

    pub async fn logout(&self) -> Result<AuthState, AppError> {
        self.commit_auth(AuthState::default()).await
    }

    async fn commit_auth(&self, next: AuthState) -> Result<AuthState, AppError> {
        let mut auth = self.auth.lock().await;
        store_json(self.blobs.as_ref(), AUTH_KEY, &next).await?;
        *auth = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl AutosaveTarget for Workspace {
    type Document = CvDocument;

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    async fn fingerprint(&self) -> String {
        self.cv_fingerprint().await
    }

    async fn persist(&self) -> Result<Persisted<CvDocument>, AppError> {
        let saved = self.save_cv(None).await?;
        Ok(Persisted {
            fingerprint: saved.fingerprint,
            saved_at: Utc::now(),
            document: saved.document,
        })
    }

    async fn capture_version(&self, document: CvDocument) -> Result<String, AppError> {
        Workspace::capture_version(self, &document, None, true).await
    }
}
