use chrono::Utc;
use tracing::info;

use crate::documents::{new_id, Draft, Registry};

/// Single source of truth for the document currently being edited, together
/// with the registry of saved documents of the same kind.
#[derive(Debug, Clone)]
pub struct DocumentStore<D> {
    current: D,
    registry: Registry<D>,
}

impl<D: Draft> Default for DocumentStore<D> {
    fn default() -> Self {
        Self::new(Registry::default())
    }
}

impl<D: Draft> DocumentStore<D> {
    /// Starts with a blank transient document on top of the given registry.
    pub fn new(registry: Registry<D>) -> Self {
        Self {
            current: D::blank(),
            registry,
        }
    }

    pub fn current(&self) -> &D {
        &self.current
    }

    pub fn registry(&self) -> &Registry<D> {
        &self.registry
    }

    /// Applies `edit` to the live document and refreshes its modification time.
    pub fn modify<R>(&mut self, edit: impl FnOnce(&mut D) -> R) -> R {
        let result = edit(&mut self.current);
        self.touch();
        result
    }

    /// Stamps `last_modified` with the current time, never moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now().max(self.current.last_modified());
        self.current.set_last_modified(now);
    }

    /// Upserts the live document into the registry and returns its identifier.
    ///
    /// A document whose identifier is not yet registered (including the
    /// transient `"default"`) receives a fresh one. An empty title keeps the
    /// existing title.
    pub fn save(&mut self, title: Option<&str>) -> String {
        let mut doc = self.current.clone();
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            doc.set_title(title.to_string());
        }
        doc.set_last_modified(Utc::now().max(doc.last_modified()));

        if !self.registry.contains(doc.id()) {
            doc.set_id(new_id(D::ID_PREFIX));
        }

        let id = doc.id().to_string();
        self.registry.upsert(doc.clone());
        self.current = doc;
        info!("Saved {} '{}'", id, self.current.title());
        id
    }

    /// Replaces the live document with a copy of the registered one.
    /// Returns `false` and leaves the live document alone on a miss.
    pub fn load(&mut self, id: &str) -> bool {
        let Some(saved) = self.registry.get(id) else {
            return false;
        };
        let mut doc = saved.clone();
        doc.set_last_modified(Utc::now());
        self.current = doc;
        info!("Loaded {id}");
        true
    }

    /// Deletes a registry entry. Deleting the live document's entry resets the
    /// live document to a blank transient one.
    pub fn remove(&mut self, id: &str) -> bool {
        let removed = self.registry.delete_by_id(id);
        if self.current.id() == id {
            self.current = D::blank();
        }
        removed
    }

    /// Replaces the live document with a blank one under a fresh identifier.
    pub fn reset(&mut self) {
        let mut doc = D::blank();
        doc.set_id(new_id(D::ID_PREFIX));
        self.current = doc;
    }

    /// Replaces the live document wholesale (import, version restore).
    pub fn replace(&mut self, doc: D) {
        self.current = doc;
        self.current.set_last_modified(Utc::now());
    }

    /// Pretty JSON of the full live document, fields in declaration order.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.current)
    }

    /// Canonical representation used to decide whether a save is needed.
    /// The modification time is excluded so that saving or loading alone does
    /// not look like an edit.
    pub fn fingerprint(&self) -> String {
        fingerprint_of(&self.current)
    }
}

/// Keys are emitted in sorted order by `serde_json::Value`, which makes the
/// result independent of struct field order.
pub fn fingerprint_of<D: Draft>(doc: &D) -> String {
    match serde_json::to_value(doc) {
        Ok(mut value) => {
            if let Some(map) = value.as_object_mut() {
                map.remove("lastModified");
            }
            value.to_string()
        }
        Err(_) => String::new(),
    }
}
