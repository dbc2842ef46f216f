// Document persistence: the live document store, the saved-document registry,
// and the CV section mutators. Letters reuse the same store through `Draft`.

pub mod handlers;
pub mod registry;
pub mod sections;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::models::cv::CvDocument;
use crate::models::letter::CoverLetter;

pub use registry::Registry;
pub use sections::{CvUpdate, FieldOutcome};
pub use store::DocumentStore;

/// A document kind that can live in a `DocumentStore` and a `Registry`.
pub trait Draft: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Prefix of identifiers assigned on first save (`cv-…`, `letter-…`).
    const ID_PREFIX: &'static str;

    /// A blank document carrying the transient `"default"` identifier.
    fn blank() -> Self;
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn title(&self) -> &str;
    fn set_title(&mut self, title: String);
    fn last_modified(&self) -> DateTime<Utc>;
    fn set_last_modified(&mut self, at: DateTime<Utc>);
}

/// Generates a prefixed identifier. Random, so two saves within the same
/// clock tick never collide.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

impl Draft for CvDocument {
    const ID_PREFIX: &'static str = "cv";

    fn blank() -> Self {
        CvDocument::default()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn set_last_modified(&mut self, at: DateTime<Utc>) {
        self.last_modified = at;
    }
}

impl Draft for CoverLetter {
    const ID_PREFIX: &'static str = "letter";

    fn blank() -> Self {
        CoverLetter::default()
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: String) {
        self.title = title;
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    fn set_last_modified(&mut self, at: DateTime<Utc>) {
        self.last_modified = at;
    }
}
