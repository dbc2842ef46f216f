use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::cv::DEFAULT_DOCUMENT_ID;

pub const DEFAULT_LETTER_TITLE: &str = "New letter";
pub const DEFAULT_LETTER_TEMPLATE: &str = "formal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverLetter {
    pub id: String,
    pub title: String,
    pub company: String,
    pub position: String,
    pub content: String,
    pub template: String,
    #[serde(alias = "lastUpdated")]
    pub last_modified: DateTime<Utc>,
}

impl Default for CoverLetter {
    fn default() -> Self {
        Self {
            id: DEFAULT_DOCUMENT_ID.to_string(),
            title: DEFAULT_LETTER_TITLE.to_string(),
            company: String::new(),
            position: String::new(),
            content: String::new(),
            template: DEFAULT_LETTER_TEMPLATE.to_string(),
            last_modified: Utc::now(),
        }
    }
}

/// Partial update merged into the live letter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LetterPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub content: Option<String>,
    pub template: Option<String>,
}

impl CoverLetter {
    pub fn apply(&mut self, patch: LetterPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(template) = patch.template {
            self.template = template;
        }
    }
}
