//! Writing suggestions behind a pluggable trait.
//!
//! Default: `CannedAssistant` (templated text after an artificial delay that
//! stands in for a network round-trip). Callers treat any backend as slow and
//! fallible.
//!
//! `AppState` holds an `Arc<dyn Assistant>`.

pub mod canned;
pub mod handlers;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub use canned::{CannedAssistant, MAX_LATENCY_SCALE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Summary,
    Skill,
    Experience,
    CoverLetter,
}

/// What the user asked for, with the inputs each kind needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum SuggestionRequest {
    Summary {
        #[serde(default)]
        experiences: Vec<String>,
        #[serde(default)]
        skills: Vec<String>,
    },
    Skill {
        industry: Option<String>,
        experience_level: Option<String>,
    },
    Experience {
        current_description: Option<String>,
    },
    CoverLetter {
        cv_content: Option<String>,
        job_description: Option<String>,
        company: Option<String>,
    },
}

impl SuggestionRequest {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            SuggestionRequest::Summary { .. } => SuggestionKind::Summary,
            SuggestionRequest::Skill { .. } => SuggestionKind::Skill,
            SuggestionRequest::Experience { .. } => SuggestionKind::Experience,
            SuggestionRequest::CoverLetter { .. } => SuggestionKind::CoverLetter,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub content: String,
    pub confidence: f32, // 0.0 – 1.0
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<String>,
}

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn suggest(&self, request: &SuggestionRequest) -> Result<Suggestion, AppError>;
}
