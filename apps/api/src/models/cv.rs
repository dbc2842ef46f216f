use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of the transient, never-saved document.
pub const DEFAULT_DOCUMENT_ID: &str = "default";
pub const DEFAULT_CV_TITLE: &str = "New CV";
pub const DEFAULT_CV_TEMPLATE: &str = "modern";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub level: SkillLevel,
    pub category: String,
}

/// The résumé being authored.
///
/// Field order is the canonical order used for fingerprints and exports.
/// Missing fields deserialize to their blank values so older backups import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvDocument {
    pub id: String,
    pub title: String,
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experiences: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub languages: Vec<String>,
    pub certifications: Vec<String>,
    pub template: String,
    #[serde(alias = "lastUpdated")]
    pub last_modified: DateTime<Utc>,
}

impl Default for CvDocument {
    fn default() -> Self {
        Self {
            id: DEFAULT_DOCUMENT_ID.to_string(),
            title: DEFAULT_CV_TITLE.to_string(),
            personal_info: PersonalInfo::default(),
            summary: String::new(),
            experiences: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            certifications: Vec::new(),
            template: DEFAULT_CV_TEMPLATE.to_string(),
            last_modified: Utc::now(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partial updates for list entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub current: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillPatch {
    pub name: Option<String>,
    pub level: Option<SkillLevel>,
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_is_transient() {
        let doc = CvDocument::default();
        assert_eq!(doc.id, DEFAULT_DOCUMENT_ID);
        assert_eq!(doc.template, "modern");
        assert!(doc.experiences.is_empty());
    }

    #[test]
    fn test_accepts_legacy_last_updated_field() {
        let json = r#"{"id":"cv-1","personalInfo":{"firstName":"Ada"},"lastUpdated":"2024-03-01T10:00:00Z"}"#;
        let doc: CvDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.personal_info.first_name, "Ada");
        assert_eq!(doc.last_modified.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert_eq!(doc.title, DEFAULT_CV_TITLE);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(CvDocument::default()).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert!(json.get("lastModified").is_some());
    }
}
