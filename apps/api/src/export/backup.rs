use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::cv::CvDocument;

pub const BACKUP_FORMAT_VERSION: &str = "1.0";

/// On-disk backup of a single CV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub data: CvDocument,
}

impl BackupFile {
    pub fn new(data: CvDocument) -> Self {
        Self {
            version: BACKUP_FORMAT_VERSION.to_string(),
            exported_at: Utc::now(),
            data,
        }
    }
}

#[cfg(test)]
pub fn export_backup(document: &CvDocument) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BackupFile::new(document.clone()))
}

/// Parses a backup. Anything without a `data.personalInfo` object, or whose
/// `data` does not decode as a CV, is rejected with `None`.
pub fn import_backup(raw: &str) -> Option<CvDocument> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Backup import rejected, not JSON: {e}");
            return None;
        }
    };

    let data = value.get("data")?;
    if !data.get("personalInfo").is_some_and(|p| p.is_object()) {
        warn!("Backup import rejected, missing personalInfo");
        return None;
    }

    match serde_json::from_value(data.clone()) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!("Backup import rejected, invalid document: {e}");
            None
        }
    }
}

pub fn backup_filename(date: NaiveDate) -> String {
    format!("procv-backup-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_then_import() {
        let mut doc = CvDocument {
            id: "cv-42".to_string(),
            summary: "Compiler engineer".to_string(),
            ..CvDocument::default()
        };
        doc.personal_info.first_name = "Grace".to_string();

        let raw = export_backup(&doc).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["version"], "1.0");
        assert!(value.get("exportedAt").is_some());

        assert_eq!(import_backup(&raw).unwrap(), doc);
    }

    #[test]
    fn test_rejects_foreign_payload() {
        assert!(import_backup(r#"{"foo":1}"#).is_none());
        assert!(import_backup(r#"{"data":{"summary":"x"}}"#).is_none());
        assert!(import_backup("not json").is_none());
    }

    #[test]
    fn test_accepts_browser_backup_shape() {
        let raw = r#"{
            "version": "1.0",
            "exportedAt": "2024-05-01T08:00:00.000Z",
            "data": {
                "id": "cv-1714550400000",
                "title": "Mon CV",
                "personalInfo": {"firstName": "Jean", "lastName": "Dupont", "email": "", "phone": "", "address": ""},
                "summary": "",
                "experiences": [],
                "education": [],
                "skills": [{"id": "1", "name": "Rust", "level": "expert", "category": "Languages"}],
                "languages": ["French"],
                "certifications": [],
                "template": "minimal",
                "lastUpdated": "2024-05-01T07:59:00.000Z"
            }
        }"#;
        let doc = import_backup(raw).unwrap();
        assert_eq!(doc.id, "cv-1714550400000");
        assert_eq!(doc.skills[0].name, "Rust");
        assert_eq!(doc.template, "minimal");
    }

    #[test]
    fn test_backup_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(backup_filename(date), "procv-backup-2026-03-07.json");
    }
}
