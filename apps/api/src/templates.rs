//! Static catalog of the visual templates the front-end can render.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub color: &'static str,
}

pub const CV_TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        id: "modern",
        name: "Modern",
        description: "Clean layout that puts technical skills first",
        category: "Development",
        color: "blue",
    },
    TemplateInfo {
        id: "executive",
        name: "Executive",
        description: "Classic style for leadership and management roles",
        category: "Management",
        color: "gray",
    },
    TemplateInfo {
        id: "creative",
        name: "Creative",
        description: "For design, marketing and creative careers",
        category: "Creative",
        color: "purple",
    },
    TemplateInfo {
        id: "technical",
        name: "Technical",
        description: "Tuned for engineering and technical positions",
        category: "Technical",
        color: "green",
    },
    TemplateInfo {
        id: "minimal",
        name: "Minimal",
        description: "Simple and easy for recruiters to scan",
        category: "General",
        color: "orange",
    },
];

pub const LETTER_TEMPLATES: &[TemplateInfo] = &[
    TemplateInfo {
        id: "formal",
        name: "Formal",
        description: "Traditional professional letter",
        category: "Classic",
        color: "blue",
    },
    TemplateInfo {
        id: "modern",
        name: "Modern",
        description: "Contemporary style with an airy layout",
        category: "Modern",
        color: "purple",
    },
    TemplateInfo {
        id: "creative",
        name: "Creative",
        description: "Original design for creative careers",
        category: "Creative",
        color: "pink",
    },
];

#[derive(Debug, Serialize)]
pub struct TemplateCatalog {
    pub cv: &'static [TemplateInfo],
    pub letter: &'static [TemplateInfo],
}

pub fn catalog() -> TemplateCatalog {
    TemplateCatalog {
        cv: CV_TEMPLATES,
        letter: LETTER_TEMPLATES,
    }
}

/// GET /api/v1/templates
pub async fn handle_templates() -> Json<TemplateCatalog> {
    Json(catalog())
}
