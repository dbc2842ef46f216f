use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::errors::AppError;
use crate::export::backup::backup_filename;
use crate::export::pdf::{ExportQuality, Orientation, PageFormat, PdfOptions};
use crate::export::ExportTracker;
use crate::models::cv::CvDocument;
use crate::state::AppState;
use crate::workspace::PdfExport;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExportRequest {
    /// Size of the rasterized preview, in pixels.
    pub image_width_px: u32,
    pub image_height_px: u32,
    #[serde(default)]
    pub quality: ExportQuality,
    #[serde(default = "include_margins_default")]
    pub include_margins: bool,
    #[serde(default)]
    pub format: PageFormat,
    #[serde(default)]
    pub orientation: Orientation,
    pub file_name: Option<String>,
}

fn include_margins_default() -> bool {
    true
}

impl PdfExportRequest {
    fn options(&self) -> PdfOptions {
        PdfOptions {
            format: self.format,
            orientation: self.orientation,
            ..PdfOptions::from_dialog(self.quality, self.include_margins)
        }
    }
}

/// GET /api/v1/backup
/// Downloads the live CV wrapped in a versioned backup envelope.
pub async fn handle_export_backup(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let backup = state.workspace.export_backup().await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        backup_filename(Utc::now().date_naive())
    );
    Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(backup)))
}

/// POST /api/v1/backup
/// Body is the raw backup file. Rejected files leave the live CV untouched.
pub async fn handle_import_backup(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<CvDocument>, AppError> {
    state
        .workspace
        .import_backup(&body)
        .await
        .map(Json)
        .ok_or_else(|| AppError::UnprocessableEntity("Not a valid CV backup file".to_string()))
}

/// POST /api/v1/export/pdf
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Json(req): Json<PdfExportRequest>,
) -> Result<Json<PdfExport>, AppError> {
    let options = req.options();
    let export = state
        .workspace
        .export_pdf(req.image_width_px, req.image_height_px, options, req.file_name)
        .await?;
    Ok(Json(export))
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<ExportTracker> {
    Json(state.workspace.export_status().await)
}
