//! PDF page planning for the rasterized preview.
//!
//! The front-end rasterizes the preview region into one tall image; this
//! module decides the page geometry and where that image lands on each page.
//! All lengths are millimetres unless the name says otherwise.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::cv::PersonalInfo;

pub const DEFAULT_MARGIN_MM: f32 = 10.0;

/// Longest document a single export may plan.
pub const MAX_PDF_PAGES: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait width and height.
    pub fn size_mm(self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// The two quality presets offered by the export dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportQuality {
    #[default]
    Standard,
    High,
}

impl ExportQuality {
    pub fn scale(self) -> f32 {
        match self {
            ExportQuality::Standard => 1.0,
            ExportQuality::High => 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PdfOptions {
    pub format: PageFormat,
    pub orientation: Orientation,
    /// Raster scale applied when capturing the preview.
    pub quality: f32,
    pub margin_mm: f32,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            orientation: Orientation::Portrait,
            quality: 1.0,
            margin_mm: DEFAULT_MARGIN_MM,
        }
    }
}

impl PdfOptions {
    /// Options as chosen in the export dialog.
    pub fn from_dialog(quality: ExportQuality, include_margins: bool) -> Self {
        Self {
            quality: quality.scale(),
            margin_mm: if include_margins { DEFAULT_MARGIN_MM } else { 0.0 },
            ..Self::default()
        }
    }

    pub fn page_size_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.size_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Where the full preview image is drawn on one page. `y_mm` goes negative on
/// continuation pages so the visible window slides down the image; the
/// renderer clips to the margin box.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePlacement {
    pub page: usize,
    pub x_mm: f32,
    pub y_mm: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfLayout {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub content_width_mm: f32,
    pub content_height_mm: f32,
    /// Pixel size the preview should be captured at.
    pub raster_width_px: u32,
    pub raster_height_px: u32,
    pub pages: Vec<PagePlacement>,
}

impl PdfLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Plans the pages for a preview rendered at `image_width_px` × `image_height_px`.
///
/// The image is scaled to the content width; each page shows the next
/// `page height − 2 × margin` slice of it.
pub fn plan_pdf_layout(
    image_width_px: u32,
    image_height_px: u32,
    options: &PdfOptions,
) -> Result<PdfLayout, AppError> {
    if image_width_px == 0 || image_height_px == 0 {
        return Err(AppError::Validation(
            "Preview image has no area".to_string(),
        ));
    }
    if !(options.quality > 0.0) {
        return Err(AppError::Validation(format!(
            "Quality must be positive, got {}",
            options.quality
        )));
    }

    let (page_w, page_h) = options.page_size_mm();
    let margin = options.margin_mm;
    if margin < 0.0 || margin * 2.0 >= page_w || margin * 2.0 >= page_h {
        return Err(AppError::Validation(format!(
            "Margin of {margin}mm does not fit a {page_w}x{page_h}mm page"
        )));
    }

    let content_w = page_w - 2.0 * margin;
    let content_h = image_height_px as f32 * content_w / image_width_px as f32;
    let usable_h = page_h - 2.0 * margin;
    let page_count = ((content_h / usable_h).ceil() as usize).max(1);
    if page_count > MAX_PDF_PAGES {
        return Err(AppError::Validation(format!(
            "Preview would span {page_count} pages, the limit is {MAX_PDF_PAGES}"
        )));
    }

    let pages = (0..page_count)
        .map(|page| PagePlacement {
            page,
            x_mm: margin,
            y_mm: margin - page as f32 * usable_h,
        })
        .collect();

    Ok(PdfLayout {
        page_width_mm: page_w,
        page_height_mm: page_h,
        content_width_mm: content_w,
        content_height_mm: content_h,
        raster_width_px: (image_width_px as f32 * options.quality).round() as u32,
        raster_height_px: (image_height_px as f32 * options.quality).round() as u32,
        pages,
    })
}

/// `cv-<first>-<last>.pdf`, with `profile` standing in for a missing last name.
pub fn default_pdf_filename(info: &PersonalInfo) -> String {
    let last = if info.last_name.trim().is_empty() {
        "profile"
    } else {
        info.last_name.as_str()
    };
    let parts: Vec<String> = ["cv", info.first_name.as_str(), last]
        .iter()
        .map(|p| slug(p))
        .filter(|p| !p.is_empty())
        .collect();
    format!("{}.pdf", parts.join("-"))
}

fn slug(part: &str) -> String {
    part.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_preview_fits_one_page() {
        // 800x1000px scaled to 190mm wide is 237.5mm tall, under 277mm usable.
        let layout = plan_pdf_layout(800, 1000, &PdfOptions::default()).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.content_width_mm, 190.0);
        assert_eq!(layout.pages[0].y_mm, 10.0);
    }

    #[test]
    fn test_tall_preview_paginates() {
        // 200x600px → 190mm x 570mm, usable height 277mm → 3 pages.
        let layout = plan_pdf_layout(200, 600, &PdfOptions::default()).unwrap();
        assert_eq!(layout.page_count(), 3);
        assert_eq!(layout.content_height_mm, 570.0);
        assert_eq!(layout.pages[1].y_mm, 10.0 - 277.0);
        assert_eq!(layout.pages[2].y_mm, 10.0 - 554.0);
    }

    #[test]
    fn test_landscape_swaps_dimensions() {
        let options = PdfOptions {
            orientation: Orientation::Landscape,
            ..PdfOptions::default()
        };
        let layout = plan_pdf_layout(100, 100, &options).unwrap();
        assert_eq!(layout.page_width_mm, 297.0);
        assert_eq!(layout.page_height_mm, 210.0);
    }

    #[test]
    fn test_high_quality_doubles_raster() {
        let options = PdfOptions::from_dialog(ExportQuality::High, false);
        let layout = plan_pdf_layout(400, 500, &options).unwrap();
        assert_eq!(layout.raster_width_px, 800);
        assert_eq!(layout.raster_height_px, 1000);
        assert_eq!(layout.content_width_mm, 210.0);
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert!(plan_pdf_layout(0, 100, &PdfOptions::default()).is_err());
        let huge_margin = PdfOptions {
            margin_mm: 120.0,
            ..PdfOptions::default()
        };
        assert!(plan_pdf_layout(100, 100, &huge_margin).is_err());
    }

    #[test]
    fn test_rejects_preview_beyond_page_limit() {
        assert!(plan_pdf_layout(1, 20_000_000, &PdfOptions::default()).is_err());
        assert!(plan_pdf_layout(1, u32::MAX, &PdfOptions::default()).is_err());

        // 190mm wide at 1px means 190mm per pixel row; 100 pages hold 27700mm.
        let at_limit = plan_pdf_layout(1, 145, &PdfOptions::default()).unwrap();
        assert_eq!(at_limit.page_count(), MAX_PDF_PAGES);
        assert!(plan_pdf_layout(1, 146, &PdfOptions::default()).is_err());
    }

    #[test]
    fn test_default_filename() {
        let info = PersonalInfo {
            first_name: "Ada".to_string(),
            last_name: "King Lovelace".to_string(),
            ..PersonalInfo::default()
        };
        assert_eq!(default_pdf_filename(&info), "cv-Ada-King-Lovelace.pdf");
    }

    #[test]
    fn test_default_filename_without_names() {
        assert_eq!(
            default_pdf_filename(&PersonalInfo::default()),
            "cv-profile.pdf"
        );
    }
}
