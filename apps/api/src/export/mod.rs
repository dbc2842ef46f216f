// Exports: JSON backups of the live CV and PDF page planning for the preview.
// Rasterizing the preview itself happens in the browser.

pub mod backup;
pub mod handlers;
pub mod pdf;
pub mod tracker;

pub use tracker::ExportTracker;
