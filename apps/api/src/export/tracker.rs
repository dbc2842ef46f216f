use serde::Serialize;

/// Progress of the export the user started last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTracker {
    pub is_exporting: bool,
    pub progress: u8,
    pub last_format: String,
}

impl Default for ExportTracker {
    fn default() -> Self {
        Self {
            is_exporting: false,
            progress: 0,
            last_format: "pdf".to_string(),
        }
    }
}

impl ExportTracker {
    pub fn start(&mut self, format: &str) {
        self.is_exporting = true;
        self.progress = 0;
        self.last_format = format.to_string();
    }

    pub fn finish(&mut self) {
        self.is_exporting = false;
        self.progress = 100;
    }

    /// Clears the in-progress state so the user can retry.
    pub fn fail(&mut self) {
        self.is_exporting = false;
        self.progress = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_export_can_restart() {
        let mut tracker = ExportTracker::default();
        tracker.start("pdf");
        assert_eq!(tracker.progress, 0);
        tracker.fail();
        assert!(!tracker.is_exporting);
        assert_eq!(tracker.progress, 0);
        tracker.start("pdf");
        assert!(tracker.is_exporting);
    }
}
