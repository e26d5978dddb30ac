use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Only known when the codec was probed (`--match-codec`).
    pub codec: Option<String>,
    pub output_size: u64,
    pub duration: Duration,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractionReport {
    pub fn display_summary(&self) -> String {
        let codec = self.codec.as_deref().unwrap_or("copied");
        format!(
            "{} -> {} ({}, {} bytes)",
            self.input.display(),
            self.output.display(),
            codec,
            self.output_size
        )
    }
}
