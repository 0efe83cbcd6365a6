//! Result formatting for terminal and machine consumption

use crate::error::Result;
use crate::models::SpeedResult;
use colored::Colorize;

/// Formats a speed test result as a human-readable line or JSON document
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    use_color: bool,
}

impl ResultFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// One-line human-readable summary
    pub fn format_human(&self, result: &SpeedResult) -> String {
        let ping = format!("{:.2} ms", result.ping_ms);
        let download = format!("{:.2} Mbps", result.download_mbps);
        let upload = format!("{:.2} Mbps", result.upload_mbps);

        if self.use_color {
            format!(
                "Ping: {} | Download: {} | Upload: {}",
                ping.cyan(),
                download.green(),
                upload.yellow()
            )
        } else {
            format!("Ping: {} | Download: {} | Upload: {}", ping, download, upload)
        }
    }

    /// Pretty-printed JSON document
    pub fn format_json(&self, result: &SpeedResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}
