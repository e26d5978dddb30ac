use crate::error::{AudioLeftError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Config {
    pub output: OutputConfig,
    pub tools: ToolConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputConfig {
    /// Swap the derived output extension for one matching the probed codec.
    pub match_codec_extension: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(match_codec) = cli_args.match_codec_extension {
            self.output.match_codec_extension = match_codec;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tools.ffmpeg.trim().is_empty() {
            return Err(AudioLeftError::Config {
                message: "ffmpeg program name must not be empty".to_string(),
            });
        }

        if self.tools.ffprobe.trim().is_empty() {
            return Err(AudioLeftError::Config {
                message: "ffprobe program name must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub match_codec_extension: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_codec_extension(mut self, enabled: Option<bool>) -> Self {
        self.match_codec_extension = enabled;
        self
    }
}
