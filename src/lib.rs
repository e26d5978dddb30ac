pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, OutputConfig, ToolConfig};
pub use error::{AudioLeftError, Result, UserFriendlyError};

// Core functionality re-exports
pub use extractor::{
    extract, extension_for_codec, resolve_output, validate_input, CodecProbe, ExtractionJob,
    ExtractionReport, ExtractionState, FfmpegExtractor, OutputResolver, DEFAULT_OUTPUT_DIR,
};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode};

use chrono::Utc;
use log::debug;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::task;

/// Main library interface for AudioLeft functionality
pub struct AudioLeft {
    config: Config,
    output_formatter: OutputFormatter,
    shutdown: GracefulShutdown,
    resolver: OutputResolver,
}

/// What an extraction would do, computed without touching the output side.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub codec: Option<String>,
    pub command: String,
    /// Resolved ffmpeg binary, if it could be found.
    pub ffmpeg: Option<PathBuf>,
}

impl AudioLeft {
    /// Create a new AudioLeft instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            shutdown,
            resolver: OutputResolver::new(),
        })
    }

    /// Create an instance that leaves Ctrl+C handling to the host process.
    pub fn without_signal_handler(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
    ) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            shutdown: GracefulShutdown::without_handler(),
            resolver: OutputResolver::new(),
        }
    }

    /// Create AudioLeft instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    pub fn with_output_resolver(mut self, resolver: OutputResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Validate the input, resolve the output location and stream-copy the
    /// audio with ffmpeg.
    pub async fn extract_audio(
        &self,
        input: &Path,
        explicit_output: Option<&Path>,
    ) -> Result<ExtractionReport> {
        self.shutdown.check_shutdown()?;

        // Step 1: Validate input
        validate_input(input)?;

        // Step 2: Resolve output path and create its directory
        let codec = self.probe_codec(input, explicit_output).await?;
        let output = self.planned_output(input, explicit_output, codec.as_deref())?;
        extractor::ensure_parent_dir(&output)?;
        self.shutdown.check_shutdown()?;

        self.output_formatter.field("Input", &input.display().to_string());
        self.output_formatter.field("Output", &output.display().to_string());
        if let Some(ref codec) = codec {
            self.output_formatter.info(&format!("Detected audio codec: {}", codec));
        }
        self.output_formatter.step("Extracting audio...");

        // Step 3: Run ffmpeg
        let start_time = Instant::now();
        let extractor = self.ffmpeg();
        let mut job = ExtractionJob::new(input, &output);
        let (job, outcome) = task::spawn_blocking(move || {
            let outcome = job.run(&extractor);
            (job, outcome)
        })
        .await
        .map_err(|e| AudioLeftError::Task {
            message: e.to_string(),
        })?;

        debug!("extraction finished in state {:?}", job.state());
        self.shutdown.settle(outcome)?;

        let output_size = std::fs::metadata(&output).map(|m| m.len()).unwrap_or(0);
        let report = ExtractionReport {
            input: input.to_path_buf(),
            output,
            codec,
            output_size,
            duration: start_time.elapsed(),
            extracted_at: Utc::now(),
        };

        self.output_formatter.debug(&report.display_summary());
        self.output_formatter
            .success("Audio extraction completed successfully!");

        Ok(report)
    }

    /// Validate the input and work out the output path and command without
    /// creating directories or running ffmpeg.
    pub async fn plan(
        &self,
        input: &Path,
        explicit_output: Option<&Path>,
    ) -> Result<ExtractionPlan> {
        validate_input(input)?;

        let codec = self.probe_codec(input, explicit_output).await?;
        let output = self.planned_output(input, explicit_output, codec.as_deref())?;
        let extractor = self.ffmpeg();

        Ok(ExtractionPlan {
            command: extractor.command_line(input, &output),
            ffmpeg: extractor.locate().ok(),
            input: input.to_path_buf(),
            output,
            codec,
        })
    }

    /// Probe the audio codec when the derived output should carry a matching
    /// extension. Explicit outputs are never rewritten, so no probe is needed.
    async fn probe_codec(
        &self,
        input: &Path,
        explicit_output: Option<&Path>,
    ) -> Result<Option<String>> {
        if !self.config.output.match_codec_extension || explicit_output.is_some() {
            return Ok(None);
        }

        let probe = CodecProbe::new().with_program(&self.config.tools.ffprobe);
        let input = input.to_path_buf();
        let codec = task::spawn_blocking(move || probe.probe_audio_codec(&input))
            .await
            .map_err(|e| AudioLeftError::Task {
                message: e.to_string(),
            })?;

        self.shutdown.settle(codec).map(Some)
    }

    fn planned_output(
        &self,
        input: &Path,
        explicit_output: Option<&Path>,
        codec: Option<&str>,
    ) -> Result<PathBuf> {
        let output = self.resolver.output_path_for(input, explicit_output)?;

        Ok(match (explicit_output, codec) {
            (None, Some(codec)) => {
                extractor::output_path::with_codec_extension(&output, extension_for_codec(codec))
            }
            _ => output,
        })
    }

    fn ffmpeg(&self) -> FfmpegExtractor {
        FfmpegExtractor::new().with_program(&self.config.tools.ffmpeg)
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &AudioLeftError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AudioLeft {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
