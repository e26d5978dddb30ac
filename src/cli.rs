use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "audioleft")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract audio from video files preserving the original codec")]
#[command(
    long_about = "AudioLeft copies the audio stream out of a video file with ffmpeg, \
                  without decoding or re-encoding it. ffmpeg must be installed and on your PATH."
)]
#[command(after_help = "EXAMPLES:\n  \
    audioleft --input movie.mp4\n  \
    audioleft --input movie.mp4 --output sound/movie.m4a\n  \
    audioleft --input lecture.mkv --match-codec --verbose\n  \
    audioleft --input clip.webm --dry-run")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Path to input video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to output audio file (defaults to audio_data/<input file name>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pick the default output extension from the probed audio codec
    #[arg(long, help = "Use an extension matching the audio codec (requires ffprobe)")]
    pub match_codec: bool,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show the ffmpeg command without running it")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::new();

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_match_codec_extension(self.match_codec.then_some(true))
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `log` filter for the current verbosity; `RUST_LOG` takes precedence.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "audioleft=error";
        }

        match self.verbose {
            0 => "audioleft=warn",
            1 => "audioleft=info",
            _ => "audioleft=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_input_only() {
        let cli = Cli::try_parse_from(["audioleft", "--input", "movie.mp4"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("movie.mp4"));
        assert!(cli.output.is_none());
        assert!(!cli.match_codec);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_parse_input_and_output() {
        let cli = Cli::try_parse_from([
            "audioleft",
            "-i",
            "movie.mp4",
            "-o",
            "out/movie.m4a",
            "--output-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(PathBuf::from("out/movie.m4a")));
        assert!(matches!(cli.output_format, OutputFormat::Json));
    }

    #[test]
    fn test_input_is_required() {
        let err = Cli::try_parse_from(["audioleft", "--output", "x.m4a"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["audioleft", "-i", "a.mp4", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_filter_follows_verbosity() {
        let mut cli = Cli::try_parse_from(["audioleft", "-i", "a.mp4"]).unwrap();
        assert_eq!(cli.log_filter(), "audioleft=warn");

        cli.verbose = 2;
        assert_eq!(cli.log_filter(), "audioleft=debug");
        assert_eq!(cli.verbosity_level(), 2);

        cli.verbose = 0;
        cli.quiet = true;
        assert_eq!(cli.log_filter(), "audioleft=error");
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_match_codec_flag_reaches_config() {
        let cli = Cli::try_parse_from(["audioleft", "-i", "a.mp4", "--match-codec"]).unwrap();
        let config = cli.load_config().unwrap();
        assert!(config.output.match_codec_extension);
    }
}
