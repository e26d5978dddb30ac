//! Stream-copy invocation of the external `ffmpeg` binary.

use crate::error::{AudioLeftError, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

pub const FFMPEG: &str = "ffmpeg";

/// Lifecycle of a single extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ExtractionState {
    NotStarted,
    Running,
    Succeeded,
    Failed { reason: String },
}

impl ExtractionState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            ExtractionState::Succeeded | ExtractionState::Failed { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: PathBuf,
}

impl FfmpegExtractor {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(FFMPEG),
        }
    }

    pub fn with_program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments that copy the first audio stream of `input` into `output`
    /// untouched, overwriting `output` if it exists.
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-y", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(path_arg(input));
        args.extend(
            ["-map", "0:a:0", "-vn", "-sn", "-dn", "-c:a", "copy"]
                .iter()
                .map(OsString::from),
        );
        args.push(path_arg(output));
        args
    }

    /// Shell-style rendering of the command, for display only.
    pub fn command_line(&self, input: &Path, output: &Path) -> String {
        std::iter::once(self.program.as_os_str().to_os_string())
            .chain(self.build_args(input, output))
            .map(|arg| quote_arg(&arg.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Finds the binary on `PATH` (or checks an explicit path).
    pub fn locate(&self) -> Result<PathBuf> {
        locate_tool(&self.program)
    }

    /// Runs ffmpeg once and waits for it to exit.
    pub fn extract(&self, input: &Path, output: &Path) -> Result<()> {
        let program = self.locate()?;
        let args = self.build_args(input, output);
        debug!("running {}", self.command_line(input, output));

        let result = run_tool(&program, &self.tool_name(), &args)?;
        if !result.stdout.is_empty() {
            debug!("ffmpeg stdout: {}", result.stdout.trim_end());
        }

        Ok(())
    }

    fn tool_name(&self) -> String {
        tool_name(&self.program)
    }
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stream-copies the audio of `input` into `output` with the `ffmpeg` on `PATH`.
pub fn extract(input: &Path, output: &Path) -> Result<()> {
    FfmpegExtractor::new().extract(input, output)
}

/// One input/output pair and the state of its extraction.
#[derive(Debug, Clone)]
pub struct ExtractionJob {
    input: PathBuf,
    output: PathBuf,
    state: ExtractionState,
}

impl ExtractionJob {
    pub fn new<I: Into<PathBuf>, O: Into<PathBuf>>(input: I, output: O) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            state: ExtractionState::NotStarted,
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn state(&self) -> &ExtractionState {
        &self.state
    }

    /// Runs the job exactly once. A finished job is not re-run.
    pub fn run(&mut self, extractor: &FfmpegExtractor) -> Result<()> {
        if self.state.is_finished() {
            return Err(AudioLeftError::Task {
                message: format!("extraction of {} already ran", self.input.display()),
            });
        }

        self.state = ExtractionState::Running;
        info!(
            "extracting audio from {} to {}",
            self.input.display(),
            self.output.display()
        );

        match extractor.extract(&self.input, &self.output) {
            Ok(()) => {
                self.state = ExtractionState::Succeeded;
                Ok(())
            }
            Err(e) => {
                warn!("extraction failed: {}", e);
                self.state = ExtractionState::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }
}

pub(crate) struct ToolOutput {
    pub stdout: String,
}

pub(crate) fn locate_tool(program: &Path) -> Result<PathBuf> {
    which::which(program).map_err(|e| {
        debug!("could not locate {}: {}", program.display(), e);
        AudioLeftError::ToolNotFound {
            tool: tool_name(program),
        }
    })
}

/// Runs `program` to completion with captured output. Non-zero exit becomes
/// `ToolExecution` carrying the trimmed stderr.
pub(crate) fn run_tool(program: &Path, tool: &str, args: &[OsString]) -> Result<ToolOutput> {
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => AudioLeftError::ToolNotFound {
                tool: tool.to_string(),
            },
            _ => AudioLeftError::Io(e),
        })?;

    if !output.status.success() {
        return Err(AudioLeftError::ToolExecution {
            tool: tool.to_string(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(ToolOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
    })
}

/// A path as ffmpeg should see it. A relative path whose first component
/// starts with `-` would be read as an option, and one containing `:` as a
/// protocol prefix such as `file:` or `http:`, so both get a leading `./`.
pub(crate) fn path_arg(path: &Path) -> OsString {
    let ambiguous = match path.components().next() {
        Some(Component::Normal(first)) => {
            let first = first.to_string_lossy();
            first.starts_with('-') || first.contains(':')
        }
        _ => false,
    };

    if ambiguous {
        Path::new(".").join(path).into_os_string()
    } else {
        path.as_os_str().to_os_string()
    }
}

pub(crate) fn tool_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| program.display().to_string())
}

fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '$' | '`' | '\\' | '*' | '?'));

    if needs_quotes {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args_as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().to_string()).collect()
    }

    #[test]
    fn test_build_args_copies_audio_only() {
        let extractor = FfmpegExtractor::new();
        let args = args_as_strings(
            &extractor.build_args(Path::new("in/movie.mp4"), Path::new("audio_data/movie.mp4")),
        );

        assert_eq!(
            args,
            vec![
                "-v",
                "error",
                "-nostdin",
                "-y",
                "-i",
                "in/movie.mp4",
                "-map",
                "0:a:0",
                "-vn",
                "-sn",
                "-dn",
                "-c:a",
                "copy",
                "audio_data/movie.mp4",
            ]
        );
    }

    #[test]
    fn test_colon_and_dash_names_are_not_misread() {
        let extractor = FfmpegExtractor::new();
        let input = Path::new("part1:intro.mp4");
        let output = Path::new("-take2.m4a");
        let args = args_as_strings(&extractor.build_args(input, output));

        let input_at = args.iter().position(|a| a == "-i").unwrap() + 1;
        assert_eq!(
            Path::new(&args[input_at]),
            Path::new(".").join("part1:intro.mp4")
        );
        assert_eq!(
            Path::new(args.last().unwrap()),
            Path::new(".").join("-take2.m4a")
        );

        let line = extractor.command_line(input, output);
        assert!(line.contains("part1:intro.mp4"));
        assert!(line.contains("-take2.m4a"));
    }

    #[test]
    fn test_path_arg_leaves_ordinary_paths_alone() {
        assert_eq!(path_arg(Path::new("movie.mp4")), OsString::from("movie.mp4"));
        assert_eq!(
            path_arg(Path::new("audio_data/movie.mp4")),
            OsString::from("audio_data/movie.mp4")
        );
        assert_eq!(
            path_arg(Path::new("clips/-take2.m4a")),
            OsString::from("clips/-take2.m4a")
        );
        assert_eq!(
            path_arg(Path::new("./-take2.m4a")),
            OsString::from("./-take2.m4a")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_path_arg_absolute_paths_untouched() {
        assert_eq!(
            path_arg(Path::new("/media/part1:intro.mp4")),
            OsString::from("/media/part1:intro.mp4")
        );
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let extractor = FfmpegExtractor::new();
        let line = extractor.command_line(Path::new("my movie.mp4"), Path::new("out.m4a"));
        assert!(line.starts_with("ffmpeg -v error"));
        assert!(line.contains("'my movie.mp4'"));
        assert!(line.ends_with("out.m4a"));
    }

    #[test]
    fn test_quote_arg() {
        assert_eq!(quote_arg("plain"), "plain");
        assert_eq!(quote_arg(""), "''");
        assert_eq!(quote_arg("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_tool_name_from_path() {
        assert_eq!(tool_name(Path::new("/usr/local/bin/ffmpeg")), "ffmpeg");
        assert_eq!(tool_name(Path::new("ffprobe")), "ffprobe");
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let extractor =
            FfmpegExtractor::new().with_program(temp_dir.path().join("no-such-ffmpeg"));

        let err = extractor
            .extract(Path::new("movie.mp4"), Path::new("out.m4a"))
            .unwrap_err();
        match err {
            AudioLeftError::ToolNotFound { tool } => assert_eq!(tool, "no-such-ffmpeg"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_job_starts_not_started() {
        let job = ExtractionJob::new("movie.mp4", "audio_data/movie.mp4");
        assert_eq!(job.state(), &ExtractionState::NotStarted);
        assert!(!job.state().is_finished());
        assert_eq!(job.output(), Path::new("audio_data/movie.mp4"));
    }

    #[test]
    fn test_job_records_failure_reason() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = FfmpegExtractor::new().with_program(temp_dir.path().join("absent"));
        let mut job = ExtractionJob::new("movie.mp4", temp_dir.path().join("out.m4a"));

        assert!(job.run(&extractor).is_err());
        match job.state() {
            ExtractionState::Failed { reason } => assert!(reason.contains("absent")),
            other => panic!("unexpected state: {:?}", other),
        }

        // Terminal state: no retry.
        assert!(matches!(
            job.run(&extractor),
            Err(AudioLeftError::Task { .. })
        ));
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let json = serde_json::to_value(ExtractionState::Failed {
            reason: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["state"], "failed");
        assert_eq!(json["reason"], "boom");
    }

    #[cfg(unix)]
    fn fake_tool(dir: &Path, name: &str, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_run_writes_output() {
        let temp_dir = TempDir::new().unwrap();
        let program = fake_tool(
            temp_dir.path(),
            "ffmpeg",
            "for last; do :; done\nprintf 'copied' > \"$last\"",
        );
        let output = temp_dir.path().join("out.m4a");

        let extractor = FfmpegExtractor::new().with_program(&program);
        let mut job = ExtractionJob::new(temp_dir.path().join("movie.mp4"), &output);
        job.run(&extractor).unwrap();

        assert_eq!(job.state(), &ExtractionState::Succeeded);
        assert_eq!(fs::read(&output).unwrap(), b"copied");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_carries_code_and_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let program = fake_tool(
            temp_dir.path(),
            "ffmpeg",
            "echo \"Stream map '0:a:0' matches no streams.\" >&2\nexit 234",
        );

        let extractor = FfmpegExtractor::new().with_program(&program);
        let err = extractor
            .extract(Path::new("movie.mp4"), &temp_dir.path().join("out.m4a"))
            .unwrap_err();

        match err {
            AudioLeftError::ToolExecution {
                tool,
                exit_code,
                stderr,
            } => {
                assert_eq!(tool, "ffmpeg");
                assert_eq!(exit_code, Some(234));
                assert_eq!(stderr, "Stream map '0:a:0' matches no streams.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
