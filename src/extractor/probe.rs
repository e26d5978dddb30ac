//! Audio codec detection through `ffprobe`, used to pick an output extension.

use super::ffmpeg::{locate_tool, path_arg, run_tool, tool_name};
use crate::error::{AudioLeftError, Result};
use log::debug;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const FFPROBE: &str = "ffprobe";

/// Extension used when a codec has no better-known container.
pub const FALLBACK_EXTENSION: &str = "mka";

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CodecProbe {
    program: PathBuf,
}

impl CodecProbe {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(FFPROBE),
        }
    }

    pub fn with_program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    pub fn build_args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "a:0",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(path_arg(input));
        args
    }

    /// Codec name of the first audio stream, e.g. `aac` or `opus`.
    pub fn probe_audio_codec(&self, input: &Path) -> Result<String> {
        let program = locate_tool(&self.program)?;
        let output = run_tool(&program, &tool_name(&self.program), &self.build_args(input))?;
        let codec = parse_probe_output(&output.stdout, input)?;
        debug!("{} audio codec: {}", input.display(), codec);
        Ok(codec)
    }
}

impl Default for CodecProbe {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_probe_output(json: &str, input: &Path) -> Result<String> {
    let parsed: ProbeOutput = serde_json::from_str(json).map_err(|e| AudioLeftError::Probe {
        message: e.to_string(),
    })?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| AudioLeftError::NoAudioStream {
            path: input.display().to_string(),
        })?;

    Ok(stream.codec_name.unwrap_or_else(|| "unknown".to_string()))
}

/// File extension (without the dot) for a container that can hold `codec`
/// as-is.
pub fn extension_for_codec(codec: &str) -> &'static str {
    match codec {
        "aac" | "alac" => "m4a",
        "mp3" => "mp3",
        "opus" => "opus",
        "vorbis" => "ogg",
        "flac" => "flac",
        "pcm_s16le" | "pcm_s24le" | "pcm_s32le" => "wav",
        "ac3" => "ac3",
        "eac3" => "eac3",
        "dts" => "dts",
        "truehd" => "thd",
        _ => FALLBACK_EXTENSION,
    }
}
