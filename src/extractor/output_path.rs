use crate::error::{AudioLeftError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory, relative to the working directory, that receives extracted audio
/// when no explicit output path is given.
pub const DEFAULT_OUTPUT_DIR: &str = "audio_data";

/// Decides where extracted audio goes and makes sure the parent directory exists.
#[derive(Debug, Clone)]
pub struct OutputResolver {
    default_dir: PathBuf,
}

impl OutputResolver {
    pub fn new() -> Self {
        Self {
            default_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    pub fn with_default_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.default_dir = dir.into();
        self
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    /// Computes the output path without touching the filesystem.
    ///
    /// An explicit path is returned unchanged. Otherwise the input's file name
    /// is placed under the default directory.
    pub fn output_path_for(&self, input: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }

        let file_name = input.file_name().ok_or_else(|| AudioLeftError::InvalidInput {
            path: input.display().to_string(),
        })?;

        Ok(self.default_dir.join(file_name))
    }

    /// Computes the output path and creates any missing ancestor directories.
    /// An existing file at the returned path is left alone; ffmpeg overwrites it.
    pub fn resolve(&self, input: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
        let output = self.output_path_for(input, explicit)?;
        ensure_parent_dir(&output)?;
        Ok(output)
    }
}

impl Default for OutputResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// `OutputResolver::resolve` against [`DEFAULT_OUTPUT_DIR`].
pub fn resolve_output(input: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    OutputResolver::new().resolve(input, explicit)
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    fs::create_dir_all(parent).map_err(|source| AudioLeftError::DirectoryCreation {
        path: parent.display().to_string(),
        source,
    })
}

/// Replaces the extension of `path` with `extension` (given without a dot).
pub fn with_codec_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_uses_input_file_name() {
        let resolver = OutputResolver::new();
        let output = resolver
            .output_path_for(Path::new("videos/holiday/movie.mp4"), None)
            .unwrap();
        assert_eq!(output, Path::new(DEFAULT_OUTPUT_DIR).join("movie.mp4"));
    }

    #[test]
    fn test_explicit_output_returned_unchanged() {
        let resolver = OutputResolver::new();
        let explicit = Path::new("../somewhere/else/track.m4a");
        let output = resolver
            .output_path_for(Path::new("movie.mp4"), Some(explicit))
            .unwrap();
        assert_eq!(output, explicit);
    }

    #[test]
    fn test_input_without_file_name_is_rejected() {
        let resolver = OutputResolver::new();
        let result = resolver.output_path_for(Path::new(".."), None);
        assert!(matches!(result, Err(AudioLeftError::InvalidInput { .. })));
    }

    #[test]
    fn test_resolve_creates_default_directory() {
        let temp_dir = TempDir::new().unwrap();
        let default_dir = temp_dir.path().join(DEFAULT_OUTPUT_DIR);
        let resolver = OutputResolver::new().with_default_dir(&default_dir);

        assert!(!default_dir.exists());
        let output = resolver.resolve(Path::new("movie.mp4"), None).unwrap();

        assert_eq!(output, default_dir.join("movie.mp4"));
        assert!(default_dir.is_dir());
        assert!(!output.exists());
    }

    #[test]
    fn test_resolve_creates_explicit_ancestors() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("a").join("b").join("c").join("out.mka");

        let output = OutputResolver::new()
            .resolve(Path::new("movie.mp4"), Some(&explicit))
            .unwrap();

        assert_eq!(output, explicit);
        assert!(temp_dir.path().join("a/b/c").is_dir());
    }

    #[test]
    fn test_resolve_is_idempotent_and_ignores_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("out").join("movie.m4a");
        let resolver = OutputResolver::new();

        resolver.resolve(Path::new("movie.mp4"), Some(&explicit)).unwrap();
        fs::write(&explicit, b"previous run").unwrap();

        let output = resolver.resolve(Path::new("movie.mp4"), Some(&explicit)).unwrap();
        assert_eq!(output, explicit);
        assert_eq!(fs::read(&explicit).unwrap(), b"previous run");
    }

    #[test]
    fn test_bare_file_name_needs_no_directory() {
        assert!(ensure_parent_dir(Path::new("track.m4a")).is_ok());
    }

    #[test]
    fn test_directory_creation_failure() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"a file where a directory should be").unwrap();

        let result = ensure_parent_dir(&blocker.join("nested").join("out.m4a"));
        assert!(matches!(
            result,
            Err(AudioLeftError::DirectoryCreation { .. })
        ));
    }

    #[test]
    fn test_with_codec_extension() {
        assert_eq!(
            with_codec_extension(Path::new("audio_data/movie.mp4"), "m4a"),
            Path::new("audio_data/movie.m4a")
        );
        assert_eq!(
            with_codec_extension(Path::new("audio_data/clip"), "opus"),
            Path::new("audio_data/clip.opus")
        );
    }
}
