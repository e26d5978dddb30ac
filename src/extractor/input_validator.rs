use crate::error::{AudioLeftError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Checks that `input` names an existing regular file. Symlinks are followed,
/// so a dangling link reports `NotFound`.
pub fn validate_input(input: &Path) -> Result<()> {
    match fs::metadata(input) {
        Ok(metadata) if metadata.is_file() => Ok(()),
        Ok(_) => Err(AudioLeftError::InvalidInput {
            path: input.display().to_string(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AudioLeftError::NotFound {
            path: input.display().to_string(),
        }),
        Err(e) => Err(AudioLeftError::Io(e)),
    }
}
