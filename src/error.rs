use thiserror::Error;

#[derive(Error, Debug)]
pub enum AudioLeftError {
    #[error("Input file not found: {path}")]
    NotFound { path: String },

    #[error("Input path is not a file: {path}")]
    InvalidInput { path: String },

    #[error("Failed to create output directory: {path}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} not found on the executable search path")]
    ToolNotFound { tool: String },

    #[error("{tool} failed ({}): {stderr}", exit_status_label(.exit_code))]
    ToolExecution {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("No audio stream found in: {path}")]
    NoAudioStream { path: String },

    #[error("Failed to parse ffprobe output: {message}")]
    Probe { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extraction task failed: {message}")]
    Task { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl AudioLeftError {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AudioLeftError::NotFound { .. } => 3,
            AudioLeftError::InvalidInput { .. } => 4,
            AudioLeftError::DirectoryCreation { .. } => 5,
            AudioLeftError::ToolNotFound { .. } => 6,
            AudioLeftError::ToolExecution { .. } => 7,
            AudioLeftError::NoAudioStream { .. } | AudioLeftError::Probe { .. } => 8,
            AudioLeftError::Cancelled => 130, // Interrupted (SIGINT)
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for AudioLeftError {
    fn user_message(&self) -> String {
        match self {
            AudioLeftError::NotFound { path } => {
                format!("Input file not found: {}", path)
            }
            AudioLeftError::InvalidInput { path } => {
                format!("Input path is not a regular file: {}", path)
            }
            AudioLeftError::DirectoryCreation { path, source } => {
                format!("Could not create output directory {}: {}", path, source)
            }
            AudioLeftError::ToolNotFound { tool } => {
                format!("{} not found. It must be installed and on your PATH.", tool)
            }
            AudioLeftError::ToolExecution {
                tool,
                exit_code,
                stderr,
            } => {
                let status = exit_status_label(exit_code);
                if stderr.is_empty() {
                    format!("{} failed ({})", tool, status)
                } else {
                    format!("{} failed ({}):\n{}", tool, status, stderr)
                }
            }
            AudioLeftError::NoAudioStream { path } => {
                format!("No audio stream found in: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            AudioLeftError::NotFound { .. } => Some(
                "Check the path passed to --input. Relative paths are resolved from the current directory.".to_string()
            ),
            AudioLeftError::InvalidInput { .. } => Some(
                "Pass a single video file to --input, not a directory.".to_string()
            ),
            AudioLeftError::DirectoryCreation { .. } => Some(
                "Ensure you have write permission for the output location, or choose another path with --output.".to_string()
            ),
            AudioLeftError::ToolNotFound { .. } => Some(
                "Install ffmpeg (e.g. `sudo apt-get install ffmpeg` or `brew install ffmpeg`) and make sure it is on your PATH.".to_string()
            ),
            AudioLeftError::ToolExecution { .. } => Some(
                "The input may have no audio stream, or the output extension may not support the source codec. Try an extension such as .mka.".to_string()
            ),
            AudioLeftError::NoAudioStream { .. } => Some(
                "The input does not contain any audio to extract.".to_string()
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AudioLeftError>;

fn exit_status_label(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
