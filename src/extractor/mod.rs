pub mod ffmpeg;
pub mod input_validator;
pub mod output_path;
pub mod probe;
pub mod report;

pub use ffmpeg::{extract, ExtractionJob, ExtractionState, FfmpegExtractor};
pub use input_validator::validate_input;
pub use output_path::{ensure_parent_dir, resolve_output, OutputResolver, DEFAULT_OUTPUT_DIR};
pub use probe::{extension_for_codec, CodecProbe};
pub use report::ExtractionReport;
