use std::path::PathBuf;
use std::process::ExitStatus;

use image::error::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to process image: {0}")]
    Image(#[from] ImageError),
    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid image buffer returned by {0}")]
    InvalidImageBuffer(String),
    #[error("Upscaling operation failed: {0}")]
    UpscaleError(String),
    #[error("Failed to initialize {model} on device {device}: {reason}")]
    ModelInitialization { model: String, device: u32, reason: String },
    #[error("The model is not supported: {0}")]
    UnsupportedModel(String),
    #[error("FFmpeg is not available on this system: {0}")]
    FFmpegNotAvailable(String),
    #[error("FFmpeg failed while {stage} ({status}): {stderr}")]
    FfmpegFailed { stage: &'static str, status: ExitStatus, stderr: String },
    #[error("Input video not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("No frames were extracted from {}", .0.display())]
    NoFramesExtracted(PathBuf),
    #[error("Expected {expected} upscaled frames matching the extracted ones, found {found}")]
    FrameCountMismatch { expected: usize, found: usize },
    #[error("An upscale worker panicked")]
    WorkerPanicked,
    #[error("Argument cannot be empty: {0}")]
    EmptyArgument(String),
    #[error("Invalid argument provided: {0}")]
    InvalidArgument(String),
    #[error("Required argument is missing: {0}")]
    MissingArgument(String),
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

impl Error {
    /// Argument errors are answered with the usage text.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Error::EmptyArgument(_)
                | Error::InvalidArgument(_)
                | Error::MissingArgument(_)
                | Error::UnknownArgument(_)
        )
    }
}
