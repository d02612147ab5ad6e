//! Error types and handling
//!
//! Common error types used across the application.

use crate::capture::CaptureError;
use crate::config::ConfigError;
use crate::output::SinkError;
use crate::preview::PreviewError;
use crate::recorder::RecordingError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run could not start: device, first frame or output directory unusable.
    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Recording error: {0}")]
    Recording(#[from] RecordingError),

    #[error("Output error: {0}")]
    Output(#[from] SinkError),

    #[error("Preview error: {0}")]
    Preview(#[from] PreviewError),
}

impl AppError {
    /// Short stable code, used in log fields.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Setup(_) => "SETUP_ERROR",
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::Recording(_) => "RECORDING_ERROR",
            AppError::Output(_) => "OUTPUT_ERROR",
            AppError::Preview(_) => "PREVIEW_ERROR",
        }
    }

    /// Whether the error happened before the frame loop started.
    pub fn is_setup(&self) -> bool {
        matches!(self, AppError::Setup(_) | AppError::Config(_))
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
