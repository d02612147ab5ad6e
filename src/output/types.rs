//! Output types
//!
//! The traits the recorder writes through, and their errors.

use crate::capture::Frame;
use std::path::Path;
use thiserror::Error;

/// Container extension every recording is written with
pub const ARTIFACT_EXTENSION: &str = "avi";

/// File name prefix of every recording
pub const ARTIFACT_PREFIX: &str = "recording";

/// Output errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Frame is {actual:?} but the recording is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("Recording already closed")]
    Closed,
}

/// One open output artifact.
///
/// `close` flushes everything written so far and may be called repeatedly;
/// only the first call does any work.
pub trait ArtifactWriter {
    /// Append a frame
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError>;

    /// Number of frames written so far
    fn frame_count(&self) -> u64;

    /// Flush and close the artifact
    fn close(&mut self) -> Result<(), SinkError>;
}

/// Opens new artifacts.
pub trait ArtifactSink {
    fn open(
        &mut self,
        path: &Path,
        dimensions: (u32, u32),
        fps: u32,
    ) -> Result<Box<dyn ArtifactWriter>, SinkError>;
}
