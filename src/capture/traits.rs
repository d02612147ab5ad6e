//! Capture trait definitions
//!
//! Source-agnostic types shared by every frame source.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One captured frame: tightly packed 8-bit RGB.
pub type Frame = image::RgbImage;

/// Capture errors
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Failed to read frame: {0}")]
    Read(String),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

/// What to capture from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum SourceId {
    /// Camera by index
    Device(u32),
    /// Video file or stream URL, decoded through FFmpeg
    Stream(String),
}

impl SourceId {
    /// Integers select a camera, anything else is a file or URL
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<u32>() {
            Ok(index) => SourceId::Device(index),
            Err(_) => SourceId::Stream(raw.to_string()),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Device(index) => write!(f, "camera {index}"),
            SourceId::Stream(location) => write!(f, "stream {location}"),
        }
    }
}

/// Information about an opened source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Human readable name
    pub name: String,

    /// Native width in pixels
    pub width: u32,

    /// Native height in pixels
    pub height: u32,

    /// Native frame rate (if known)
    pub fps: Option<f64>,
}

/// Information about a camera/webcam
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraInfo {
    /// Unique device ID
    pub id: String,

    /// Device name
    pub name: String,
}

/// A source of frames.
///
/// `read_frame` returns `Ok(None)` at end of stream. `close` releases the
/// device and must be safe to call more than once.
pub trait FrameSource {
    /// Native properties of the opened source
    fn info(&self) -> &SourceInfo;

    /// Block until the next frame is available
    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Release the underlying device
    fn close(&mut self);
}
