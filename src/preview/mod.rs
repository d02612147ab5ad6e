//! Live preview
//!
//! Preview is a passive consumer: it is handed the annotated frame and the
//! difference image after each step and never feeds back into detection.
//! Its only input is the quit request it reports once per frame.

pub mod overlay;
pub mod terminal;

use image::GrayImage;
use thiserror::Error;

pub use overlay::{annotate, AnnotatedFrame, Status};
pub use terminal::TerminalPreview;

/// Preview errors
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// What the preview hands to the surface each frame
#[derive(Debug, Clone)]
pub struct PreviewFrames {
    /// Annotated live view
    pub live: AnnotatedFrame,
    /// Difference image against the previous frame
    pub motion: GrayImage,
}

/// A request to stop, coming from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitSignal {
    /// Quit key
    Quit,
    /// Interrupt (Ctrl+C)
    Interrupt,
}

/// Something that can show frames to the user
pub trait PreviewSurface {
    /// Display the latest frames
    fn show(&mut self, frames: &PreviewFrames) -> Result<(), PreviewError>;

    /// Check, without waiting long, whether the user asked to stop
    fn poll_quit(&mut self) -> Result<Option<QuitSignal>, PreviewError>;

    /// Tear the surface down. Safe to call more than once.
    fn close(&mut self);
}
