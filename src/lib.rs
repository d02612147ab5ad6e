//! Motion Recorder - records video only while something moves.
//!
//! Frames are read from a camera or video stream, compared against the
//! previous frame, and written to sequentially numbered AVI files while
//! motion lasts plus a configurable number of hold-over frames.

pub mod capture;
pub mod config;
pub mod detector;
pub mod motion;
pub mod output;
pub mod preview;
pub mod recorder;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

use capture::SourceId;
use config::DetectorConfig;
use detector::{MotionDetector, RunSummary};
use output::FfmpegSink;
use preview::{PreviewSurface, TerminalPreview};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use utils::{AppError, AppResult};

/// Open the configured source, output and preview, and run until the stream
/// ends, the user quits, or `interrupt` is set.
pub fn run(config: &DetectorConfig, interrupt: Arc<AtomicBool>) -> AppResult<RunSummary> {
    config.validate()?;
    detector::ensure_output_dir(&config.output_dir)?;

    let source_id = SourceId::parse(&config.source);
    tracing::info!("Opening {}", source_id);
    let source = capture::open_source(&source_id).map_err(|e| AppError::Setup(e.to_string()))?;

    let sink = FfmpegSink::new().map_err(|e| AppError::Setup(e.to_string()))?;

    let preview: Option<Box<dyn PreviewSurface>> = if config.preview {
        let surface = TerminalPreview::new()
            .map_err(|e| AppError::Setup(format!("Could not start preview: {e}")))?;
        Some(Box::new(surface))
    } else {
        None
    };

    let mut detector = MotionDetector::new(config, source, Box::new(sink), preview, interrupt)?;
    detector.run()
}
