//! Detection loop
//!
//! Reads a frame, runs it through the controller, hands the result to the
//! preview and checks for a stop request, once per iteration. Every exit
//! path goes through `cleanup`, which closes the open recording before the
//! capture device is released.

use crate::capture::FrameSource;
use crate::config::DetectorConfig;
use crate::output::ArtifactSink;
use crate::preview::{PreviewSurface, QuitSignal};
use crate::recorder::{ControllerConfig, RecordingController, SessionSummary};
use crate::utils::{AppError, AppResult};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The source ran out of frames or failed to deliver one
    EndOfStream,
    /// The user pressed the quit key
    Quit,
    /// Ctrl+C
    Interrupted,
}

/// What a finished run did
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub frames_processed: u64,
    pub motion_frames: u64,
    pub sessions: Vec<SessionSummary>,
    pub stop_reason: StopReason,
}

/// Create the output directory if needed
pub fn ensure_output_dir(dir: &Path) -> AppResult<()> {
    fs::create_dir_all(dir).map_err(|e| {
        AppError::Setup(format!(
            "Could not create output directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    if !dir.is_dir() {
        return Err(AppError::Setup(format!(
            "Output path is not a directory: {}",
            dir.display()
        )));
    }
    Ok(())
}

/// A running motion detector and the resources it owns
pub struct MotionDetector {
    source: Box<dyn FrameSource>,
    controller: RecordingController,
    preview: Option<Box<dyn PreviewSurface>>,
    interrupt: Arc<AtomicBool>,
    threshold: u64,
    frames_processed: u64,
    motion_frames: u64,
    cleaned_up: bool,
}

impl MotionDetector {
    /// Prepare the output directory and read the first frame.
    ///
    /// The source, sink and preview are already open; if setup fails they
    /// are released when dropped.
    pub fn new(
        config: &DetectorConfig,
        mut source: Box<dyn FrameSource>,
        sink: Box<dyn ArtifactSink>,
        preview: Option<Box<dyn PreviewSurface>>,
        interrupt: Arc<AtomicBool>,
    ) -> AppResult<Self> {
        ensure_output_dir(&config.output_dir)?;

        let first = match source.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                return Err(AppError::Setup(format!(
                    "Could not read from {}: no frames",
                    source.info().name
                )))
            }
            Err(e) => {
                return Err(AppError::Setup(format!(
                    "Could not read from {}: {}",
                    source.info().name,
                    e
                )))
            }
        };

        let mut controller = RecordingController::new(ControllerConfig::from(config), sink);
        controller.on_frame(first)?;

        Ok(Self {
            source,
            controller,
            preview,
            interrupt,
            threshold: config.threshold,
            frames_processed: 1,
            motion_frames: 0,
            cleaned_up: false,
        })
    }

    /// Run until the stream ends or the user stops it, then clean up
    pub fn run(&mut self) -> AppResult<RunSummary> {
        tracing::info!("Motion detection started (threshold={})", self.threshold);

        let result = self.run_loop();
        let cleanup = self.cleanup();

        let stop_reason = match (result, cleanup) {
            (Ok(reason), Ok(())) => reason,
            (Err(e), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    tracing::error!("Cleanup failed: {}", cleanup_error);
                }
                return Err(e);
            }
            (Ok(_), Err(e)) => return Err(e),
        };

        tracing::info!(
            "Motion detection stopped ({:?}): {} frames, {} with motion, {} recordings",
            stop_reason,
            self.frames_processed,
            self.motion_frames,
            self.controller.completed_sessions().len()
        );

        Ok(RunSummary {
            frames_processed: self.frames_processed,
            motion_frames: self.motion_frames,
            sessions: self.controller.completed_sessions().to_vec(),
            stop_reason,
        })
    }

    fn run_loop(&mut self) -> AppResult<StopReason> {
        loop {
            if self.interrupt.load(Ordering::SeqCst) {
                return Ok(StopReason::Interrupted);
            }

            let frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    tracing::info!("End of stream: {}", self.source.info().name);
                    return Ok(StopReason::EndOfStream);
                }
                Err(e) => {
                    tracing::warn!("Could not read frame, stopping: {}", e);
                    return Ok(StopReason::EndOfStream);
                }
            };

            let outcome = self.controller.on_frame(frame)?;
            self.frames_processed += 1;
            if outcome.motion_detected {
                self.motion_frames += 1;
            }

            if let Some(preview) = self.preview.as_mut() {
                if let Some(frames) = outcome.preview.as_ref() {
                    preview.show(frames)?;
                }
                match preview.poll_quit()? {
                    Some(QuitSignal::Quit) => return Ok(StopReason::Quit),
                    Some(QuitSignal::Interrupt) => return Ok(StopReason::Interrupted),
                    None => {}
                }
            }
        }
    }

    /// Release everything exactly once: recording, then device, then preview
    fn cleanup(&mut self) -> AppResult<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        let closed = self.controller.shutdown();
        self.source.close();
        if let Some(preview) = self.preview.as_mut() {
            preview.close();
        }

        closed?;
        Ok(())
    }
}

impl Drop for MotionDetector {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::error!("Cleanup failed: {}", e);
        }
    }
}
