//! Recording controller
//!
//! Owns the per-frame pipeline: estimate motion against the previous frame,
//! advance the hold-over state machine, open/close recordings, write the
//! frame, and build the preview.

use crate::capture::Frame;
use crate::config::{DetectorConfig, RECORDING_FPS};
use crate::motion::{self, MotionError, MotionScore};
use crate::output::{self, ArtifactSink, SinkError, ARTIFACT_EXTENSION, ARTIFACT_PREFIX};
use crate::preview::{self, PreviewFrames};
use crate::recorder::session::RecordingSession;
use crate::recorder::state::{HoldOver, RecordingState, SessionSummary, Transition};
use chrono::Local;
use std::path::PathBuf;
use thiserror::Error;

/// Recording errors
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("Motion estimation failed: {0}")]
    Motion(#[from] MotionError),

    #[error("Output failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Could not name the next recording in {dir:?}: {source}")]
    Naming {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The subset of the detector configuration the controller needs
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub threshold: u64,
    pub hold_over_frames: u32,
    pub output_dir: PathBuf,
    pub preview: bool,
    pub fps: u32,
}

impl From<&DetectorConfig> for ControllerConfig {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            threshold: config.threshold,
            hold_over_frames: config.hold_over_frames,
            output_dir: config.output_dir.clone(),
            preview: config.preview,
            fps: RECORDING_FPS,
        }
    }
}

/// What happened to one frame
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    /// `None` for the first frame, which has nothing to compare against
    pub score: Option<MotionScore>,
    pub motion_detected: bool,
    /// Whether the frame went into the recording
    pub is_writing: bool,
    pub transition: Transition,
    /// Present when preview is enabled and a score was computed
    pub preview: Option<PreviewFrames>,
}

impl FrameOutcome {
    fn bootstrap() -> Self {
        Self {
            score: None,
            motion_detected: false,
            is_writing: false,
            transition: Transition::None,
            preview: None,
        }
    }
}

/// Per-frame recording state machine plus the open recording
pub struct RecordingController {
    config: ControllerConfig,
    sink: Box<dyn ArtifactSink>,
    previous: Option<Frame>,
    hold_over: HoldOver,
    session: Option<RecordingSession>,
    sessions_opened: usize,
    completed: Vec<SessionSummary>,
}

impl RecordingController {
    pub fn new(config: ControllerConfig, sink: Box<dyn ArtifactSink>) -> Self {
        let hold_over = HoldOver::new(config.hold_over_frames);
        Self {
            config,
            sink,
            previous: None,
            hold_over,
            session: None,
            sessions_opened: 0,
            completed: Vec::new(),
        }
    }

    pub fn state(&self) -> RecordingState {
        self.hold_over.state()
    }

    pub fn active_session(&self) -> Option<&RecordingSession> {
        self.session.as_ref()
    }

    /// Recordings closed so far, oldest first
    pub fn completed_sessions(&self) -> &[SessionSummary] {
        &self.completed
    }

    /// Process one frame. The frame becomes the new previous frame.
    pub fn on_frame(&mut self, frame: Frame) -> Result<FrameOutcome, RecordingError> {
        let Some(previous) = self.previous.as_ref() else {
            self.previous = Some(frame);
            return Ok(FrameOutcome::bootstrap());
        };

        let estimate = motion::estimate(previous, &frame)?;
        let motion_detected = estimate.score.exceeds(self.config.threshold);
        let step = self.hold_over.step(motion_detected);

        match step.transition {
            Transition::Start => self.open_session(frame.dimensions())?,
            Transition::Stop => self.close_session()?,
            Transition::None => {}
        }

        if step.is_writing {
            if let Some(session) = self.session.as_mut() {
                session.write_frame(&frame)?;
            }
        }

        tracing::trace!(
            score = estimate.score.value(),
            motion = motion_detected,
            writing = step.is_writing,
            "frame processed"
        );

        let preview = self.config.preview.then(|| PreviewFrames {
            live: preview::annotate(&frame, step.is_writing, Local::now()),
            motion: estimate.diff,
        });

        self.previous = Some(frame);

        Ok(FrameOutcome {
            score: Some(estimate.score),
            motion_detected,
            is_writing: step.is_writing,
            transition: step.transition,
            preview,
        })
    }

    /// Close the open recording, if any. Safe to call more than once.
    pub fn shutdown(&mut self) -> Result<Option<SessionSummary>, RecordingError> {
        self.hold_over.reset();
        if self.session.is_none() {
            return Ok(None);
        }
        self.close_session()?;
        Ok(self.completed.last().cloned())
    }

    fn open_session(&mut self, dimensions: (u32, u32)) -> Result<(), RecordingError> {
        // A leftover session would mean two open artifacts; close it first
        if self.session.is_some() {
            tracing::warn!("Recording still open when a new one started, closing it");
            self.close_session()?;
        }

        let dir = &self.config.output_dir;
        let path = output::next_artifact_path(dir, ARTIFACT_PREFIX, ARTIFACT_EXTENSION).map_err(
            |source| RecordingError::Naming {
                dir: dir.clone(),
                source,
            },
        )?;

        let writer = self.sink.open(&path, dimensions, self.config.fps)?;
        tracing::info!("Recording started: {}", path.display());

        self.session = Some(RecordingSession::new(
            self.sessions_opened,
            path,
            dimensions,
            self.config.fps,
            writer,
        ));
        self.sessions_opened += 1;
        Ok(())
    }

    fn close_session(&mut self) -> Result<(), RecordingError> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        let summary = session.close()?;
        tracing::info!(
            "Recording stopped: {} ({} frames, {}ms)",
            summary.path.display(),
            summary.frame_count,
            summary.duration_ms()
        );
        self.completed.push(summary);
        Ok(())
    }
}
