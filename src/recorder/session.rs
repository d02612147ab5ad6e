//! One open recording

use crate::capture::Frame;
use crate::output::{ArtifactWriter, SinkError};
use crate::recorder::state::SessionSummary;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// An output artifact being written.
///
/// Exactly one exists while the recorder is in `Recording`.
pub struct RecordingSession {
    index: usize,
    path: PathBuf,
    dimensions: (u32, u32),
    fps: u32,
    started_at: DateTime<Local>,
    writer: Box<dyn ArtifactWriter>,
}

impl RecordingSession {
    pub fn new(
        index: usize,
        path: PathBuf,
        dimensions: (u32, u32),
        fps: u32,
        writer: Box<dyn ArtifactWriter>,
    ) -> Self {
        Self {
            index,
            path,
            dimensions,
            fps,
            started_at: Local::now(),
            writer,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.writer.frame_count()
    }

    pub fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        self.writer.write_frame(frame)
    }

    /// Flush and close the artifact
    pub fn close(mut self) -> Result<SessionSummary, SinkError> {
        self.writer.close()?;
        Ok(SessionSummary {
            index: self.index,
            path: self.path,
            frame_count: self.writer.frame_count(),
            started_at: self.started_at,
            ended_at: Local::now(),
        })
    }
}
