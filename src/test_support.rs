//! In-memory stand-ins for the camera, the encoder and the preview

use crate::capture::{CaptureError, Frame, FrameSource, SourceInfo};
use crate::output::{ArtifactSink, ArtifactWriter, SinkError};
use crate::preview::{PreviewError, PreviewFrames, PreviewSurface, QuitSignal};
use image::Rgb;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub(crate) fn solid(width: u32, height: u32, value: u8) -> Frame {
    Frame::from_pixel(width, height, Rgb([value, value, value]))
}

/// One solid frame per value; consecutive values `a`, `b` score `w*h*|a-b|`
pub(crate) fn frames_from_values(width: u32, height: u32, values: &[u8]) -> Vec<Frame> {
    values.iter().map(|&v| solid(width, height, v)).collect()
}

/// Ordered record of open/close events across fakes
#[derive(Clone, Default)]
pub(crate) struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub(crate) fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ArtifactRecord {
    pub path: PathBuf,
    pub dimensions: (u32, u32),
    pub fps: u32,
    pub frames: u64,
    pub closed: bool,
    pub close_calls: u32,
    pub last_pixel: Option<[u8; 3]>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Sink that keeps artifacts in memory. Opening touches an empty file so
/// sequential naming sees it, as it would with FFmpeg.
#[derive(Clone)]
pub(crate) struct MemorySink {
    artifacts: Rc<RefCell<Vec<ArtifactRecord>>>,
    log: EventLog,
}

impl MemorySink {
    pub(crate) fn new(log: EventLog) -> Self {
        Self {
            artifacts: Rc::default(),
            log,
        }
    }

    pub(crate) fn artifacts(&self) -> Vec<ArtifactRecord> {
        self.artifacts.borrow().clone()
    }

    pub(crate) fn log(&self) -> &EventLog {
        &self.log
    }
}

impl ArtifactSink for MemorySink {
    fn open(
        &mut self,
        path: &Path,
        dimensions: (u32, u32),
        fps: u32,
    ) -> Result<Box<dyn ArtifactWriter>, SinkError> {
        std::fs::write(path, b"")?;
        self.log.push(format!("open {}", file_name(path)));

        let mut artifacts = self.artifacts.borrow_mut();
        artifacts.push(ArtifactRecord {
            path: path.to_path_buf(),
            dimensions,
            fps,
            frames: 0,
            closed: false,
            close_calls: 0,
            last_pixel: None,
        });

        Ok(Box::new(MemoryWriter {
            index: artifacts.len() - 1,
            artifacts: self.artifacts.clone(),
            log: self.log.clone(),
        }))
    }
}

struct MemoryWriter {
    index: usize,
    artifacts: Rc<RefCell<Vec<ArtifactRecord>>>,
    log: EventLog,
}

impl ArtifactWriter for MemoryWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let mut artifacts = self.artifacts.borrow_mut();
        let record = &mut artifacts[self.index];
        if record.closed {
            return Err(SinkError::Closed);
        }
        record.frames += 1;
        record.last_pixel = Some(frame.get_pixel(0, 0).0);
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.artifacts.borrow()[self.index].frames
    }

    fn close(&mut self) -> Result<(), SinkError> {
        let mut artifacts = self.artifacts.borrow_mut();
        let record = &mut artifacts[self.index];
        if !record.closed {
            record.closed = true;
            record.close_calls += 1;
            self.log.push(format!("close {}", file_name(&record.path)));
        }
        Ok(())
    }
}

/// Plays back a fixed list of frames, then ends or fails
pub(crate) struct ScriptedSource {
    info: SourceInfo,
    frames: VecDeque<Frame>,
    fail_at_end: bool,
    closed: bool,
    log: EventLog,
}

impl ScriptedSource {
    pub(crate) fn new(frames: Vec<Frame>, log: EventLog) -> Self {
        let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
        Self {
            info: SourceInfo {
                name: "scripted".to_string(),
                width,
                height,
                fps: Some(30.0),
            },
            frames: frames.into(),
            fail_at_end: false,
            closed: false,
            log,
        }
    }

    /// Report a read error instead of a clean end of stream
    pub(crate) fn failing_at_end(mut self) -> Self {
        self.fail_at_end = true;
        self
    }
}

impl FrameSource for ScriptedSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.closed {
            return Ok(None);
        }
        match self.frames.pop_front() {
            Some(frame) => Ok(Some(frame)),
            None if self.fail_at_end => Err(CaptureError::Read("device unplugged".to_string())),
            None => Ok(None),
        }
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.push("close source".to_string());
        }
    }
}

/// Counts shown frames and asks to stop after a given number
pub(crate) struct ScriptedPreview {
    shown: Rc<RefCell<Vec<String>>>,
    stop_after: Option<(usize, QuitSignal)>,
    log: EventLog,
}

impl ScriptedPreview {
    pub(crate) fn new(log: EventLog) -> Self {
        Self {
            shown: Rc::default(),
            stop_after: None,
            log,
        }
    }

    pub(crate) fn stopping_after(mut self, frames: usize, signal: QuitSignal) -> Self {
        self.stop_after = Some((frames, signal));
        self
    }

    /// Status labels of every frame shown so far
    pub(crate) fn shown(&self) -> Rc<RefCell<Vec<String>>> {
        self.shown.clone()
    }
}

impl PreviewSurface for ScriptedPreview {
    fn show(&mut self, frames: &PreviewFrames) -> Result<(), PreviewError> {
        self.shown
            .borrow_mut()
            .push(frames.live.status.label().to_string());
        Ok(())
    }

    fn poll_quit(&mut self) -> Result<Option<QuitSignal>, PreviewError> {
        Ok(match self.stop_after {
            Some((frames, signal)) if self.shown.borrow().len() >= frames => Some(signal),
            _ => None,
        })
    }

    fn close(&mut self) {
        self.log.push("close preview".to_string());
    }
}
