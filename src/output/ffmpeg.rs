//! FFmpeg artifact writer
//!
//! Raw RGB frames are piped into an FFmpeg child process that encodes them
//! as XVID-tagged MPEG-4 in an AVI container.

use crate::capture::Frame;
use crate::output::types::{ArtifactSink, ArtifactWriter, SinkError};
use std::io::Write;
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};

/// Check that FFmpeg can be started at all
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Arguments for encoding `width`x`height` rgb24 frames from stdin into `output`
fn encoder_args(width: u32, height: u32, fps: u32, output: &str) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-loglevel", "error", "-f", "rawvideo", "-pixel_format", "rgb24"]
        .iter()
        .map(|arg| arg.to_string())
        .collect();
    args.extend([
        "-video_size".to_string(),
        format!("{width}x{height}"),
        "-framerate".to_string(),
        fps.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-c:v".to_string(),
        "mpeg4".to_string(),
        "-vtag".to_string(),
        "xvid".to_string(),
        "-q:v".to_string(),
        "5".to_string(),
        output.to_string(),
    ]);
    args
}

/// One recording being encoded by FFmpeg
pub struct FfmpegWriter {
    process: Option<Child>,
    stdin: Option<ChildStdin>,
    output: String,
    dimensions: (u32, u32),
    frame_count: u64,
}

impl FfmpegWriter {
    /// Start an encoder writing to `path`
    pub fn create(path: &Path, dimensions: (u32, u32), fps: u32) -> Result<Self, SinkError> {
        let output = path.to_string_lossy().to_string();
        let (width, height) = dimensions;

        let mut process = Command::new("ffmpeg")
            .args(encoder_args(width, height, fps, &output))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SinkError::Ffmpeg(format!("Failed to start FFmpeg encoder: {}", e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| SinkError::Ffmpeg("Failed to open FFmpeg stdin".to_string()))?;

        tracing::debug!(
            "Started FFmpeg encoder: {}x{} @ {}fps, output: {}",
            width,
            height,
            fps,
            output
        );

        Ok(Self {
            process: Some(process),
            stdin: Some(stdin),
            output,
            dimensions,
            frame_count: 0,
        })
    }
}

impl ArtifactWriter for FfmpegWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), SinkError> {
        if frame.dimensions() != self.dimensions {
            return Err(SinkError::DimensionMismatch {
                expected: self.dimensions,
                actual: frame.dimensions(),
            });
        }

        let stdin = self.stdin.as_mut().ok_or(SinkError::Closed)?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| SinkError::Encoding(format!("Failed to write frame: {}", e)))?;
        self.frame_count += 1;
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn close(&mut self) -> Result<(), SinkError> {
        // Closing stdin signals EOF to FFmpeg
        drop(self.stdin.take());

        let Some(process) = self.process.take() else {
            return Ok(());
        };

        let output = process
            .wait_with_output()
            .map_err(|e| SinkError::Ffmpeg(format!("Failed to wait for FFmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SinkError::Ffmpeg(format!(
                "FFmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(
            "FFmpeg encoder finished: {} frames, output: {}",
            self.frame_count,
            self.output
        );
        Ok(())
    }
}

impl Drop for FfmpegWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Failed to finish {}: {}", self.output, e);
        }
    }
}

/// Opens a new FFmpeg encoder per recording
#[derive(Debug)]
pub struct FfmpegSink;

impl FfmpegSink {
    /// Fails when FFmpeg cannot be run, so the problem shows up before the first recording
    pub fn new() -> Result<Self, SinkError> {
        if !ffmpeg_available() {
            return Err(SinkError::Ffmpeg(
                "FFmpeg not found. Please install FFmpeg and make sure it is on PATH".to_string(),
            ));
        }
        Ok(Self)
    }
}

impl ArtifactSink for FfmpegSink {
    fn open(
        &mut self,
        path: &Path,
        dimensions: (u32, u32),
        fps: u32,
    ) -> Result<Box<dyn ArtifactWriter>, SinkError> {
        Ok(Box::new(FfmpegWriter::create(path, dimensions, fps)?))
    }
}
