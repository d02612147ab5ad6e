//! Video file and network stream capture through FFmpeg
//!
//! FFmpeg decodes the source to raw RGB frames on stdout, one frame per
//! `width * height * 3` bytes.

use crate::capture::traits::{CaptureError, Frame, FrameSource, SourceInfo};
use std::io::{BufReader, Read};
use std::process::{Child, ChildStdout, Command, Stdio};

/// Frames decoded from a file or URL by an FFmpeg child process
pub struct StreamSource {
    process: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    info: SourceInfo,
    frame_size: usize,
    frames_read: u64,
}

impl StreamSource {
    /// Probe `location` and start decoding it
    pub fn open(location: &str) -> Result<Self, CaptureError> {
        let (width, height, fps) = probe_stream(location)?;

        tracing::info!(
            "Opening stream decoder for {}: {}x{} @ {:.2}fps",
            location,
            width,
            height,
            fps
        );

        // -s pins the output size so frames are never padded
        let mut process = Command::new("ffmpeg")
            .args([
                "-loglevel",
                "error",
                "-i",
                location,
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", width, height),
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CaptureError::Ffmpeg(format!("Failed to start FFmpeg decoder: {}", e)))?;

        let frame_size = (width * height * 3) as usize;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| CaptureError::Ffmpeg("Failed to capture FFmpeg stdout".to_string()))?;

        Ok(Self {
            process: Some(process),
            stdout: Some(BufReader::with_capacity(frame_size * 2, stdout)),
            info: SourceInfo {
                name: location.to_string(),
                width,
                height,
                fps: Some(fps),
            },
            frame_size,
            frames_read: 0,
        })
    }

    /// Number of frames read so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }
}

impl FrameSource for StreamSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buffer = vec![0u8; self.frame_size];
        match stdout.read_exact(&mut buffer) {
            Ok(()) => {
                self.frames_read += 1;
                let frame = Frame::from_raw(self.info.width, self.info.height, buffer)
                    .ok_or_else(|| CaptureError::Read("Short frame buffer".to_string()))?;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(CaptureError::Read(format!("Failed to read frame: {}", e))),
        }
    }

    fn close(&mut self) {
        self.stdout = None;
        if let Some(mut process) = self.process.take() {
            // The decoder may still be running when we stop early
            let _ = process.kill();
            let _ = process.wait();
            tracing::info!(
                "Stream decoder closed after {} frames: {}",
                self.frames_read,
                self.info.name
            );
        }
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        self.close();
    }
}

/// Ask ffprobe for the first video stream's size and frame rate
fn probe_stream(location: &str) -> Result<(u32, u32, f64), CaptureError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "csv=p=0",
            location,
        ])
        .output()
        .map_err(|e| CaptureError::Ffmpeg(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CaptureError::DeviceUnavailable(format!(
            "Could not open {}: {}",
            location,
            stderr.trim()
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `width,height,num/den` as printed by ffprobe
fn parse_probe_output(stdout: &str) -> Result<(u32, u32, f64), CaptureError> {
    let line = stdout.lines().next().unwrap_or("").trim();
    let parts: Vec<&str> = line.split(',').collect();

    if parts.len() < 3 {
        return Err(CaptureError::Ffmpeg(format!(
            "Unexpected ffprobe output: {}",
            stdout
        )));
    }

    let width: u32 = parts[0]
        .parse()
        .map_err(|_| CaptureError::Ffmpeg("Invalid width".to_string()))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| CaptureError::Ffmpeg("Invalid height".to_string()))?;

    if width == 0 || height == 0 {
        return Err(CaptureError::Ffmpeg(format!(
            "Stream reports empty frames: {}x{}",
            width, height
        )));
    }

    // Frame rate comes as "30/1" or "30000/1001"
    let fps_parts: Vec<&str> = parts[2].split('/').collect();
    let fps = if fps_parts.len() == 2 {
        let num: f64 = fps_parts[0].parse().unwrap_or(30.0);
        let den: f64 = fps_parts[1].parse().unwrap_or(1.0);
        if den > 0.0 {
            num / den
        } else {
            30.0
        }
    } else {
        parts[2].parse().unwrap_or(30.0)
    };

    Ok((width, height, fps))
}
