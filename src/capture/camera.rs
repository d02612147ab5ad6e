//! Camera capture using nokhwa
//!
//! Frames are decoded to RGB on the capture thread, which is also the
//! detection thread: `read_frame` blocks until the camera delivers.

use crate::capture::traits::{CameraInfo, CaptureError, Frame, FrameSource, SourceInfo};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;

/// Get list of available cameras
pub fn list_cameras() -> Result<Vec<CameraInfo>, CaptureError> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| CaptureError::DeviceUnavailable(format!("Failed to enumerate cameras: {e}")))?;

    Ok(cameras
        .into_iter()
        .map(|info| {
            let id = match info.index() {
                CameraIndex::Index(i) => i.to_string(),
                CameraIndex::String(s) => s.to_string(),
            };
            CameraInfo {
                id,
                name: info.human_name(),
            }
        })
        .collect())
}

/// A camera opened for streaming
pub struct CameraSource {
    camera: Option<Camera>,
    info: SourceInfo,
}

impl CameraSource {
    /// Open the camera at `index` and start its stream
    pub fn open(index: u32) -> Result<Self, CaptureError> {
        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

        let mut camera = Camera::new(CameraIndex::Index(index), format)
            .map_err(|e| CaptureError::DeviceUnavailable(format!("Could not open camera {index}: {e}")))?;

        camera.open_stream().map_err(|e| {
            CaptureError::DeviceUnavailable(format!("Could not start stream on camera {index}: {e}"))
        })?;

        let camera_format = camera.camera_format();
        let info = SourceInfo {
            name: camera.info().human_name(),
            width: camera_format.resolution().width(),
            height: camera_format.resolution().height(),
            fps: Some(camera_format.frame_rate() as f64),
        };

        tracing::info!(
            "Camera opened: {} {}x{} @ {}fps, format={:?}",
            info.name,
            info.width,
            info.height,
            camera_format.frame_rate(),
            camera_format.format()
        );

        Ok(Self {
            camera: Some(camera),
            info,
        })
    }
}

impl FrameSource for CameraSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        let Some(camera) = self.camera.as_mut() else {
            return Ok(None);
        };

        let buffer = camera
            .frame()
            .map_err(|e| CaptureError::Read(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CaptureError::Read(format!("Failed to decode frame: {e}")))?;

        // Rebuild with our own image types so the nokhwa image version does not leak
        let (width, height) = (decoded.width(), decoded.height());
        let frame = Frame::from_raw(width, height, decoded.into_raw()).ok_or_else(|| {
            CaptureError::Read(format!("Decoded buffer does not fit {width}x{height}"))
        })?;

        Ok(Some(frame))
    }

    fn close(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop_stream() {
                tracing::warn!("Error stopping camera stream: {}", e);
            }
            tracing::info!("Camera released: {}", self.info.name);
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.close();
    }
}
