//! Frame sources
//!
//! Cameras are read through nokhwa, files and network streams through FFmpeg.

pub mod camera;
pub mod stream;
pub mod traits;

pub use camera::{list_cameras, CameraSource};
pub use stream::StreamSource;
pub use traits::{CameraInfo, CaptureError, Frame, FrameSource, SourceId, SourceInfo};

/// Open whatever `id` points at
pub fn open_source(id: &SourceId) -> Result<Box<dyn FrameSource>, CaptureError> {
    match id {
        SourceId::Device(index) => Ok(Box::new(CameraSource::open(*index)?)),
        SourceId::Stream(location) => Ok(Box::new(StreamSource::open(location)?)),
    }
}
