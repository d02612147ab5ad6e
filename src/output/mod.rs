//! Recording output
//!
//! Where frames go once the recorder decides to keep them: sequentially
//! named AVI files encoded by FFmpeg.

pub mod ffmpeg;
pub mod naming;
pub mod types;

pub use ffmpeg::{FfmpegSink, FfmpegWriter};
pub use naming::next_artifact_path;
pub use types::{ArtifactSink, ArtifactWriter, SinkError, ARTIFACT_EXTENSION, ARTIFACT_PREFIX};
