//! Frame differencing
//!
//! The motion score is the sum of absolute luma differences between two
//! frames. Both frames go through the same grayscale conversion, so two
//! frames score 0 exactly when their luma planes are identical.

use crate::capture::Frame;
use image::{imageops, GrayImage, Luma};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Estimator errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MotionError {
    #[error("Frame size changed from {previous:?} to {current:?}")]
    DimensionMismatch {
        previous: (u32, u32),
        current: (u32, u32),
    },
}

/// Sum of per-pixel luma differences between two frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MotionScore(pub u64);

impl MotionScore {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Strictly above the threshold; equal is not motion.
    pub fn exceeds(self, threshold: u64) -> bool {
        self.0 > threshold
    }
}

impl fmt::Display for MotionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of comparing two frames
#[derive(Debug, Clone)]
pub struct MotionEstimate {
    pub score: MotionScore,
    /// Per-pixel absolute luma difference, displayable as is
    pub diff: GrayImage,
}

/// Compare two frames of the same size.
pub fn estimate(previous: &Frame, current: &Frame) -> Result<MotionEstimate, MotionError> {
    if previous.dimensions() != current.dimensions() {
        return Err(MotionError::DimensionMismatch {
            previous: previous.dimensions(),
            current: current.dimensions(),
        });
    }

    let gray_previous = imageops::grayscale(previous);
    let gray_current = imageops::grayscale(current);

    let (width, height) = current.dimensions();
    let mut diff = GrayImage::new(width, height);
    // u64 holds 255 * pixel count for any realistic frame size
    let mut score: u64 = 0;

    for ((out, a), b) in diff
        .pixels_mut()
        .zip(gray_previous.pixels())
        .zip(gray_current.pixels())
    {
        let delta = a.0[0].abs_diff(b.0[0]);
        score += u64::from(delta);
        *out = Luma([delta]);
    }

    Ok(MotionEstimate {
        score: MotionScore(score),
        diff,
    })
}
