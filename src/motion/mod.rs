//! Motion estimation between consecutive frames

pub mod estimator;

pub use estimator::{estimate, MotionError, MotionEstimate, MotionScore};
