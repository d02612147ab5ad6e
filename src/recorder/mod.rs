//! Recording system module
//!
//! - `state`: hold-over state machine deciding when recordings open and close
//! - `session`: one open output artifact
//! - `controller`: the per-frame pipeline tying estimator, state and output together

pub mod controller;
pub mod session;
pub mod state;

pub use controller::{ControllerConfig, FrameOutcome, RecordingController, RecordingError};
pub use session::RecordingSession;
pub use state::{HoldOver, RecordingState, SessionSummary, Step, Transition};
