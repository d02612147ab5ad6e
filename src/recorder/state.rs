//! Recording state management
//!
//! Defines the recording state machine and session tracking.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Current state of the recording system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// A recording is open
    Recording,
}

/// What the recorder has to do with its output after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current state
    None,
    /// Open a new recording before writing
    Start,
    /// Close the open recording
    Stop,
}

/// Outcome of feeding one motion decision to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub transition: Transition,
    /// Whether the current frame belongs in the recording
    pub is_writing: bool,
}

/// Hold-over state machine.
///
/// Motion resets the counter to the configured hold-over; every frame
/// without motion takes one off. A recording stays open while the counter
/// is above zero, so episodes closer together than the hold-over share one
/// recording.
#[derive(Debug, Clone)]
pub struct HoldOver {
    hold_over_frames: u32,
    counter: u32,
    state: RecordingState,
}

impl HoldOver {
    pub fn new(hold_over_frames: u32) -> Self {
        Self {
            hold_over_frames,
            counter: 0,
            state: RecordingState::Idle,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Frames left before the recording closes
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Back to idle, e.g. after the open recording was closed on shutdown
    pub fn reset(&mut self) {
        self.counter = 0;
        self.state = RecordingState::Idle;
    }

    /// Advance by one frame
    pub fn step(&mut self, motion_detected: bool) -> Step {
        let mut transition = Transition::None;

        if motion_detected {
            if self.state == RecordingState::Idle {
                self.state = RecordingState::Recording;
                transition = Transition::Start;
            }
            self.counter = self.hold_over_frames;
        } else {
            self.counter = self.counter.saturating_sub(1);
            if self.counter == 0 && self.state == RecordingState::Recording {
                self.state = RecordingState::Idle;
                transition = Transition::Stop;
            }
        }

        Step {
            transition,
            is_writing: self.counter > 0,
        }
    }
}

/// Information about one finished recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session index within this run (0, 1, 2, ...)
    pub index: usize,

    /// Where the recording was written
    pub path: PathBuf,

    /// Frames written
    pub frame_count: u64,

    /// Wall clock time the recording opened
    pub started_at: DateTime<Local>,

    /// Wall clock time the recording closed
    pub ended_at: DateTime<Local>,
}

impl SessionSummary {
    pub fn duration_ms(&self) -> i64 {
        (self.ended_at - self.started_at).num_milliseconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replay scores and report whether each step wrote its frame
    fn replay(scores: &[u64], threshold: u64, hold_over: u32) -> Vec<bool> {
        let mut machine = HoldOver::new(hold_over);
        scores
            .iter()
            .map(|&score| machine.step(score > threshold).is_writing)
            .collect()
    }

    /// Active at i iff some j <= i has s_j > T and i - j < H
    fn expected_activity(scores: &[u64], threshold: u64, hold_over: u32) -> Vec<bool> {
        (0..scores.len())
            .map(|i| (0..=i).any(|j| scores[j] > threshold && i - j < hold_over as usize))
            .collect()
    }

    #[test]
    fn test_starts_idle() {
        let machine = HoldOver::new(15);
        assert_eq!(machine.state(), RecordingState::Idle);
        assert_eq!(machine.counter(), 0);
    }

    #[test]
    fn test_single_burst() {
        let mut machine = HoldOver::new(2);

        assert_eq!(
            machine.step(false),
            Step { transition: Transition::None, is_writing: false }
        );
        assert_eq!(
            machine.step(true),
            Step { transition: Transition::Start, is_writing: true }
        );
        assert_eq!(
            machine.step(false),
            Step { transition: Transition::None, is_writing: true }
        );
        assert_eq!(
            machine.step(false),
            Step { transition: Transition::Stop, is_writing: false }
        );
        assert_eq!(
            machine.step(false),
            Step { transition: Transition::None, is_writing: false }
        );
        assert_eq!(machine.state(), RecordingState::Idle);
    }

    #[test]
    fn test_motion_resets_counter_without_adding() {
        let mut machine = HoldOver::new(3);
        machine.step(true);
        machine.step(true);
        machine.step(true);
        assert_eq!(machine.counter(), 3);

        machine.step(false);
        assert_eq!(machine.counter(), 2);
        machine.step(true);
        assert_eq!(machine.counter(), 3);
    }

    #[test]
    fn test_close_then_reopen() {
        let mut machine = HoldOver::new(1);
        let transitions: Vec<Transition> = [true, false, true, false, false, false]
            .into_iter()
            .map(|motion| machine.step(motion).transition)
            .collect();

        assert_eq!(
            transitions,
            vec![
                Transition::Start,
                Transition::Stop,
                Transition::Start,
                Transition::Stop,
                Transition::None,
                Transition::None,
            ]
        );
    }

    #[test]
    fn test_episodes_within_hold_over_merge() {
        let mut machine = HoldOver::new(3);
        let starts = [true, false, false, true, false, false, false]
            .into_iter()
            .filter(|&motion| machine.step(motion).transition == Transition::Start)
            .count();
        assert_eq!(starts, 1);
        assert_eq!(machine.state(), RecordingState::Idle);
    }

    #[test]
    fn test_activity_matches_window_rule() {
        let threshold = 1000;
        let scripts: [&[u64]; 5] = [
            &[0, 2000, 0, 0, 0],
            &[2000, 0, 2000, 0, 0, 0],
            &[1000, 1001, 999, 1000, 0, 5000, 5000, 0, 0, 0, 0, 0],
            &[0, 0, 0, 0],
            &[3000, 0, 0, 0, 0, 0, 3000, 0, 3000, 0, 0, 0, 0, 0, 0, 0],
        ];

        for scores in scripts {
            for hold_over in 1..=6 {
                assert_eq!(
                    replay(scores, threshold, hold_over),
                    expected_activity(scores, threshold, hold_over),
                    "scores {scores:?}, hold-over {hold_over}"
                );
            }
        }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let scores = [0, 5000, 0, 1, 5000, 0, 0, 0, 0, 7000, 0];
        assert_eq!(replay(&scores, 1000, 3), replay(&scores, 1000, 3));
    }

    #[test]
    fn test_threshold_equality_is_not_motion() {
        assert_eq!(replay(&[1000, 1000, 1000], 1000, 5), vec![false, false, false]);
    }
}
