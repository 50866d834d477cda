//! Playback Clock - position and duration as reported by the media element

use serde::{Deserialize, Serialize};

/// Current position and total duration in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackClock {
    current_time: f64,
    /// `None` until the element reports a finite duration
    duration: Option<f64>,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position in seconds
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Duration in seconds, if known
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Record a position reported by the element. Last write wins.
    pub fn advance(&mut self, position: f64) {
        if position.is_finite() {
            self.current_time = position.max(0.0);
        }
    }

    /// Record a duration reported by the element.
    ///
    /// Elements report `NaN` before metadata loads and `+inf` for live
    /// streams; both mean "unknown" here.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = (duration.is_finite() && duration >= 0.0).then_some(duration);
    }

    /// Where a seek request to `target` should land.
    ///
    /// Clamped to `[0, duration]` when the duration is known. Otherwise only
    /// the lower bound applies. Returns `None` for a non-finite request.
    pub fn seek_target(&self, target: f64) -> Option<f64> {
        if !target.is_finite() {
            return None;
        }
        Some(match self.duration {
            Some(duration) => target.clamp(0.0, duration),
            None => target.max(0.0),
        })
    }

    /// Apply a user seek ahead of the element's confirmation
    pub fn seek(&mut self, position: f64) {
        self.current_time = position;
    }
}
